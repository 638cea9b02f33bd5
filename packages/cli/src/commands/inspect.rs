use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use trellis_schema::{Breakpoint, Page, PropKey, PropsResolver, ZoneKind};

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Page file (defaults to the configured seed)
    pub page: Option<PathBuf>,

    /// Breakpoint used for visibility
    #[arg(short, long)]
    pub breakpoint: Option<Breakpoint>,

    /// Print the page JSON instead of the tree
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let page = config.load_page(cwd, args.page.as_deref())?;
    let breakpoint = args.breakpoint.unwrap_or(config.default_breakpoint);

    if args.json {
        println!("{}", page.to_json_pretty()?);
        return Ok(());
    }

    println!(
        "📄 {} ({}) at {}",
        page.name.bold(),
        page.page_id,
        breakpoint.to_string().cyan()
    );

    for line in render_tree(&page, breakpoint) {
        println!("{}", line);
    }

    Ok(())
}

/// One line per node, zone by zone, indented by depth
pub fn render_tree(page: &Page, breakpoint: Breakpoint) -> Vec<String> {
    let resolver = PropsResolver::new(page);
    let mut lines = Vec::new();

    for kind in ZoneKind::ALL {
        lines.push(format!("{}", kind.as_str().to_uppercase().bold()));
        let root = &page.zones.get(kind).root_id;
        walk(page, &resolver, breakpoint, root, 1, &mut lines);
    }

    lines
}

fn walk(
    page: &Page,
    resolver: &PropsResolver<'_>,
    breakpoint: Breakpoint,
    id: &str,
    depth: usize,
    lines: &mut Vec<String>,
) {
    let Some(node) = page.node(id) else {
        lines.push(format!("{}{} {}", "  ".repeat(depth), id, "(missing)".red()));
        return;
    };

    let mut line = format!(
        "{}{} {}",
        "  ".repeat(depth),
        node.node_type.as_str().dimmed(),
        node.id
    );
    if let Ok(props) = resolver.resolve(id, breakpoint) {
        if let Some(content) = props.content().or_else(|| props.text(&PropKey::Title)) {
            line.push_str(&format!(" \"{}\"", content));
        }
    }
    if !resolver.is_visible(id, breakpoint) {
        line.push_str(&format!(" {}", "(hidden)".yellow()));
    }
    lines.push(line);

    for child in &node.children {
        walk(page, resolver, breakpoint, child, depth + 1, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_schema::home_page;

    #[test]
    fn test_tree_lists_every_reachable_node() {
        colored::control::set_override(false);
        let page = home_page().unwrap();
        let lines = render_tree(&page, Breakpoint::Mobile);

        // three zone headers plus one line per node
        assert_eq!(lines.len(), 3 + page.node_count());
        assert!(lines.iter().any(|l| l.contains("n_nav") && l.contains("(hidden)")));

        let desktop = render_tree(&page, Breakpoint::Desktop);
        assert!(!desktop.iter().any(|l| l.contains("(hidden)")));
    }
}
