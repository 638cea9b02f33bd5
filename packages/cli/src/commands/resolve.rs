use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use trellis_editor::DropTargetResolver;
use trellis_schema::{Breakpoint, PropsResolver};

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Node to resolve
    pub node_id: String,

    /// Page file (defaults to the configured seed)
    #[arg(short, long)]
    pub page: Option<PathBuf>,

    /// Breakpoint to resolve at (defaults to the configured one)
    #[arg(short, long)]
    pub breakpoint: Option<Breakpoint>,

    /// Resolve at every breakpoint
    #[arg(short, long)]
    pub all: bool,
}

pub fn resolve(args: ResolveArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let page = config.load_page(cwd, args.page.as_deref())?;
    let resolver = PropsResolver::new(&page);

    let breakpoints = if args.all {
        Breakpoint::ALL.to_vec()
    } else {
        vec![args.breakpoint.unwrap_or(config.default_breakpoint)]
    };

    let node = page
        .node(&args.node_id)
        .ok_or_else(|| anyhow!("Node not found: {}", args.node_id))?;

    println!("{} {}", node.node_type.as_str().dimmed(), node.id.bold());
    for breakpoint in breakpoints {
        let props = resolver.resolve(&args.node_id, breakpoint)?;
        let containers = DropTargetResolver::new(&page, breakpoint);
        let overridden = resolver.has_override(&args.node_id, breakpoint);

        println!();
        println!(
            "  {}{}",
            breakpoint.to_string().cyan().bold(),
            if overridden { " (override)".dimmed().to_string() } else { String::new() }
        );
        println!("  visible: {}", resolver.is_visible(&args.node_id, breakpoint));
        if let Some(orientation) = containers.orientation(&args.node_id) {
            println!("  flow: {:?}", orientation);
        }
        for line in serde_json::to_string_pretty(&props)?.lines() {
            println!("  {}", line);
        }
    }

    Ok(())
}
