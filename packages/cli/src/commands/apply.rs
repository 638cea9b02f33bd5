use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use trellis_editor::{ApplyResult, DocumentStore, FileStorage, Mutation, ToolMode};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// JSON file holding an array of mutations
    pub script: PathBuf,

    /// Page file to start from (defaults to the configured seed)
    #[arg(short, long)]
    pub page: Option<PathBuf>,

    /// Write the resulting page here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fail when any mutation turns out to be a no-op
    #[arg(long)]
    pub strict: bool,
}

/// Outcome of one scripted run
#[derive(Debug)]
pub struct ScriptReport {
    pub applied: usize,
    pub skipped: usize,
    pub final_version: u64,
}

pub fn apply(args: ApplyArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let page = config.load_page(cwd, args.page.as_deref())?;

    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read script {}", args.script.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid mutation script {}", args.script.display()))?;

    let storage = FileStorage::new(config.preferences_path(cwd));
    let mut store = DocumentStore::with_storage(page, Box::new(storage));

    eprintln!("🔧 {} {} mutations", "Applying".green().bold(), mutations.len());
    let report = run_script(&mut store, mutations, |index, mutation, result| {
        match &result.reason {
            None => eprintln!(
                "   {} #{} {} {} (v{})",
                "✓".green(),
                index,
                mutation.name(),
                mutation.target_id(),
                result.version
            ),
            Some(reason) => eprintln!(
                "   {} #{} {} {}: {}",
                "–".yellow(),
                index,
                mutation.name(),
                mutation.target_id(),
                reason.to_string().dimmed()
            ),
        }
    });

    let json = store.page().to_json_pretty()?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!("   Output: {}", path.display());
        }
        None => println!("{}", json),
    }

    eprintln!(
        "✨ {} {} applied, {} skipped, version {}",
        "Done".green().bold(),
        report.applied,
        report.skipped,
        report.final_version
    );

    if args.strict && report.skipped > 0 {
        anyhow::bail!("{} mutations left the page unchanged", report.skipped);
    }

    Ok(())
}

/// Feed `mutations` through `store` in order, in select mode so follow-up
/// selection behaves as it would in the canvas
pub fn run_script(
    store: &mut DocumentStore,
    mutations: Vec<Mutation>,
    mut on_result: impl FnMut(usize, &Mutation, &ApplyResult),
) -> ScriptReport {
    let previous_mode = store.tool_mode();
    store.set_tool_mode(ToolMode::Select);

    let mut report = ScriptReport {
        applied: 0,
        skipped: 0,
        final_version: store.version(),
    };

    for (index, mutation) in mutations.into_iter().enumerate() {
        let result = store.apply(mutation.clone());
        if result.changed {
            report.applied += 1;
        } else {
            report.skipped += 1;
        }
        on_result(index, &mutation, &result);
    }

    store.set_tool_mode(previous_mode);
    report.final_version = store.version();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_schema::home_page;

    #[test]
    fn test_script_runs_in_order() {
        let script = r#"[
            {"op": "remove", "nodeId": "n_hero"},
            {"op": "remove", "nodeId": "n_hero"},
            {"op": "reorder", "parentId": "n_blog_list", "fromIndex": 0, "toIndex": 2},
            {"op": "toggleVisibility", "nodeId": "n_logo", "breakpoint": "mobile", "scope": "mode"}
        ]"#;
        let mutations: Vec<Mutation> = serde_json::from_str(script).unwrap();

        let mut store = DocumentStore::new(home_page().unwrap());
        let mut seen = Vec::new();
        let report = run_script(&mut store, mutations, |index, _, result| {
            seen.push((index, result.changed))
        });

        assert_eq!(report.applied, 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.final_version, 4);
        assert_eq!(seen, vec![(0, true), (1, false), (2, true), (3, true)]);
        assert_eq!(store.tool_mode(), ToolMode::Preview);
        assert!(!store.is_visible("n_logo", trellis_schema::Breakpoint::Mobile));
    }
}
