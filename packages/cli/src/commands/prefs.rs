use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;
use trellis_editor::{DocumentStore, FileStorage, ToolMode};
use trellis_schema::Breakpoint;

#[derive(Args, Debug)]
pub struct PrefsArgs {
    /// New active breakpoint
    #[arg(short, long)]
    pub breakpoint: Option<Breakpoint>,

    /// New tool mode (select, preview)
    #[arg(short, long)]
    pub tool: Option<ToolMode>,

    /// Flip between select and preview
    #[arg(long, conflicts_with = "tool")]
    pub toggle: bool,
}

pub fn prefs(args: PrefsArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let page = config.load_page(cwd, None)?;
    let path = config.preferences_path(cwd);

    let mut store = DocumentStore::with_storage(page, Box::new(FileStorage::new(&path)));

    if let Some(breakpoint) = args.breakpoint {
        store.set_breakpoint(breakpoint);
    }
    if let Some(tool) = args.tool {
        store.set_tool_mode(tool);
    }
    if args.toggle {
        store.toggle_tool_mode();
    }

    let prefs = store.preferences();
    println!("⚙️  {}", path.display().to_string().dimmed());
    println!("   breakpoint: {}", prefs.device_mode.to_string().cyan());
    println!("   tool mode:  {}", prefs.tool_mode.to_string().cyan());

    Ok(())
}
