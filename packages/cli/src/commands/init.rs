use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::Path;
use trellis_schema::seed::HOME_PAGE_JSON;
use trellis_schema::Breakpoint;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Where to write the seed page, relative to the project
    #[arg(short, long, default_value = "pages/home.page.json")]
    pub seed: String,

    /// Breakpoint commands use by default
    #[arg(short, long, default_value = "mobile")]
    pub breakpoint: Breakpoint,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Trellis project...".bright_blue().bold());

    let seed_path = cwd.join(&args.seed);
    if !seed_path.exists() {
        if let Some(dir) = seed_path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&seed_path, HOME_PAGE_JSON)?;
        println!("  {} Created {}", "✓".green(), args.seed);
    }

    let config = Config {
        seed: Some(args.seed.clone()),
        default_breakpoint: args.breakpoint,
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: trellis inspect");
    println!("  2. Write a mutation script and run: trellis apply script.json");

    Ok(())
}
