mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, init, inspect, prefs, resolve, validate, ApplyArgs, InitArgs, InspectArgs, PrefsArgs,
    ResolveArgs, ValidateArgs,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Trellis CLI - headless driver for the page builder core
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log mutations and no-ops (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a trellis.config.json and a seed page
    Init(InitArgs),

    /// Print a page's zone trees
    Inspect(InspectArgs),

    /// Print a node's effective properties at a breakpoint
    Resolve(ResolveArgs),

    /// Run a JSON script of mutations against a page
    Apply(ApplyArgs),

    /// Check pages for structural problems
    Validate(ValidateArgs),

    /// Show or change the persisted breakpoint and tool mode
    Prefs(PrefsArgs),
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match std::env::current_dir() {
        Ok(cwd) => cwd,
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = run(cli.command, &cwd);

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

fn run(command: Command, cwd: &Path) -> anyhow::Result<()> {
    match command {
        Command::Init(args) => init(args, cwd),
        Command::Inspect(args) => inspect(args, cwd),
        Command::Resolve(args) => resolve(args, cwd),
        Command::Apply(args) => apply(args, cwd),
        Command::Validate(args) => validate(args, cwd),
        Command::Prefs(args) => prefs(args, cwd),
    }
}
