use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use trellis_schema::Page;
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Page file or directory of `*.page.json` files
    pub input: PathBuf,

    /// List files without problems too
    #[arg(short, long)]
    pub verbose: bool,
}

pub fn validate(args: ValidateArgs, _cwd: &Path) -> Result<()> {
    println!("🔍 {} page validation", "Starting".green().bold());
    println!("   Input: {}", args.input.display());
    println!();

    let files = if args.input.is_file() {
        vec![args.input.clone()]
    } else if args.input.is_dir() {
        let files = find_page_files(&args.input);
        println!("   Found {} page files", files.len());
        println!();
        files
    } else {
        return Err(anyhow::anyhow!(
            "Input path does not exist: {}",
            args.input.display()
        ));
    };

    let mut total_problems = 0;
    for file in &files {
        total_problems += validate_file(file, args.verbose)?;
    }

    println!();
    println!(
        "✨ {} Validation complete!",
        if total_problems > 0 {
            "Done".red().bold()
        } else {
            "Done".green().bold()
        }
    );
    println!("   Files checked: {}", files.len());

    if total_problems > 0 {
        println!("   {} {}", "Problems:".red(), total_problems);
        std::process::exit(1);
    }

    println!("   {} No issues found!", "✓".green());
    Ok(())
}

/// Number of problems found in one file; unreadable pages count as one
fn validate_file(path: &Path, verbose: bool) -> Result<usize> {
    let source = fs::read_to_string(path)?;

    let page = match Page::from_json(&source) {
        Ok(page) => page,
        Err(err) => {
            eprintln!("{} Failed to read {}: {}", "✗".red(), path.display(), err);
            return Ok(1);
        }
    };

    let problems = page.validate();
    if problems.is_empty() {
        if verbose {
            println!("{} {}", "✓".green(), path.display());
        }
        return Ok(0);
    }

    println!("{}", path.display());
    for problem in &problems {
        println!("  {} {}", "error".red().bold(), problem);
    }
    println!();

    Ok(problems.len())
}

fn find_page_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(".page.json"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_schema::seed::HOME_PAGE_JSON;

    #[test]
    fn test_finds_nested_page_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site").join("shop");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("home.page.json"), HOME_PAGE_JSON).unwrap();
        fs::write(nested.join("sale.page.json"), HOME_PAGE_JSON).unwrap();
        fs::write(nested.join("notes.json"), "{}").unwrap();

        let files = find_page_files(dir.path());
        assert_eq!(files.len(), 2);
        assert_eq!(validate_file(&files[0], false).unwrap(), 0);
    }

    #[test]
    fn test_broken_page_counts_problems() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.page.json");
        let broken = HOME_PAGE_JSON.replace("\"id\": \"n_footer_text\"", "\"id\": \"n_ghost\"");
        fs::write(&path, broken).unwrap();

        assert_eq!(validate_file(&path, false).unwrap(), 1);
    }
}
