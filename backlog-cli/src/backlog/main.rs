mod cli;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use env_logger::Env;

use backlog_core::{build_backlog, determine_project_root, BacklogError, SprintConfig};

use crate::cli::Cli;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "Error:".red(), e);
        if let Some(BacklogError::StoriesDirNotFound(_)) = e.downcast_ref::<BacklogError>() {
            eprintln!("Create it and add your user story markdown files (US-*.md).");
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let root = determine_project_root(cli.root.as_deref())?;
    let mut config = SprintConfig::load(&root)?;

    if let Some(dir) = &cli.dir {
        config.stories_dir = dir.clone();
    }
    if let Some(project) = &cli.project {
        config.project = project.clone();
    }
    if let Some(branch) = &cli.branch {
        config.branch_name = branch.clone();
    }

    let report = build_backlog(&config)?;

    for document in &report.documents {
        println!("{}: {} stories", document.name, document.stories);
    }
    println!("\nTotal: {} stories", report.total.to_string().bold());

    if report.preserved > 0 {
        println!(
            "Preserved {} completed stories from existing backlog.",
            report.preserved
        );
    }

    let file_name = report
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.path.display().to_string());
    println!(
        "\n{}",
        format!("{} written ({} KB)", file_name, report.size_kb).green()
    );
    println!("Next: sprint");

    Ok(())
}
