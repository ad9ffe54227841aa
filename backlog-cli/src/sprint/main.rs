mod cli;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use env_logger::Env;

use backlog_core::{
    determine_project_root, progress_bar, progress_label, select_modules, status_report,
    synchronize, write_sprint, BacklogError, JsonStore, SprintConfig, SprintReport, StoryStore,
};

use crate::cli::Cli;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "Error:".red(), e);
        if let Some(BacklogError::BacklogNotFound(_)) = e.downcast_ref::<BacklogError>() {
            print_backlog_help();
        }
        std::process::exit(1);
    }
}

fn print_backlog_help() {
    eprintln!();
    eprintln!("Create your backlog first:");
    eprintln!("  1. Put user stories in docs/userstories/*.md");
    eprintln!("  2. stories-to-backlog");
    eprintln!();
    eprintln!("Or create backlog.json manually in prd.json format with many stories.");
}

fn run(cli: &Cli) -> Result<()> {
    let root = determine_project_root(cli.root.as_deref())?;
    let config = SprintConfig::load(&root)?;

    let backlog_file = JsonStore::new(&config.backlog_path);
    let sprint_file = JsonStore::new(&config.sprint_path);

    let outcome = synchronize(&backlog_file, &sprint_file)?;
    if outcome.synced > 0 {
        println!(
            "{}",
            format!("Synced {} newly completed stories to backlog.", outcome.synced).green()
        );
    }
    let backlog = outcome.backlog;

    if cli.status {
        show_status(&backlog, &sprint_file);
        return Ok(());
    }

    if cli.sync {
        println!("Sync complete.");
        return Ok(());
    }

    let modules = select_modules(&backlog, &cli.modules);
    if modules.is_empty() {
        println!("{}", "All stories complete! Nothing to sprint on.".green());
        show_status(&backlog, &sprint_file);
        return Ok(());
    }

    let report = write_sprint(&config, &backlog, &modules)?;
    print_sprint_report(&report);
    Ok(())
}

fn print_sprint_report(report: &SprintReport) {
    let module_names = report.modules.join(", ");
    println!("Sprint prd.json created: {}", module_names.green());
    println!(
        "  Stories: {} ({} done, {} remaining)",
        report.total, report.done, report.remaining
    );
    println!("  File size: {} KB", report.size_kb);
    if let Some(priority) = report.highest_priority {
        println!("  Highest priority: {}", priority);
    }

    if report.over_budget() {
        println!(
            "\n  {}",
            format!(
                "WARNING: Sprint is {} KB (limit: {} KB).",
                report.size_kb, report.budget_kb
            )
            .yellow()
        );
        println!("  Consider loading fewer modules for better AI performance.");
    }
}

fn show_status(backlog: &StoryStore, sprint_file: &JsonStore) {
    let report = status_report(backlog, sprint_file);

    println!(
        "Backlog: {}/{} stories complete ({:.1}%)\n",
        report.done,
        report.total,
        report.percent_complete()
    );

    for module in &report.modules {
        let label = format!("{:>8}", progress_label(module));
        let label = if module.is_complete() {
            label.green()
        } else {
            label.yellow()
        };
        println!("  {} [{}] {}", module.module, progress_bar(module), label);
    }

    if let Some(current) = report.current_sprint {
        println!(
            "\n  Current sprint: {}/{} remaining ({} KB)",
            current.remaining, current.total, current.size_kb
        );
    }
}
