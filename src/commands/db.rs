use anyhow::{Context as _, Result, anyhow, bail};
use colored::Colorize;
use dialoguer::{Confirm, Select};
use std::path::{Path, PathBuf};
use wpcli::{DatabaseInfo, DatabaseInspector, DumpOutcome};

use crate::Context;
use crate::cli::DbCommand;
use crate::commands;
use crate::progress;
use crate::ui;

pub fn run(ctx: &Context, cmd: DbCommand) -> Result<()> {
    let client = commands::client(ctx)?;
    match cmd {
        DbCommand::Info(site) => {
            let installation = commands::select_installation(ctx, &client, &site)?;
            let inspector = client.database(&installation);
            let info = inspect(ctx, &inspector)?;
            show_info(&installation.directory, &info);
            Ok(())
        }
        DbCommand::Export(site) => {
            let installation = commands::select_installation(ctx, &client, &site)?;
            let inspector = client.database(&installation);
            let info = inspect(ctx, &inspector)?;
            report(inspector.export(&info)?)
        }
        DbCommand::Import { site, file, yes } => {
            let installation = commands::select_installation(ctx, &client, &site)?;
            let inspector = client.database(&installation);
            let source = match file {
                Some(file) => file,
                None => {
                    let info = inspect(ctx, &inspector)?;
                    let root = client.settings().scan_root()?;
                    pick_dump(inspector.candidate_dumps(&info, &root)?, &root)?
                }
            };

            if !source.is_file() {
                bail!("Dump not found: {}", source.display());
            }
            if !yes && !confirm_import(&source, &installation.directory)? {
                ui::info("Import cancelled");
                return Ok(());
            }
            report(inspector.import(&source))
        }
        DbCommand::Dumps(site) => {
            let installation = commands::select_installation(ctx, &client, &site)?;
            let inspector = client.database(&installation);
            let info = inspect(ctx, &inspector)?;
            let root = client.settings().scan_root()?;
            let dumps = inspector.candidate_dumps(&info, &root)?;

            ui::header("Database dumps");
            if dumps.is_empty() {
                ui::dim(&format!("No dumps found under {}", root.display()));
            }
            for dump in &dumps {
                println!("  {}", dump.display());
            }
            println!();
            Ok(())
        }
    }
}

fn inspect(ctx: &Context, inspector: &DatabaseInspector<'_>) -> Result<DatabaseInfo> {
    let info = progress::run("Inspecting database", ctx.quiet, |reporter| {
        inspector.inspect(&reporter)
    })?;
    Ok(info)
}

fn show_info(directory: &Path, info: &DatabaseInfo) {
    ui::header("Database");
    ui::kv("Installation", &directory.display().to_string());
    ui::kv("Name", info.name.as_deref().unwrap_or("-"));
    ui::kv("Size", info.size.as_deref().unwrap_or("-"));
    if let Some(error) = &info.size_error {
        ui::kv("Size error", &ui::first_line(error).red().to_string());
    }

    ui::section("Tables");
    if info.check_tables.is_empty() {
        ui::dim("No table results");
    }
    let width = info
        .check_tables
        .iter()
        .map(|t| t.table_name.len())
        .max()
        .unwrap_or(0);
    for table in &info.check_tables {
        let status = if table.is_ok() {
            table.check_status.green()
        } else {
            table.check_status.red()
        };
        println!("  {:width$}  {}", table.table_name, status);
    }
    if let Some(error) = &info.check_error {
        ui::kv("Check error", &ui::first_line(error).red().to_string());
    }

    let failing = info.failing_tables().count();
    if failing > 0 {
        println!();
        ui::warn(&format!("{failing} table(s) need attention"));
    }
    println!();
}

fn pick_dump(mut dumps: Vec<PathBuf>, root: &Path) -> Result<PathBuf> {
    if dumps.is_empty() {
        bail!("No dumps for this database under {}", root.display());
    }
    let items: Vec<String> = dumps.iter().map(|d| d.display().to_string()).collect();
    let idx = Select::new()
        .with_prompt("Dump to import")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to read dump selection")?;
    Ok(dumps.swap_remove(idx))
}

fn confirm_import(source: &Path, directory: &Path) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Import {} into {}? This replaces the current data",
            source.display(),
            directory.display()
        ))
        .default(false)
        .interact()?;
    Ok(confirmed)
}

fn report(outcome: DumpOutcome) -> Result<()> {
    match outcome {
        DumpOutcome::Completed { message, path } => {
            ui::success(ui::first_line(&message));
            ui::kv("File", &path.display().to_string());
            Ok(())
        }
        DumpOutcome::Failed { reason } => Err(anyhow!(reason)),
    }
}
