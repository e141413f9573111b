use anyhow::Result;
use colored::Colorize;
use wpcli::Installation;

use crate::Context;
use crate::commands;
use crate::progress;
use crate::ui;

pub fn run(ctx: &Context, json: bool) -> Result<()> {
    let client = commands::client(ctx)?;
    let mut installations = progress::run("Probing installations", ctx.quiet || json, |reporter| {
        client.discover(reporter)
    })?;
    installations.sort_by(|a, b| a.directory.cmp(&b.directory));

    if json {
        println!("{}", serde_json::to_string_pretty(&installations)?);
        return Ok(());
    }

    ui::header("WordPress Installations");

    if installations.is_empty() {
        ui::warn(&format!(
            "No installations found under {}",
            client.settings().scan_root()?.display()
        ));
        println!();
        return Ok(());
    }

    for installation in &installations {
        show_installation(installation);
    }

    let healthy = installations.iter().filter(|i| i.is_healthy()).count();
    let unhealthy = installations.len() - healthy;
    println!();
    println!(
        "  {} total, {} {} healthy, {} {} with problems",
        installations.len().to_string().bold(),
        healthy.to_string().green(),
        "✓".green(),
        if unhealthy > 0 {
            unhealthy.to_string().yellow()
        } else {
            unhealthy.to_string().dimmed()
        },
        if unhealthy > 0 { "⚠" } else { "✓" }
    );
    println!();
    Ok(())
}

fn show_installation(installation: &Installation) {
    ui::section(&installation.name());
    ui::kv(
        "Path",
        &ui::truncate_path(&installation.directory.display().to_string(), 60),
    );
    ui::kv(
        "Home",
        if installation.home_url.is_empty() {
            "-"
        } else {
            installation.home_url.as_str()
        },
    );
    ui::kv("Database check", &ui::mark(installation.db_check_success));
    ui::kv("Options table", &ui::mark(installation.valid_options));
    if installation.has_error() {
        ui::kv("Error", &ui::first_line(&installation.db_error).red().to_string());
    }
}
