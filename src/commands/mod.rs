pub mod config;
pub mod db;
pub mod status;

use anyhow::{Context as _, Result, bail};
use dialoguer::Select;
use wpcli::{Client, Installation};

use crate::Context;
use crate::cli::SiteArgs;
use crate::paths;
use crate::ui;

/// Build a client from the effective settings.
pub fn client(ctx: &Context) -> Result<Client> {
    Client::new(ctx.settings.clone())
        .with_context(|| format!("Could not start WP-CLI ({})", ctx.settings.tool))
}

/// Resolve the installation a command works on.
///
/// An explicit `--site` is opened directly. Otherwise the scan root is
/// searched; a single result is used as is, several prompt the user.
pub fn select_installation(ctx: &Context, client: &Client, site: &SiteArgs) -> Result<Installation> {
    if let Some(dir) = &site.site {
        return Ok(client.open(dir)?);
    }

    let mut installations = client.scan()?;
    match installations.len() {
        0 => bail!(
            "No WordPress installations found under {}",
            client.settings().scan_root()?.display()
        ),
        1 => {
            let only = installations.remove(0);
            if !ctx.quiet {
                ui::info(&format!("Using {}", only.directory.display()));
            }
            Ok(only)
        }
        _ => {
            installations.sort_by(|a, b| a.directory.cmp(&b.directory));
            let items: Vec<String> = installations
                .iter()
                .map(|i| i.directory.display().to_string())
                .collect();
            let idx = Select::new()
                .with_prompt("Installation")
                .items(&items)
                .default(0)
                .interact()
                .context("Failed to read installation selection")?;
            Ok(installations.swap_remove(idx))
        }
    }
}

/// `wpdash paths`
pub fn show_paths(ctx: &Context) -> Result<()> {
    let settings = &ctx.settings;
    let file = paths::config_file()?;

    ui::header("wpdash paths");
    ui::kv(
        "Config file",
        &format!(
            "{}{}",
            file.display(),
            if file.exists() { "" } else { " (not found, using defaults)" }
        ),
    );
    ui::kv(
        "Scan root",
        &settings
            .scan_root()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|e| e.to_string()),
    );

    ui::section("Settings");
    ui::kv("Tool", &settings.tool);
    ui::kv("Marker file", &settings.marker_file);
    ui::kv("Options marker", &settings.options_marker);
    ui::kv("Check success marker", &settings.check_success_marker);
    ui::kv("Jobs", &settings.jobs().to_string());
    if ctx.verbose > 0 {
        ui::dim(&format!("Set {} to use another config directory", paths::ENV_CONFIG_DIR));
    }
    println!();
    Ok(())
}
