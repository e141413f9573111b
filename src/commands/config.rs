use anyhow::{Result, bail};
use colored::Colorize;
use wpcli::{ConfigListing, EditOutcome, Installation};

use crate::Context;
use crate::cli::ConfigCommand;
use crate::commands;
use crate::progress;
use crate::ui;

pub fn run(ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    let client = commands::client(ctx)?;
    match cmd {
        ConfigCommand::List(site) => {
            let installation = commands::select_installation(ctx, &client, &site)?;
            let editor = client.config(&installation);
            let listing = progress::run("Reading wp-config.php", ctx.quiet, |reporter| {
                editor.list(&reporter)
            })?;
            show_listing(&installation, &listing);
            Ok(())
        }
        ConfigCommand::Get { site, name } => {
            let installation = commands::select_installation(ctx, &client, &site)?;
            match client.config(&installation).get(&name)? {
                Some(directive) => {
                    println!("{}", directive.value);
                    Ok(())
                }
                None => bail!("'{}' is not defined in wp-config.php", name),
            }
        }
        ConfigCommand::Set { site, name, value } => {
            let installation = commands::select_installation(ctx, &client, &site)?;
            let outcome = client.config(&installation).set(&name, &value);
            report(outcome, &format!("Set {name} = {value}"))
        }
        ConfigCommand::Delete { site, name } => {
            let installation = commands::select_installation(ctx, &client, &site)?;
            let outcome = client.config(&installation).delete(&name);
            report(outcome, &format!("Deleted {name}"))
        }
        ConfigCommand::ShuffleSalts(site) => {
            let installation = commands::select_installation(ctx, &client, &site)?;
            let outcome = client.config(&installation).shuffle_salts();
            report(outcome, "Shuffled authentication keys and salts")
        }
    }
}

fn show_listing(installation: &Installation, listing: &ConfigListing) {
    ui::header("wp-config.php");
    ui::kv("Installation", &installation.directory.display().to_string());
    println!();

    let width = listing
        .directives
        .iter()
        .map(|d| d.name.len())
        .max()
        .unwrap_or(0);
    for directive in &listing.directives {
        println!(
            "  {}  {}  {}",
            format!("{:width$}", directive.name).bold(),
            directive.value,
            directive.kind.dimmed()
        );
    }

    if let Some(error) = &listing.error {
        println!();
        ui::warn(ui::first_line(error));
    }
    println!();
}

fn report(outcome: EditOutcome, done: &str) -> Result<()> {
    match outcome {
        EditOutcome::Applied => {
            ui::success(done);
            Ok(())
        }
        EditOutcome::Rejected { output } => {
            let reason = ui::first_line(&output);
            if reason.is_empty() {
                bail!("WP-CLI rejected the change");
            }
            bail!("{}", reason)
        }
    }
}
