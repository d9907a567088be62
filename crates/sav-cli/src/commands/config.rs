use crate::commands::common::{config_path, resolve_config, Overrides};
use crate::{print_info, print_success, ConfigCommands};
use colored::*;
use std::path::Path;

pub fn handle(
    action: ConfigCommands,
    overrides: &Overrides,
    config_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigCommands::Init { force } => init(overrides, config_dir, force),
        ConfigCommands::Show => show(overrides, config_dir),
    }
}

fn init(
    overrides: &Overrides,
    config_dir: &Path,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path(config_dir);
    if path.exists() && !force {
        return Err(format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    let config = resolve_config(overrides, config_dir)?;
    config.save_to_file(&path)?;
    print_success(&format!("Config written to {}", path.display()));
    Ok(())
}

fn show(overrides: &Overrides, config_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(overrides, config_dir)?;
    print_info(&format!("Config dir: {}", config_dir.display()));
    println!();
    println!("{} {}", "RPC URL:".bold(), config.rpc_url.cyan());
    println!("{} {}", "Pool:".bold(), config.pool_address.to_string().green());
    match config.from_address {
        Some(from) => println!("{} {}", "From:".bold(), from),
        None => println!("{} {}", "From:".bold(), "(gateway default)".dimmed()),
    }
    println!(
        "{} {}s (poll {}ms)",
        "Confirm timeout:".bold(),
        config.confirm_timeout_secs,
        config.confirm_poll_ms
    );
    println!(
        "{} {}",
        "Strict single group:".bold(),
        config.strict_single_group
    );
    println!("{} {}", "Log level:".bold(), config.log_level);
    Ok(())
}
