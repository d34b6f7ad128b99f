use anyhow::Result;
use clap::Subcommand;
use owo_colors::OwoColorize;
use repeatcal_core::config::RepeatcalConfig;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the config path and the effective settings
    Show,
}

pub fn run(command: ConfigCommand, config: &RepeatcalConfig) -> Result<()> {
    let path = RepeatcalConfig::config_path()?;

    match command {
        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite",
                    path.display()
                );
            }
            RepeatcalConfig::create_default_config(&path)?;
            println!("{}", format!("  Created {}", path.display()).green());
        }
        ConfigCommand::Show => {
            let none = || "(none)".dimmed().to_string();

            println!("{}", "Paths".bold());
            println!("  Config:            {}", path.display());
            println!();
            println!("{}", "Settings".bold());
            println!("  server_url:        {}", config.server_url);
            println!("  bind_addr:         {}", config.bind_addr);
            println!("  log_level:         {}", config.log_level);
            println!(
                "  repeat_end_limit:  {}",
                config
                    .repeat_end_limit
                    .map(|d| d.to_string())
                    .unwrap_or_else(none)
            );
            println!(
                "  seed_file:         {}",
                config
                    .seed_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(none)
            );
        }
    }

    Ok(())
}
