//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

fn render_toml(cfg: &wifiguard_config::Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# serialization failed: {e}"))
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = config::config_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let body = wifiguard_config::starter_config(global.url.as_deref())?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, body)?;

            if !global.quiet {
                eprintln!("   ✓ config written to {}", path.display());
                if global.url.is_none() {
                    eprintln!("   Set router.url, then run: wifiguard register");
                } else {
                    eprintln!("   Next: wifiguard register");
                }
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = wifiguard_config::redacted(&config::load(global)?);
            // Table and plain both show the TOML form
            let out = output::render_single(&global.output, &cfg, render_toml, render_toml);
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string(), false);
            Ok(())
        }
    }
}
