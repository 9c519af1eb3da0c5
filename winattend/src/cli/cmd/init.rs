use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info};

use crate::config::{ConfigPath, Provision};

pub fn run(cmd: super::Commands) -> ExitCode {
    match cmd {
        super::Commands::Init {
            format,
            variant,
            path,
        } => {
            let dir = path.unwrap_or_else(|| PathBuf::from("."));

            if let Some(existing) = ConfigPath::from_dir(&dir) {
                error!(path = %existing, "A config file already exists");
                return ExitCode::FAILURE;
            }

            let config_path = format.unwrap_or_default().in_dir(&dir);
            let provision = Provision {
                variant: variant.unwrap_or_default(),
                ..Provision::default()
            };

            match config_path.write(&provision) {
                Ok(_) => {
                    info!(path = %config_path, "Wrote config file");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    error!(error = ?err, "Failed to write config file");
                    ExitCode::FAILURE
                }
            }
        }
        _ => panic!(),
    }
}
