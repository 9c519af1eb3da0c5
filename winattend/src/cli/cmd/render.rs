use anyhow::{Result, bail};
use std::{path::Path, process::ExitCode};
use tracing::{debug, error, warn};
use validator::Validate;

use crate::{
    answer::AnswerFile,
    config::{ConfigPath, Provision},
};

pub fn run(cmd: super::Commands) -> ExitCode {
    let provision = match provision(&cmd, Path::new(".")) {
        Ok(provision) => provision,
        Err(err) => {
            error!(error = ?err, "Failed to load config");
            return ExitCode::FAILURE;
        }
    };

    // Fully verify config before proceeding
    match provision.validate() {
        Err(err) => {
            error!(error = ?err, "Failed to validate config");
            return ExitCode::FAILURE;
        }
        _ => debug!("Validated config"),
    };

    let Some(output) = provision.output.as_deref() else {
        error!("No output directory given");
        return ExitCode::FAILURE;
    };

    let mut answer = AnswerFile::new(provision.variant.variant());
    if let Some(templates) = &provision.templates {
        answer = answer.with_templates(templates);
    }
    answer.set_product(provision.product.as_deref());

    if !answer.set_serial_key(provision.serial_key.as_deref()) {
        warn!(serial_key = %answer.serial_key, "Continuing with the default serial key");
    }

    match answer.render(output, provision.staging.as_deref()) {
        Err(err) => {
            error!(error = ?err, "Failed to generate answer file");
            ExitCode::FAILURE
        }
        _ => ExitCode::SUCCESS,
    }
}

/// Combine the config file (if any) with the command line. Values given on
/// the command line take precedence.
pub fn provision(cmd: &super::Commands, cwd: &Path) -> Result<Provision> {
    let super::Commands::Render {
        output,
        variant,
        product,
        serial_key,
        staging,
        templates,
        config,
    } = cmd.clone()
    else {
        bail!("Not a render command");
    };

    let config_path = match config {
        Some(path) => Some(ConfigPath::from_file(path)?),
        None => ConfigPath::from_dir(cwd),
    };

    let mut provision = match config_path {
        Some(config_path) => {
            debug!(path = %config_path, "Loading config");
            config_path.load()?
        }
        None => Provision::default(),
    };

    if let Some(variant) = variant {
        provision.variant = variant;
    }
    provision.product = product.or(provision.product);
    provision.serial_key = serial_key.or(provision.serial_key);
    provision.output = output.or(provision.output);
    provision.staging = staging.or(provision.staging);
    provision.templates = templates.or(provision.templates);

    Ok(provision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        answer::ANSWER_FILE_NAME, cli::cmd::Commands, serial::DEFAULT_SERIAL_KEY,
        variant::VariantId,
    };
    use std::path::PathBuf;

    fn render(config: Option<PathBuf>) -> Commands {
        Commands::Render {
            output: None,
            variant: None,
            product: None,
            serial_key: None,
            staging: None,
            templates: None,
            config,
        }
    }

    #[test]
    fn test_defaults_without_config() -> Result<()> {
        let tmp = tempfile::tempdir()?;

        assert_eq!(provision(&render(None), tmp.path())?, Provision::default());
        Ok(())
    }

    #[test]
    fn test_command_line_overrides_config() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        std::fs::write(
            tmp.path().join("winattend.toml"),
            "variant = \"win81x86\"\nproduct = \"home\"\noutput = \"/srv/media\"\n",
        )?;

        let from_config = provision(&render(None), tmp.path())?;
        assert_eq!(from_config.variant, VariantId::Win81x86);
        assert_eq!(from_config.product.as_deref(), Some("home"));

        let cmd = Commands::Render {
            output: Some(PathBuf::from("/srv/other")),
            variant: Some(VariantId::Win81x64),
            product: None,
            serial_key: None,
            staging: None,
            templates: None,
            config: None,
        };
        let merged = provision(&cmd, tmp.path())?;
        assert_eq!(merged.variant, VariantId::Win81x64);
        assert_eq!(merged.product.as_deref(), Some("home"));
        assert_eq!(merged.output, Some(PathBuf::from("/srv/other")));
        Ok(())
    }

    #[test]
    fn test_explicit_config() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("media.json");
        std::fs::write(&path, r#"{"variant": "win81x86", "product": "enterprise"}"#)?;

        let provision = provision(&render(Some(path)), Path::new("/nonexistent"))?;
        assert_eq!(provision.variant, VariantId::Win81x86);
        assert_eq!(provision.product.as_deref(), Some("enterprise"));
        Ok(())
    }

    #[test_log::test]
    fn test_malformed_serial_key_falls_back() -> Result<()> {
        let media = tempfile::tempdir()?;
        let cmd = Commands::Render {
            output: Some(media.path().to_path_buf()),
            variant: None,
            product: None,
            serial_key: Some("BAD-KEY".into()),
            staging: None,
            templates: None,
            config: None,
        };

        let code = run(cmd);
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::SUCCESS));

        let xml = std::fs::read_to_string(media.path().join(ANSWER_FILE_NAME))?;
        assert!(xml.contains(DEFAULT_SERIAL_KEY));
        assert!(!xml.contains("BAD-KEY"));
        Ok(())
    }

    #[test]
    fn test_wrong_command() {
        assert!(provision(&Commands::Variants {}, Path::new(".")).is_err());
    }
}
