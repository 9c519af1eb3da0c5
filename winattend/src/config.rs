use anyhow::{Result, bail};
use clap::{ValueEnum, builder::PossibleValue};
use serde::{Deserialize, Serialize};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
    sync::OnceLock,
};
use validator::Validate;

use crate::variant::VariantId;

/// Everything needed to generate an answer file, as stored in a config file.
#[derive(Clone, Serialize, Deserialize, Validate, Debug, Default, PartialEq)]
pub struct Provision {
    /// The variant to generate for
    #[serde(default)]
    pub variant: VariantId,

    /// The requested edition
    #[validate(length(min = 1, max = 64))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,

    /// The product key (a generic key is used when missing or malformed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_key: Option<String>,

    /// The root of the installation media tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Where the answer file is staged before it's moved into place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staging: Option<PathBuf>,

    /// A directory that overrides the builtin templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub templates: Option<PathBuf>,
}

/// Represents a provisioning config file. This mainly helps sort out the
/// various supported config formats.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigPath {
    Json(PathBuf),
    Ron(PathBuf),
    Toml(PathBuf),
    Yaml(PathBuf),
}

impl Default for ConfigPath {
    fn default() -> Self {
        ConfigPath::Yaml(PathBuf::from("./winattend.yaml"))
    }
}

static VARIANTS: OnceLock<Vec<ConfigPath>> = OnceLock::new();

impl ValueEnum for ConfigPath {
    fn value_variants<'a>() -> &'a [Self] {
        VARIANTS.get_or_init(|| {
            vec![
                ConfigPath::Json(PathBuf::from("./winattend.json")),
                ConfigPath::Ron(PathBuf::from("./winattend.ron")),
                ConfigPath::Toml(PathBuf::from("./winattend.toml")),
                ConfigPath::Yaml(PathBuf::from("./winattend.yaml")),
            ]
        })
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        match *self {
            ConfigPath::Json(_) => Some(PossibleValue::new("json")),
            ConfigPath::Ron(_) => Some(PossibleValue::new("ron")),
            ConfigPath::Toml(_) => Some(PossibleValue::new("toml")),
            ConfigPath::Yaml(_) => Some(PossibleValue::new("yaml")),
        }
    }
}

impl ConfigPath {
    /// Check for a provisioning config file in the given directory.
    pub fn from_dir(path: impl AsRef<Path>) -> Option<ConfigPath> {
        let path = path.as_ref();

        if path.join("winattend.json").exists() {
            return Some(ConfigPath::Json(path.join("winattend.json")));
        }
        if path.join("winattend.ron").exists() {
            return Some(ConfigPath::Ron(path.join("winattend.ron")));
        }
        if path.join("winattend.toml").exists() {
            return Some(ConfigPath::Toml(path.join("winattend.toml")));
        }
        if path.join("winattend.yaml").exists() {
            return Some(ConfigPath::Yaml(path.join("winattend.yaml")));
        } else if path.join("winattend.yml").exists() {
            return Some(ConfigPath::Yaml(path.join("winattend.yml")));
        }

        None
    }

    /// Determine the format of a config file from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<ConfigPath> {
        let path = path.as_ref().to_path_buf();

        Ok(match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigPath::Json(path),
            Some("ron") => ConfigPath::Ron(path),
            Some("toml") => ConfigPath::Toml(path),
            Some("yaml") | Some("yml") => ConfigPath::Yaml(path),
            _ => bail!("Unknown config format: {}", path.display()),
        })
    }

    /// The same format, but in the given directory.
    pub fn in_dir(&self, dir: impl AsRef<Path>) -> ConfigPath {
        let dir = dir.as_ref();
        let file_name = self.path().file_name().map(PathBuf::from).unwrap_or_default();

        match self {
            ConfigPath::Json(_) => ConfigPath::Json(dir.join(file_name)),
            ConfigPath::Ron(_) => ConfigPath::Ron(dir.join(file_name)),
            ConfigPath::Toml(_) => ConfigPath::Toml(dir.join(file_name)),
            ConfigPath::Yaml(_) => ConfigPath::Yaml(dir.join(file_name)),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ConfigPath::Json(path) => path,
            ConfigPath::Ron(path) => path,
            ConfigPath::Toml(path) => path,
            ConfigPath::Yaml(path) => path,
        }
    }

    /// Read the configuration.
    pub fn load(&self) -> Result<Provision> {
        Ok(match &self {
            Self::Json(path) => serde_json::from_slice(&std::fs::read(path)?)?,
            Self::Ron(path) => ron::de::from_bytes(&std::fs::read(path)?)?,
            Self::Toml(path) => toml::from_str(String::from_utf8(std::fs::read(path)?)?.as_str())?,
            Self::Yaml(path) => serde_yaml::from_slice(&std::fs::read(path)?)?,
        })
    }

    /// Write a new configuration file.
    pub fn write(&self, provision: &Provision) -> Result<()> {
        match &self {
            Self::Json(path) => std::fs::write(path, serde_json::to_vec_pretty(provision)?),
            Self::Ron(path) => std::fs::write(
                path,
                ron::ser::to_string_pretty(provision, ron::ser::PrettyConfig::new())?,
            ),
            Self::Toml(path) => std::fs::write(path, toml::to_string_pretty(provision)?),
            Self::Yaml(path) => std::fs::write(path, serde_yaml::to_string(provision)?),
        }?;
        Ok(())
    }
}

impl Display for ConfigPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.path().to_string_lossy().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provision() -> Provision {
        Provision {
            variant: VariantId::Win81x86,
            product: Some("home".into()),
            serial_key: Some("W269N-WFGWX-YVC9B-4J6C9-T83GX".into()),
            output: Some(PathBuf::from("/tmp/media")),
            staging: None,
            templates: None,
        }
    }

    #[test]
    fn test_write_and_load_every_format() -> Result<()> {
        let tmp = tempfile::tempdir()?;

        for format in ConfigPath::value_variants() {
            let config_path = format.in_dir(tmp.path());
            config_path.write(&provision())?;

            assert_eq!(ConfigPath::from_file(config_path.path())?, config_path);
            assert_eq!(config_path.load()?, provision());
            std::fs::remove_file(config_path.path())?;
        }
        Ok(())
    }

    #[test]
    fn test_from_dir() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        assert_eq!(ConfigPath::from_dir(tmp.path()), None);

        std::fs::write(tmp.path().join("winattend.yml"), "variant: win81x64\n")?;
        let config_path = ConfigPath::from_dir(tmp.path()).unwrap();
        assert_eq!(config_path, ConfigPath::Yaml(tmp.path().join("winattend.yml")));

        let provision = config_path.load()?;
        assert_eq!(provision.variant, VariantId::Win81x64);
        assert_eq!(provision.product, None);
        Ok(())
    }

    #[test]
    fn test_unknown_extension() {
        assert!(ConfigPath::from_file("winattend.ini").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(provision().validate().is_ok());
        assert!(Provision::default().validate().is_ok());

        // Malformed keys are replaced when rendering, not rejected here
        let bad_key = Provision {
            serial_key: Some("nope".into()),
            ..provision()
        };
        assert!(bad_key.validate().is_ok());

        let empty_product = Provision {
            product: Some(String::new()),
            ..provision()
        };
        assert!(empty_product.validate().is_err());
    }
}
