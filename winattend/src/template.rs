//! Answer file templates are plain text containing `@TOKEN@` placeholders.

use anyhow::{Context, Result, bail};
use regex::{Captures, Regex};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

/// The file name of templates inside a template directory.
pub const TEMPLATE_FILE_NAME: &str = "autounattend.xml";

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Z][A-Z0-9_]*)@").expect("placeholder pattern is valid"));

/// The placeholders that answer file templates may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Display, EnumIter, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Placeholder {
    ProductKey,
    ComputerName,
    Username,
    Password,
    Product,
    Arch,
    Interface,
}

/// Values for the placeholders of a single render.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitutions(BTreeMap<String, String>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, placeholder: Placeholder, value: impl Into<String>) -> &mut Self {
        self.0.insert(placeholder.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An answer file template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    /// Where the template came from
    pub origin: String,

    pub text: String,
}

impl Template {
    /// The template compiled into the binary for the given variant family.
    pub fn builtin(family: &str) -> Option<Template> {
        let text = match family {
            "win81" => include_str!("../templates/win81/autounattend.xml"),
            _ => return None,
        };

        Some(Template {
            origin: format!("builtin:{family}"),
            text: text.to_string(),
        })
    }

    /// Read a template from a file.
    pub fn open(path: impl AsRef<Path>) -> Result<Template> {
        let path = path.as_ref();
        let buf = std::fs::read(path)
            .with_context(|| format!("Failed to read template {}", path.display()))?;

        Ok(Template {
            origin: path.display().to_string(),
            text: String::from_utf8(buf)
                .with_context(|| format!("Template {} is not valid UTF-8", path.display()))?,
        })
    }

    /// Find the template for a variant family, either below the given
    /// directory or among the builtin templates.
    pub fn load(family: &str, directory: Option<&Path>) -> Result<Template> {
        if let Some(directory) = directory {
            return Template::open(Template::path_in(directory, family));
        }

        match Template::builtin(family) {
            Some(template) => Ok(template),
            None => bail!("No answer file template for variant family {}", family),
        }
    }

    /// Where the template for a variant family lives below a template
    /// directory.
    pub fn path_in(directory: &Path, family: &str) -> PathBuf {
        directory.join(family).join(TEMPLATE_FILE_NAME)
    }

    /// Replace every placeholder that has a value. Unknown placeholders are
    /// left as they are.
    pub fn render(&self, values: &Substitutions) -> String {
        let rendered = PLACEHOLDER.replace_all(&self.text, |captures: &Captures| {
            match values.get(&captures[1]) {
                Some(value) => value.to_string(),
                None => captures[0].to_string(),
            }
        });

        let unresolved = unresolved(&rendered);
        if !unresolved.is_empty() {
            debug!(template = %self.origin, ?unresolved, "Placeholders left unresolved");
        }

        rendered.into_owned()
    }

    /// The distinct placeholders used by this template.
    pub fn placeholders(&self) -> Vec<String> {
        unresolved(&self.text)
    }
}

/// Find the distinct `@TOKEN@` placeholders in the given text.
pub fn unresolved(text: &str) -> Vec<String> {
    let mut found: Vec<String> = PLACEHOLDER
        .captures_iter(text)
        .map(|captures| captures[1].to_string())
        .collect();
    found.sort();
    found.dedup();
    found
}
