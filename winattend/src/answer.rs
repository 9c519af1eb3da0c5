use anyhow::{Context, Result, bail};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, info};
use winattend_media::Manifest;

use crate::{
    diagnostics::{Diagnostics, TracingDiagnostics},
    edition::{resolve_edition, validate_request},
    random::random_string,
    serial::{EXAMPLE_ENCODING, SerialKey},
    template::{Placeholder, Substitutions, Template},
    variant::Variant,
};

/// The name of the generated answer file in the output directory.
pub const ANSWER_FILE_NAME: &str = "autounattend.xml";

/// Where the build manifest lives relative to the root of the media.
pub fn manifest_path(media: &Path) -> PathBuf {
    media.join("sources").join("product.ini")
}

/// Generates the `autounattend.xml` answer file for one variant.
pub struct AnswerFile {
    pub variant: Variant,

    /// The product key written into the answer file
    pub serial_key: SerialKey,

    /// The edition requested by the user, if any
    pub product: Option<String>,

    /// A directory that overrides the builtin templates
    pub templates: Option<PathBuf>,

    diagnostics: Arc<dyn Diagnostics>,
}

impl AnswerFile {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            serial_key: SerialKey::default(),
            product: None,
            templates: None,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_templates(mut self, templates: impl Into<PathBuf>) -> Self {
        self.templates = Some(templates.into());
        self
    }

    pub fn set_product(&mut self, product: Option<&str>) {
        self.product = product.map(|p| p.to_string());
    }

    /// Set the product key. An absent or empty key selects the default key.
    ///
    /// Returns `false` and keeps the current key when the key has the wrong
    /// encoding. Accepted keys are stored exactly as given.
    pub fn set_serial_key(&mut self, key: Option<&str>) -> bool {
        match key.filter(|k| !k.is_empty()) {
            None => {
                self.serial_key = SerialKey::default();
                true
            }
            Some(key) => match key.parse::<SerialKey>() {
                Ok(key) => {
                    self.serial_key = key;
                    true
                }
                Err(_) => {
                    self.diagnostics
                        .error("The provided serial key has an incorrect encoding");
                    self.diagnostics
                        .info(&format!("Example encoding: {}", EXAMPLE_ENCODING));
                    false
                }
            },
        }
    }

    /// Read the editions staged on the media below `media`.
    pub fn staged_editions(&self, media: &Path) -> Vec<String> {
        let path = manifest_path(media);

        match Manifest::open(&path) {
            Ok(manifest) => manifest.staged_editions(),
            Err(error) => {
                self.diagnostics.warn(&format!(
                    "Ignoring unreadable build manifest {}: {}",
                    path.display(),
                    error
                ));
                Vec::new()
            }
        }
    }

    /// Decide which edition the answer file for the media below `media`
    /// would install.
    pub fn effective_edition(&self, media: &Path) -> String {
        let staged = self.staged_editions(media);
        let requested = validate_request(
            self.variant.preference,
            self.product.as_deref(),
            self.diagnostics.as_ref(),
        );

        let edition = resolve_edition(self.variant.preference, &staged, requested.as_deref());
        debug!(?staged, ?requested, %edition, "Resolved edition");
        edition
    }

    /// Build the placeholder values for the given edition. Credentials are
    /// generated fresh every time.
    pub fn substitutions(&self, edition: &str) -> Result<Substitutions> {
        let Some(arch) = self.variant.arch else {
            bail!(
                "Variant {} has no architecture and can't be rendered",
                self.variant.name
            );
        };

        let mut values = Substitutions::new();
        values
            .set(Placeholder::ProductKey, self.serial_key.as_str())
            .set(Placeholder::ComputerName, random_string(8, 14))
            .set(Placeholder::Username, random_string(8, 12))
            .set(Placeholder::Password, random_string(8, 16))
            .set(Placeholder::Product, edition.to_uppercase())
            .set(Placeholder::Arch, arch.to_string())
            .set(Placeholder::Interface, self.variant.interface);
        Ok(values)
    }

    /// Write the answer file into `output`, which is also where the build
    /// manifest is looked for.
    ///
    /// When a staging directory is given the answer file is written there
    /// first and then moved into place.
    pub fn render(&self, output: &Path, staging: Option<&Path>) -> Result<PathBuf> {
        let edition = self.effective_edition(output);
        let values = self.substitutions(&edition)?;

        let template = Template::load(self.variant.name, self.templates.as_deref())?;
        let rendered = template.render(&values);

        std::fs::create_dir_all(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        let path = output.join(ANSWER_FILE_NAME);
        write_output(&path, rendered.as_bytes(), staging)?;

        info!(
            variant = %self.variant,
            %edition,
            path = %path.display(),
            "Generated answer file"
        );
        Ok(path)
    }
}

fn write_output(path: &Path, content: &[u8], staging: Option<&Path>) -> Result<()> {
    if let Some(staging) = staging {
        std::fs::create_dir_all(staging)
            .with_context(|| format!("Failed to create {}", staging.display()))?;

        let mut staged = tempfile::NamedTempFile::new_in(staging)?;
        staged.write_all(content)?;
        staged.flush()?;

        match staged.persist(path) {
            Ok(_) => return Ok(()),
            Err(error) => {
                debug!(error = %error.error, "Failed to move staged answer file, writing directly")
            }
        }
    }

    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
