//! Variants describe one installable Windows release on one architecture.
//!
//! A family is declared once as a constant without an architecture and every
//! concrete variant is derived from it with [`Variant::with_arch`].

use anyhow::{Result, bail};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use winattend_media::MediaArch;

/// Static description of an installable Windows release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variant {
    /// The family name, which also selects the answer file template
    pub name: &'static str,

    pub display_name: &'static str,

    pub service_pack: u8,

    /// Where the installation media is mounted
    pub mount: &'static str,

    /// The emulated network adapter model
    pub nictype: &'static str,

    /// Directory on the media whose contents are copied to the system drive
    pub osdir: &'static str,

    /// The label Windows gives the first network interface
    pub interface: &'static str,

    /// Options for authoring the installation disc
    pub genisoargs: &'static [&'static str],

    /// Editions ranked from most to least desirable
    pub preference: &'static [&'static str],

    /// Unset for a family that hasn't been specialized yet
    pub arch: Option<MediaArch>,
}

/// Windows 8.1 Update.
pub const WINDOWS_81: Variant = Variant {
    name: "win81",
    display_name: "Windows 8.1",
    service_pack: 2,
    mount: "/mnt/win81",
    nictype: "82540EM",
    osdir: "sources/$oem$/$1",
    interface: "Ethernet",
    genisoargs: &[
        "-no-emul-boot",
        "-iso-level",
        "2",
        "-udf",
        "-J",
        "-l",
        "-D",
        "-N",
        "-joliet-long",
        "-relaxed-filenames",
    ],
    preference: &["pro", "enterprise", "home"],
    arch: None,
};

impl Variant {
    /// Specialize this variant for the given architecture.
    pub const fn with_arch(self, arch: MediaArch) -> Variant {
        Variant {
            arch: Some(arch),
            ..self
        }
    }

    /// Check the preference list is usable.
    pub fn validate(&self) -> Result<()> {
        if self.preference.is_empty() {
            bail!("Variant {} has no edition preferences", self.name);
        }

        let mut seen = HashSet::new();
        for edition in self.preference {
            if *edition != edition.to_lowercase() {
                bail!("Edition {} of variant {} is not lowercase", edition, self.name);
            }
            if !seen.insert(*edition) {
                bail!("Edition {} appears twice in variant {}", edition, self.name);
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.arch {
            Some(arch) => write!(f, "{} ({})", self.display_name, arch),
            None => write!(f, "{}", self.display_name),
        }
    }
}

/// Every variant that answer files can be generated for.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum VariantId {
    #[default]
    #[value(name = "win81x64")]
    Win81x64,
    #[value(name = "win81x86")]
    Win81x86,
}

impl VariantId {
    pub fn variant(&self) -> Variant {
        match self {
            VariantId::Win81x64 => WINDOWS_81.with_arch(MediaArch::Amd64),
            VariantId::Win81x86 => WINDOWS_81.with_arch(MediaArch::X86),
        }
    }

    /// All registered variants.
    pub fn all() -> Vec<(VariantId, Variant)> {
        VariantId::iter().map(|id| (id, id.variant())).collect()
    }
}
