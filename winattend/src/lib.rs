//! Generates `autounattend.xml` answer files for unattended Windows
//! installations.

pub mod answer;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod edition;
pub mod random;
pub mod serial;
pub mod template;
pub mod variant;

pub use answer::AnswerFile;

/// Build info
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
