use std::path::PathBuf;

use crate::config::ConfigPath;
use crate::variant::VariantId;

pub mod init;
pub mod render;
pub mod variants;

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate an answer file
    Render {
        /// The root of the installation media tree, which receives
        /// autounattend.xml
        #[clap(index = 1)]
        output: Option<PathBuf>,

        /// The variant to generate for
        #[clap(long, value_enum)]
        variant: Option<VariantId>,

        /// The edition to install (defaults to the best edition on the media)
        #[clap(long)]
        product: Option<String>,

        /// The product key (defaults to a generic key)
        #[clap(long)]
        serial_key: Option<String>,

        /// Write the answer file here first and then move it into place
        #[clap(long)]
        staging: Option<PathBuf>,

        /// A directory containing <family>/autounattend.xml templates
        #[clap(long)]
        templates: Option<PathBuf>,

        /// A provisioning config file (defaults to one in the current
        /// directory)
        #[clap(long)]
        config: Option<PathBuf>,
    },

    /// List the variants answer files can be generated for
    Variants {},

    /// Write a new provisioning config file
    Init {
        /// Config format
        #[clap(long, value_enum)]
        format: Option<ConfigPath>,

        /// The variant to generate for
        #[clap(long, value_enum)]
        variant: Option<VariantId>,

        /// The directory to write the config file into
        #[clap(index = 1)]
        path: Option<PathBuf>,
    },
}
