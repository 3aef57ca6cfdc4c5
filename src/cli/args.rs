use std::path::PathBuf;

use clap::Parser;
use rocket::figment::Figment;

use crate::{Commands, Config};

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Personal notes served over HTTP, addressed by slug"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding notes and users
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Keep notes and users in memory only
    #[clap(long)]
    pub in_memory: bool,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the slugnotes application
    #[clap(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Configuration sources with the command-line overrides on top.
    pub fn figment(&self) -> Figment {
        let mut figment = Config::figment(self.config.as_deref());
        if let Some(data_dir) = &self.data_dir {
            figment = figment.merge(("data_dir", data_dir));
        }
        if self.in_memory {
            figment = figment.merge(("persist", false));
        }
        figment
    }
}
