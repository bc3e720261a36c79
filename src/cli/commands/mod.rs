//! CLI commands module

pub mod audit;

use clap::Args;
use std::path::PathBuf;

/// Arguments for the all command
#[derive(Args, Debug)]
pub struct AllArgs {
    /// YAML file enabling, disabling and configuring auditors
    #[arg(short = 'k', long, value_name = "FILE")]
    pub kconfig: Option<PathBuf>,
}

/// Arguments for the image command
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Image every container must use, as `name:tag`
    #[arg(short, long, value_name = "NAME:TAG")]
    pub image: Option<String>,
}
