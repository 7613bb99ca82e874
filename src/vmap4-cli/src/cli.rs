//! CLI argument definitions for vmap4extractor

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "vmap4extractor")]
#[command(about = "World collision geometry (vmap) extractor")]
#[command(version)]
pub struct Args {
    /// Small size (data size optimization); the default
    #[arg(short = 's', long, conflicts_with = "large")]
    pub small: bool,

    /// Large size, may contain more geometry detail
    #[arg(short = 'l', long)]
    pub large: bool,

    /// Path to the client data source folder
    #[arg(short = 'd', long, default_value = ".")]
    pub data: PathBuf,

    /// Output directory for exported containers
    #[arg(short = 'o', long, default_value = "Buildings")]
    pub output: PathBuf,
}
