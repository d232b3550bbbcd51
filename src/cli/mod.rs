use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "gemlet")]
#[command(about = "An interactive terminal client for Gemini", long_about = None)]
pub struct Cli {
    /// URL or host to open instead of the configured homepage
    pub url: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// PEM file of trusted server certificates
    #[arg(long)]
    pub cert: Option<PathBuf>,

    /// Maximum column width for wrapped text
    #[arg(short, long)]
    pub width: Option<usize>,

    /// Do not word-wrap documents
    #[arg(long)]
    pub no_wrap: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(cert) = &self.cert {
            config.cert_file = cert.display().to_string();
        }
        if let Some(width) = self.width {
            config.wrap_width = width;
        }
        if self.no_wrap {
            config.wrap_text = false;
        }
    }
}
