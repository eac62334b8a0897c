//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Generate ccbv-style class hierarchy docs for web applications
#[derive(Parser, Debug)]
#[command(name = "classydoc")]
#[command(about = "Generate ccbv-style class hierarchy docs for web applications")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify classes and generate documentation pages
    Classify {
        /// Fully-qualified class paths; discovers every documentable
        /// class when omitted
        classes: Vec<String>,

        /// Class registry snapshot exported by the host application
        #[arg(short, long, default_value = "classes.json")]
        registry: PathBuf,

        /// Relative path for output files to be saved
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format (html, json)
        #[arg(long, default_value = "html")]
        format: String,

        /// Serve the generated docs after writing them
        #[arg(short, long)]
        serve: bool,

        /// Port to serve on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Serve generated documentation locally
    Serve {
        /// Path to the generated docs
        path: PathBuf,

        /// Port to serve on
        #[arg(short, long, default_value = "8000")]
        port: u16,
    },

    /// Show version information
    Version,
}
