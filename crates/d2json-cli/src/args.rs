//! Command-line argument definitions for the d2json CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, layout engine and output format overrides, and logging
//! verbosity.

use clap::Parser;

use d2json::config::LayoutEngine;

/// Command-line arguments for the d2json converter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input D2 file
    #[arg(help = "Path to the input D2 file, or '-' for stdin", default_value = "-")]
    pub input: String,

    /// Path to the output JSON file
    #[arg(short, long, default_value = "-")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// External layout engine to run before the fallback layout
    /// (sugiyama, none); overrides the configuration file
    #[arg(long)]
    pub layout: Option<LayoutEngine>,

    /// Write JSON on a single line; overrides the configuration file
    #[arg(long)]
    pub compact: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// `true` when the input should be read from stdin.
    pub fn reads_stdin(&self) -> bool {
        self.input == "-"
    }

    /// `true` when the output should be written to stdout.
    pub fn writes_stdout(&self) -> bool {
        self.output == "-"
    }
}
