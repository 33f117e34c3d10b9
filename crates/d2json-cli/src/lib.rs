//! CLI logic for the d2json converter.
//!
//! Reads D2 from a file or stdin, converts it, and writes JSON to a file or
//! stdout.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Read, Write},
};

use log::info;

use d2json::{Converter, D2JsonError};

/// Run the d2json CLI application
///
/// Loads configuration, applies command-line overrides, converts the input
/// diagram and writes the JSON document.
///
/// # Errors
///
/// Returns `D2JsonError` for:
/// - File or stream I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Serialization errors
pub fn run(args: &Args) -> Result<(), D2JsonError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing diagram"
    );

    // Load configuration, then let flags override it
    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(engine) = args.layout {
        app_config.layout_mut().set_engine(engine);
    }
    if args.compact {
        app_config.output_mut().set_pretty(false);
    }

    let source = read_input(args)?;

    let converter = Converter::new(app_config);
    let diagram = converter.convert_source(&source)?;
    let mut json = converter.to_json(&diagram)?;
    json.push('\n');

    write_output(args, &json)?;

    info!(output = args.output; "JSON exported successfully");

    Ok(())
}

fn read_input(args: &Args) -> Result<String, D2JsonError> {
    if args.reads_stdin() {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        Ok(source)
    } else {
        Ok(fs::read_to_string(&args.input)?)
    }
}

fn write_output(args: &Args, json: &str) -> Result<(), D2JsonError> {
    if args.writes_stdout() {
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        stdout.flush()?;
    } else {
        fs::write(&args.output, json)?;
    }
    Ok(())
}
