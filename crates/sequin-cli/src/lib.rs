//! CLI logic for the Sequin sequence diagram tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::fs;

use log::info;

use sequin::{DiagramBuilder, SequinError};

/// Run the Sequin CLI application
///
/// Reads the input file, parses and renders it, and writes the SVG to the
/// output file.
///
/// # Errors
///
/// Returns `SequinError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors
/// - Layout errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), SequinError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing sequence"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;

    let builder = DiagramBuilder::new(app_config);
    let sequence = builder.parse(&source)?;
    let svg = builder.render_svg(&sequence)?;

    fs::write(&args.output, svg)?;

    info!(output_file = args.output; "SVG exported successfully");

    Ok(())
}
