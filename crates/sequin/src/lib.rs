//! Sequin - a text language for sequence diagrams.
//!
//! Parsing lives in `sequin-parser` and the shared model in `sequin-core`.
//! This crate adds the theme, the three-pass layout engine, rendering and
//! SVG export, tied together by [`DiagramBuilder`].

pub mod config;
pub mod export;
pub mod layout;
pub mod theme;

mod error;
mod render;

pub use sequin_core::{color, draw, geometry, identifier, semantic};

pub use error::SequinError;
pub use render::{RenderedDiagram, Renderer};

use log::{debug, info, trace};

use config::AppConfig;
use export::{Exporter, svg::SvgExporter};
use theme::Theme;

/// Builder for parsing and rendering Sequin diagrams.
///
/// # Examples
///
/// ```rust
/// use sequin::{DiagramBuilder, config::AppConfig};
///
/// let source = "title Hello\nAlice -> Bob: hi";
///
/// // With custom config
/// let config = AppConfig::default();
/// let builder = DiagramBuilder::new(config);
///
/// // Parse source to semantic model
/// let sequence = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Render semantic model to SVG
/// let svg = builder.render_svg(&sequence)
///     .expect("Failed to render");
/// assert!(svg.contains("Hello"));
///
/// // Or use default config
/// let builder = DiagramBuilder::default();
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse source code into a generated sequence.
    ///
    /// This runs tokenising, line splitting, line parsing and generation.
    ///
    /// # Errors
    ///
    /// Returns [`SequinError::Parse`] with the source attached, so the caller
    /// can render the diagnostics against it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequin::DiagramBuilder;
    ///
    /// let builder = DiagramBuilder::default();
    /// let sequence = builder.parse("A -> B").expect("Failed to parse");
    /// assert_eq!(sequence.stages().len(), 3);
    /// ```
    pub fn parse(&self, source: &str) -> Result<semantic::Sequence, SequinError> {
        info!("Parsing sequence");

        let sequence = sequin_parser::parse(source)
            .map_err(|err| SequinError::new_parse_error(err, source))?;

        debug!(agents = sequence.agents().len(); "Sequence parsed successfully");
        trace!(sequence:? = sequence; "Parsed sequence");

        Ok(sequence)
    }

    /// Lay out and draw a sequence.
    ///
    /// # Errors
    ///
    /// Returns [`SequinError::Config`] if the style configuration is invalid,
    /// or [`SequinError::Layout`] if the sequence references unknown agents.
    pub fn render(&self, sequence: &semantic::Sequence) -> Result<RenderedDiagram, SequinError> {
        let theme = Theme::from_config(&self.config).map_err(SequinError::Config)?;
        let mut renderer = Renderer::new(theme);
        renderer.render(sequence)
    }

    /// Render a sequence to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns `SequinError` for configuration, layout or export errors.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sequin::DiagramBuilder;
    ///
    /// let builder = DiagramBuilder::default();
    /// let sequence = builder.parse("A -> B: hello").expect("Failed to parse");
    /// let svg = builder.render_svg(&sequence).expect("Failed to render");
    /// assert!(svg.contains("hello"));
    /// ```
    pub fn render_svg(&self, sequence: &semantic::Sequence) -> Result<String, SequinError> {
        let diagram = self.render(sequence)?;

        let mut exporter = SvgExporter::new(Vec::new());
        exporter.export(diagram)?;
        let svg = String::from_utf8(exporter.into_inner())
            .map_err(|err| SequinError::Export(Box::new(err)))?;

        info!(bytes = svg.len(); "SVG rendered successfully");
        Ok(svg)
    }
}
