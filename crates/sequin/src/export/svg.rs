//! SVG output.

use std::io::{self, Write as _};

use log::debug;

use super::{Error, Exporter};
use crate::render::RenderedDiagram;

/// Writes diagrams as standalone SVG documents to `W`.
///
/// ```
/// # use sequin::{DiagramBuilder, export::{Exporter, svg::SvgExporter}};
/// let builder = DiagramBuilder::default();
/// let sequence = builder.parse("A -> B: hello").unwrap();
/// let diagram = builder.render(&sequence).unwrap();
///
/// let mut exporter = SvgExporter::new(Vec::new());
/// exporter.export(diagram).unwrap();
/// let svg = String::from_utf8(exporter.into_inner()).unwrap();
/// assert!(svg.starts_with("<svg"));
/// ```
#[derive(Debug)]
pub struct SvgExporter<W: io::Write> {
    writer: W,
}

impl<W: io::Write> SvgExporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> Exporter for SvgExporter<W> {
    fn export(&mut self, diagram: RenderedDiagram) -> Result<(), Error> {
        let (width, height) = (diagram.width(), diagram.height());
        if !width.is_finite() || !height.is_finite() {
            return Err(Error::Render(format!(
                "diagram size {width}x{height} is not finite"
            )));
        }

        let document = diagram.into_svg();
        svg::write(&mut self.writer, &document)?;
        self.writer.flush()?;
        debug!(width = width, height = height; "SVG written");
        Ok(())
    }
}
