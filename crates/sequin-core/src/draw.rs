//! Drawable components for sequence diagram rendering.
//!
//! Every component implements [`Drawable`], which renders into a
//! [`LayeredOutput`] at a caller-supplied position and reports its size.
//! Components that contain text are measured through a [`TextSizer`] when
//! they are constructed, so the layout passes can query sizes before drawing.

mod arrow;
mod boxed_text;
mod layer;
mod note_box;
mod stroke;
mod text;

pub use arrow::{Arrowhead, ArrowheadDefinition, ArrowheadDirection};
pub use boxed_text::{BoxedText, BoxedTextDefinition};
pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use note_box::{NoteBox, NoteBoxDefinition, NoteShape};
pub use stroke::{StrokeDefinition, StrokeJoin, StrokeStyle};
pub use text::{
    EstimateMeasurer, FontMeasurer, LINE_HEIGHT, Text, TextAnchor, TextDefinition, TextMeasurer,
    TextMetrics, TextSizer,
};

use crate::geometry::{Point, Size};

/// A diagram element that can be rendered to SVG layers.
pub trait Drawable: std::fmt::Debug {
    /// Renders this drawable at `position` into one or more layers.
    ///
    /// What `position` refers to (top-left corner, anchor point, arrow tip)
    /// is documented on each implementation.
    fn render_to_layers(&self, position: Point) -> LayeredOutput;

    /// Returns the size of this drawable.
    fn size(&self) -> Size;
}
