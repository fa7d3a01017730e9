//! Note and state boxes.

use svg::node::element as svg_element;

use crate::{
    apply_stroke,
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, StrokeDefinition},
    geometry::{Point, Size},
};

/// Size of the folded corner on a [`NoteShape::Folded`] box.
const FOLD: f32 = 7.0;

/// Outline of a note box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteShape {
    /// Rectangle with a folded top-right corner
    Folded,
    /// Rectangle with rounded corners of the given radius
    Rounded(f32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoteBoxDefinition {
    shape: NoteShape,
    fill: Color,
    stroke: StrokeDefinition,
}

impl NoteBoxDefinition {
    pub fn new(shape: NoteShape, fill: Color, stroke: StrokeDefinition) -> Self {
        Self {
            shape,
            fill,
            stroke,
        }
    }

    pub fn shape(&self) -> NoteShape {
        self.shape
    }
}

/// A note box whose render position is its top-left corner.
#[derive(Debug, Clone)]
pub struct NoteBox<'a> {
    definition: &'a NoteBoxDefinition,
    size: Size,
}

impl<'a> NoteBox<'a> {
    pub fn new(definition: &'a NoteBoxDefinition, size: Size) -> Self {
        Self { definition, size }
    }
}

impl Drawable for NoteBox<'_> {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let def = self.definition;
        let (x0, y0) = (position.x(), position.y());
        let (x1, y1) = (x0 + self.size.width(), y0 + self.size.height());

        match def.shape {
            NoteShape::Folded => {
                let outline = svg_element::Path::new()
                    .set(
                        "d",
                        format!(
                            "M {x0} {y0} L {} {y0} L {x1} {} L {x1} {y1} L {x0} {y1} Z",
                            x1 - FOLD,
                            y0 + FOLD
                        ),
                    )
                    .set("fill", &def.fill);
                output.add_to_layer(RenderLayer::Shapes, Box::new(apply_stroke!(outline, &def.stroke)));

                let fold = svg_element::Path::new()
                    .set(
                        "d",
                        format!(
                            "M {fx} {y0} L {fx} {fy} L {x1} {fy}",
                            fx = x1 - FOLD,
                            fy = y0 + FOLD
                        ),
                    )
                    .set("fill", "none");
                output.add_to_layer(RenderLayer::Shapes, Box::new(apply_stroke!(fold, &def.stroke)));
            }
            NoteShape::Rounded(radius) => {
                let rect = svg_element::Rectangle::new()
                    .set("x", x0)
                    .set("y", y0)
                    .set("width", self.size.width())
                    .set("height", self.size.height())
                    .set("rx", radius)
                    .set("ry", radius)
                    .set("fill", &def.fill);
                output.add_to_layer(RenderLayer::Shapes, Box::new(apply_stroke!(rect, &def.stroke)));
            }
        }
        output
    }

    fn size(&self) -> Size {
        self.size
    }
}
