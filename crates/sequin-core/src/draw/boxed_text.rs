//! Labels drawn on top of a padded box.
//!
//! Agent caps, connection label masks and block section tags all share this
//! shape: a text block plus a rectangle sized to the text and its padding.
//! The rectangle goes to a caller-chosen layer while the text always goes to
//! [`RenderLayer::Labels`].

use svg::node::element as svg_element;

use crate::{
    apply_stroke,
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, StrokeDefinition, Text, TextAnchor, TextDefinition, TextSizer},
    geometry::{Insets, Point, Size},
};

/// Text style, padding and box attributes of a boxed label.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxedTextDefinition {
    text: TextDefinition,
    padding: Insets,
    fill: Option<Color>,
    stroke: Option<StrokeDefinition>,
    corner_radius: f32,
}

impl BoxedTextDefinition {
    pub fn new(text: TextDefinition, padding: Insets) -> Self {
        Self {
            text,
            padding,
            fill: None,
            stroke: None,
            corner_radius: 0.0,
        }
    }

    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }

    pub fn text(&self) -> &TextDefinition {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextDefinition {
        &mut self.text
    }

    pub fn padding(&self) -> Insets {
        self.padding
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn stroke(&self) -> Option<&StrokeDefinition> {
        self.stroke.as_ref()
    }

    pub fn corner_radius(&self) -> f32 {
        self.corner_radius
    }
}

/// A measured boxed label.
///
/// The render position is the anchor point on the box's top edge, aligned the
/// same way as the text: left edge, centre or right edge.
#[derive(Debug, Clone)]
pub struct BoxedText<'a> {
    definition: &'a BoxedTextDefinition,
    text: Text<'a>,
    box_layer: RenderLayer,
}

impl<'a> BoxedText<'a> {
    pub fn new(
        definition: &'a BoxedTextDefinition,
        content: &'a str,
        box_layer: RenderLayer,
        sizer: &TextSizer,
    ) -> Self {
        Self {
            definition,
            text: Text::new(definition.text(), content, sizer),
            box_layer,
        }
    }
}

impl Drawable for BoxedText<'_> {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let size = self.size();
        let padding = self.definition.padding();

        let (box_x, label_x) = match self.definition.text().anchor() {
            TextAnchor::Middle => (position.x() - size.width() / 2.0, position.x()),
            TextAnchor::End => (position.x() - size.width(), position.x() - padding.right()),
            TextAnchor::Start => (position.x(), position.x() + padding.left()),
        };

        let mut rect = svg_element::Rectangle::new()
            .set("x", box_x)
            .set("y", position.y())
            .set("width", size.width())
            .set("height", size.height());
        rect = match self.definition.fill() {
            Some(fill) => rect.set("fill", &fill),
            None => rect.set("fill", "none"),
        };
        if self.definition.corner_radius() > 0.0 {
            rect = rect
                .set("rx", self.definition.corner_radius())
                .set("ry", self.definition.corner_radius());
        }
        if let Some(stroke) = self.definition.stroke() {
            rect = apply_stroke!(rect, stroke);
        }
        output.add_to_layer(self.box_layer, Box::new(rect));

        output.merge(
            self.text
                .render_to_layers(Point::new(label_x, position.y() + padding.top())),
        );
        output
    }

    fn size(&self) -> Size {
        self.text.size().add_padding(self.definition.padding())
    }
}
