//! Connection arrowheads.

use svg::node::element as svg_element;

use crate::{
    apply_stroke,
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, StrokeDefinition},
    geometry::{Point, Size},
};

/// Size and paint of an arrowhead.
///
/// `width` is measured along the line, `height` across it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowheadDefinition {
    width: f32,
    height: f32,
    fill: Option<Color>,
    stroke: StrokeDefinition,
}

impl ArrowheadDefinition {
    pub fn new(width: f32, height: f32, fill: Option<Color>, stroke: StrokeDefinition) -> Self {
        Self {
            width,
            height,
            fill,
            stroke,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill
    }

    pub fn stroke(&self) -> &StrokeDefinition {
        &self.stroke
    }

    /// Distance to pull a line end back from an agent's lifeline so that the
    /// arrowhead tip, including its stroke, touches the lifeline exactly.
    ///
    /// ```
    /// # use sequin_core::draw::{ArrowheadDefinition, StrokeDefinition};
    /// # use sequin_core::color::Color;
    /// let mut stroke = StrokeDefinition::default();
    /// stroke.set_width(0.0);
    /// let arrow = ArrowheadDefinition::new(4.0, 8.0, Some(Color::default()), stroke);
    /// assert_eq!(arrow.short(1.0), 0.5);
    /// ```
    pub fn short(&self, agent_line_width: f32) -> f32 {
        let h = self.height / 2.0;
        let w = self.width;
        let t = self.stroke.width() * 0.5;
        let arrow_distance = t * ((w * w) / (h * h) + 1.0).sqrt();
        agent_line_width * 0.5 + arrow_distance
    }
}

/// Which way an arrowhead points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowheadDirection {
    Left,
    Right,
}

/// An arrowhead whose render position is its tip.
#[derive(Debug, Clone)]
pub struct Arrowhead<'a> {
    definition: &'a ArrowheadDefinition,
    direction: ArrowheadDirection,
}

impl<'a> Arrowhead<'a> {
    pub fn new(definition: &'a ArrowheadDefinition, direction: ArrowheadDirection) -> Self {
        Self {
            definition,
            direction,
        }
    }

    fn points(&self, tip: Point) -> String {
        // Pointing left means the barbs trail off to the right of the tip.
        let dx = match self.direction {
            ArrowheadDirection::Left => self.definition.width(),
            ArrowheadDirection::Right => -self.definition.width(),
        };
        let dy = self.definition.height() / 2.0;
        format!(
            "{} {} {} {} {} {}",
            tip.x() + dx,
            tip.y() - dy,
            tip.x(),
            tip.y(),
            tip.x() + dx,
            tip.y() + dy
        )
    }
}

impl Drawable for Arrowhead<'_> {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let points = self.points(position);
        let stroke = self.definition.stroke();
        let node: Box<dyn svg::Node> = match self.definition.fill() {
            Some(fill) => {
                let polygon = svg_element::Polygon::new()
                    .set("points", points)
                    .set("fill", &fill);
                Box::new(apply_stroke!(polygon, stroke))
            }
            None => {
                let polyline = svg_element::Polyline::new()
                    .set("points", points)
                    .set("fill", "none");
                Box::new(apply_stroke!(polyline, stroke))
            }
        };
        output.add_to_layer(RenderLayer::Shapes, node);
        output
    }

    fn size(&self) -> Size {
        Size::new(self.definition.width(), self.definition.height())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn definition(fill: Option<Color>, stroke_width: f32) -> ArrowheadDefinition {
        let mut stroke = StrokeDefinition::default();
        stroke.set_width(stroke_width);
        ArrowheadDefinition::new(4.0, 8.0, fill, stroke)
    }

    #[test]
    fn test_short_grows_with_stroke() {
        let thin = definition(None, 0.0);
        let thick = definition(None, 2.0);
        assert_approx_eq!(f32, thin.short(1.0), 0.5);
        // t = 1, w/h = 1 => sqrt(2)
        assert_approx_eq!(f32, thick.short(1.0), 0.5 + 2.0f32.sqrt());
    }

    #[test]
    fn test_filled_arrowhead_is_polygon() {
        let def = definition(Some(Color::default()), 0.0);
        let output = Arrowhead::new(&def, ArrowheadDirection::Right).render_to_layers(Point::new(10.0, 5.0));
        let rendered = output.render()[0].to_string();
        assert!(rendered.contains("<polygon"));
        assert!(rendered.contains("points=\"6 1 10 5 6 9\""), "{rendered}");
    }

    #[test]
    fn test_unfilled_arrowhead_is_polyline() {
        let def = definition(None, 1.0);
        let output = Arrowhead::new(&def, ArrowheadDirection::Left).render_to_layers(Point::new(0.0, 0.0));
        let rendered = output.render()[0].to_string();
        assert!(rendered.contains("<polyline"));
        assert!(rendered.contains("points=\"4 -4 0 0 4 4\""), "{rendered}");
    }
}
