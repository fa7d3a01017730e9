//! Layer-based z-ordering for SVG output.
//!
//! Drawables push SVG nodes into a [`LayeredOutput`] tagged with a
//! [`RenderLayer`]. When rendered, nodes are grouped per layer and emitted
//! bottom to top, so a label mask always sits between lifelines and labels
//! regardless of the order stages were drawn in.
//!
//! ```
//! # use sequin_core::draw::{RenderLayer, LayeredOutput};
//! # use svg::node::element::{Line, Text};
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Labels, Box::new(Text::new("hi")));
//! output.add_to_layer(RenderLayer::AgentLines, Box::new(Line::new()));
//!
//! // Two groups, agent lines first.
//! assert_eq!(output.render().len(), 2);
//! ```

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Optional diagram background fill
    Background,
    /// Vertical agent lifelines
    AgentLines,
    /// Opaque boxes behind labels that hide lines crossing them
    Mask,
    /// Block frames and section mode tags
    Blocks,
    /// Dividers between block sections
    Sections,
    /// Agent caps, connection lines, arrowheads and note boxes
    Shapes,
    /// Text
    Labels,
}

impl RenderLayer {
    /// Value of the `data-layer` attribute for this layer's group.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::AgentLines => "agent-lines",
            Self::Mask => "mask",
            Self::Blocks => "blocks",
            Self::Sections => "sections",
            Self::Shapes => "shapes",
            Self::Labels => "labels",
        }
    }
}

/// SVG nodes collected per layer.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node to `layer`.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Moves every node of `other` into this output.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of nodes added to `layer`.
    pub fn layer_len(&self, layer: RenderLayer) -> usize {
        self.items.iter().filter(|(l, _)| *l == layer).count()
    }

    /// Renders all layers to `<g data-layer="...">` groups, consuming the output.
    ///
    /// Empty layers are skipped. Within a layer, nodes keep insertion order.
    pub fn render(mut self) -> Vec<SvgNode> {
        if self.is_empty() {
            return Vec::new();
        }

        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result = Vec::new();
        let mut current_layer = self.items[0].0;
        let mut current_group = svg_element::Group::new().set("data-layer", current_layer.name());

        for (layer, node) in self.items {
            if layer != current_layer {
                result.push(Box::new(current_group) as SvgNode);
                current_layer = layer;
                current_group = svg_element::Group::new().set("data-layer", layer.name());
            }
            current_group = current_group.add(node);
        }
        result.push(Box::new(current_group) as SvgNode);

        result
    }
}
