//! Turns a generated [`Sequence`] into positioned SVG output.
//!
//! Rendering runs three passes over the stage tree:
//!
//! 1. [`compute_separations`] collects minimum distances between agents;
//! 2. [`position_agents`] resolves them to X coordinates;
//! 3. the draw pass walks the stages again, top to bottom, emitting shapes.
//!
//! The title and background are added last, once the extent of the diagram
//! is known.

mod draw_pass;

use std::collections::HashSet;

use log::{debug, info};
use svg::node::element as svg_element;

use sequin_core::{
    draw::{Drawable as _, LayeredOutput, RenderLayer, Text, TextSizer},
    geometry::{Bounds, Point},
    identifier::Id,
    semantic::{Agent, Sequence, Stage},
};

use crate::{
    error::SequinError,
    layout::{AgentPositions, compute_separations, position_agents},
    theme::Theme,
};

/// Renders sequences with a fixed theme.
///
/// The renderer owns a [`TextSizer`]; its measurement cache is cleared at the
/// start of every [`render`](Self::render) call.
#[derive(Debug)]
pub struct Renderer {
    theme: Theme,
    sizer: TextSizer,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        let sizer = TextSizer::from_metrics(theme.text_metrics());
        Self { theme, sizer }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Lays out and draws `sequence`.
    ///
    /// # Errors
    ///
    /// Returns [`SequinError::Layout`] if the agent list contains duplicates
    /// or a stage references an agent that is not in it.
    pub fn render(&mut self, sequence: &Sequence) -> Result<RenderedDiagram, SequinError> {
        self.sizer.reset_cache();

        let agents = with_bounds(sequence.agents());
        validate_references(&agents, sequence.stages())?;
        info!(agents = agents.len(), stages = sequence.stages().len(); "Rendering sequence");

        let separations = compute_separations(&agents, sequence.stages(), &self.theme, &self.sizer);
        let positions = position_agents(&separations);
        let drawn = draw_pass::draw_stages(sequence.stages(), &self.theme, &self.sizer, &positions);
        let mut output = drawn.output;

        let title = Text::new(&self.theme.title, sequence.meta().title(), &self.sizer)
            .with_class("title");
        let title_size = title.size();
        let title_y = if title_size.height() > 0.0 {
            -self.theme.title_margin() - title_size.height()
        } else {
            0.0
        };
        let center_x = (positions.min_x() + positions.max_x()) / 2.0;
        output.merge(title.render_to_layers(Point::new(center_x, title_y)));

        let outer = self.theme.outer_margin();
        let view_box = Bounds::new(
            positions.min_x().min(center_x - title_size.width() / 2.0) - outer,
            title_y - outer,
            positions.max_x().max(center_x + title_size.width() / 2.0) + outer,
            drawn.height + outer,
        );

        if let Some(background) = self.theme.background() {
            let rect = svg_element::Rectangle::new()
                .set("x", view_box.min_x())
                .set("y", view_box.min_y())
                .set("width", view_box.width())
                .set("height", view_box.height())
                .set("fill", &background);
            output.add_to_layer(RenderLayer::Background, Box::new(rect));
        }

        debug!(
            width = view_box.width(),
            height = view_box.height(),
            cached_texts = self.sizer.cached_len();
            "Sequence rendered"
        );
        Ok(RenderedDiagram {
            view_box,
            positions,
            output,
        })
    }
}

/// Agent list with `[` first and `]` last, added if missing.
fn with_bounds(agents: &[Agent]) -> Vec<Agent> {
    let mut result = Vec::with_capacity(agents.len() + 2);
    if agents.first().is_none_or(|agent| agent.name() != Id::left_bound()) {
        result.push(Agent::new(Id::left_bound()).with_anchor_right(true));
    }
    result.extend_from_slice(agents);
    if agents.last().is_none_or(|agent| agent.name() != Id::right_bound()) {
        result.push(Agent::new(Id::right_bound()));
    }
    result
}

fn validate_references(agents: &[Agent], stages: &[Stage]) -> Result<(), SequinError> {
    let mut known = HashSet::with_capacity(agents.len());
    for agent in agents {
        if !known.insert(agent.name()) {
            return Err(SequinError::Layout(format!(
                "duplicate agent `{}`",
                agent.name()
            )));
        }
    }
    check_stages(&known, stages)
}

fn check_stages(known: &HashSet<Id>, stages: &[Stage]) -> Result<(), SequinError> {
    for stage in stages {
        if let Some(missing) = stage.agents().into_iter().find(|id| !known.contains(id)) {
            return Err(SequinError::Layout(format!("unknown agent `{missing}`")));
        }
        if let Stage::Block(block) = stage {
            for section in block.sections() {
                check_stages(known, section.stages())?;
            }
        }
    }
    Ok(())
}

/// A laid-out diagram: agent positions plus layered SVG output.
#[derive(Debug)]
pub struct RenderedDiagram {
    view_box: Bounds,
    positions: AgentPositions,
    output: LayeredOutput,
}

impl RenderedDiagram {
    pub fn width(&self) -> f32 {
        self.view_box.width()
    }

    pub fn height(&self) -> f32 {
        self.view_box.height()
    }

    /// The visible area, including the title and outer margin.
    pub fn view_box(&self) -> Bounds {
        self.view_box
    }

    /// X coordinate of the agent called `name`.
    pub fn agent_x(&self, name: &str) -> Option<f32> {
        self.positions.x(Id::new(name))
    }

    pub fn positions(&self) -> &AgentPositions {
        &self.positions
    }

    /// Number of SVG nodes drawn on `layer`.
    pub fn layer_len(&self, layer: RenderLayer) -> usize {
        self.output.layer_len(layer)
    }

    /// Builds the SVG document, one group per non-empty layer.
    pub fn into_svg(self) -> svg::Document {
        let view_box = self.view_box;
        let document = svg::Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    view_box.min_x(),
                    view_box.min_y(),
                    view_box.width(),
                    view_box.height()
                ),
            )
            .set("width", view_box.width())
            .set("height", view_box.height());

        self.output
            .render()
            .into_iter()
            .fold(document, |document, group| document.add(group))
    }
}
