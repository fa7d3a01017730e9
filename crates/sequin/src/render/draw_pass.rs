//! Draw pass: places every stage vertically and emits its shapes.
//!
//! A single cursor moves down the diagram. Each agent remembers the lowest
//! point used on its lifeline. Before a stage draws, the cursor is pushed
//! below every agent whose lifeline lies within the stage's horizontal
//! range, so stages that overlap in time but not in space can share rows.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};
use svg::node::element as svg_element;

use sequin_core::{
    apply_stroke,
    draw::{
        Arrowhead, ArrowheadDirection, BoxedText, Drawable as _, LayeredOutput, NoteBox,
        RenderLayer, Text, TextAnchor, TextSizer,
    },
    geometry::{Point, Size},
    identifier::Id,
    semantic::{Block, CapStyle, Connection, Note, NotePosition, Section, Stage},
};

use crate::{
    layout::{AgentPositions, traverse::{StageVisitor, traverse}},
    theme::{NoteStyle, Theme},
};

/// Shapes of all stages and the height they occupy.
#[derive(Debug)]
pub(crate) struct DrawnStages {
    pub(crate) output: LayeredOutput,
    pub(crate) height: f32,
}

/// Runs the draw pass over `stages`.
pub(crate) fn draw_stages(
    stages: &[Stage],
    theme: &Theme,
    sizer: &TextSizer,
    positions: &AgentPositions,
) -> DrawnStages {
    let tracks = positions
        .iter()
        .map(|(id, x)| {
            (
                id,
                Track {
                    x,
                    latest_y: 0.0,
                    line_start: None,
                },
            )
        })
        .collect();

    let mut pass = DrawPass {
        theme,
        sizer,
        tracks,
        current_y: 0.0,
        marks: HashMap::new(),
        output: LayeredOutput::new(),
    };
    traverse(stages, &mut pass);
    pass.check_agent_range(&[Id::left_bound(), Id::right_bound()]);

    let height = (pass.current_y - theme.action_margin()).max(0.0);
    debug!(height = height, marks = pass.marks.len(); "Draw pass complete");
    DrawnStages {
        output: pass.output,
        height,
    }
}

/// Vertical bookkeeping for one agent's lifeline.
#[derive(Debug, Clone, Copy)]
struct Track {
    x: f32,
    /// Lowest Y used by any stage touching this lifeline.
    latest_y: f32,
    /// Where the current lifeline segment starts, while the agent is visible.
    line_start: Option<f32>,
}

/// How a cap offsets the lifeline and cursor.
#[derive(Debug, Clone, Copy)]
struct CapShift {
    /// Distance from the cap's top to where the lifeline ends.
    line_top: f32,
    /// Distance from the cap's top to where the lifeline starts.
    line_bottom: f32,
    height: f32,
}

/// Horizontal placement of a note box.
#[derive(Debug, Clone, Copy)]
enum NoteSpan {
    Centered(f32),
    Between(f32, f32),
    StartAt(f32),
    EndAt(f32),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockScope {
    top: f32,
    first: bool,
}

struct DrawPass<'a> {
    theme: &'a Theme,
    sizer: &'a TextSizer,
    /// Tracks in agent index order.
    tracks: IndexMap<Id, Track>,
    current_y: f32,
    marks: HashMap<String, f32>,
    output: LayeredOutput,
}

impl DrawPass<'_> {
    fn x(&self, agent: Id) -> f32 {
        self.tracks.get(&agent).map_or(0.0, |track| track.x)
    }

    /// X of the lowest- and highest-index agents of `agents`.
    fn x_range(&self, agents: &[Id]) -> Option<(f32, f32)> {
        let indexed = agents
            .iter()
            .filter_map(|id| self.tracks.get_full(id).map(|(index, _, track)| (index, track.x)));
        let (_, left) = indexed.clone().min_by_key(|(index, _)| *index)?;
        let (_, right) = indexed.max_by_key(|(index, _)| *index)?;
        Some((left, right))
    }

    fn tracks_in_range(&mut self, agents: &[Id]) -> impl Iterator<Item = &mut Track> {
        let (left, right) = self.x_range(agents).unwrap_or((f32::MAX, f32::MIN));
        self.tracks
            .values_mut()
            .filter(move |track| track.x >= left && track.x <= right)
    }

    /// Moves the cursor below everything drawn between the outer agents.
    fn check_agent_range(&mut self, agents: &[Id]) {
        let lowest = self
            .tracks_in_range(agents)
            .map(|track| track.latest_y)
            .fold(f32::MIN, f32::max);
        self.current_y = self.current_y.max(lowest);
    }

    /// Records the cursor as used between the outer agents.
    fn mark_agent_range(&mut self, agents: &[Id]) {
        let y = self.current_y;
        for track in self.tracks_in_range(agents) {
            track.latest_y = y;
        }
    }

    fn draw_cap(&mut self, agent: Id, cap: CapStyle) -> CapShift {
        let theme = self.theme;
        let caps = &theme.agent_cap;
        let x = self.x(agent);
        let y = self.current_y;

        match cap {
            CapStyle::Box => {
                let label = agent.to_string();
                let boxed = BoxedText::new(&caps.boxed, &label, RenderLayer::Shapes, self.sizer);
                self.output.merge(boxed.render_to_layers(Point::new(x, y)));
                let height = boxed.size().height();
                CapShift {
                    line_top: 0.0,
                    line_bottom: height,
                    height,
                }
            }
            CapStyle::Cross => {
                let d = caps.cross_size / 2.0;
                let path = svg_element::Path::new()
                    .set(
                        "d",
                        format!(
                            "M {} {y} L {} {} M {} {y} L {} {}",
                            x - d,
                            x + d,
                            y + d * 2.0,
                            x + d,
                            x - d,
                            y + d * 2.0
                        ),
                    )
                    .set("fill", "none");
                self.output.add_to_layer(
                    RenderLayer::Shapes,
                    Box::new(apply_stroke!(path, &caps.cross_stroke)),
                );
                CapShift {
                    line_top: d,
                    line_bottom: d,
                    height: d * 2.0,
                }
            }
            CapStyle::Bar => {
                let label = agent.to_string();
                let width = self.sizer.width(caps.boxed.text(), &label)
                    + caps.boxed.padding().horizontal_sum();
                let rect = svg_element::Rectangle::new()
                    .set("x", x - width / 2.0)
                    .set("y", y)
                    .set("width", width)
                    .set("height", caps.bar_height)
                    .set("fill", &caps.bar_fill);
                self.output.add_to_layer(RenderLayer::Shapes, Box::new(rect));
                CapShift {
                    line_top: 0.0,
                    line_bottom: caps.bar_height,
                    height: caps.bar_height,
                }
            }
            CapStyle::None => CapShift {
                line_top: caps.none_height,
                line_bottom: 0.0,
                height: caps.none_height,
            },
        }
    }

    fn draw_lifeline(&mut self, agent: Id, end_y: f32) {
        let Some((index, _, track)) = self.tracks.get_full_mut(&agent) else {
            return;
        };
        let Some(start_y) = track.line_start.take() else {
            return;
        };
        let line = svg_element::Line::new()
            .set("x1", track.x)
            .set("y1", start_y)
            .set("x2", track.x)
            .set("y2", end_y)
            .set("class", format!("agent-{index}-line"));
        self.output.add_to_layer(
            RenderLayer::AgentLines,
            Box::new(apply_stroke!(line, &self.theme.agent_line)),
        );
    }

    fn draw_simple_connection(&mut self, connection: &Connection) {
        let theme = self.theme;
        let config = &theme.connect;
        let options = connection.options();
        let from_x = self.x(connection.from());
        let to_x = self.x(connection.to());

        let dy = config.arrow.height() / 2.0;
        let dir = if from_x < to_x { 1.0 } else { -1.0 };
        let short = config.arrow.short(theme.agent_line.width());
        let label_height = self.sizer.height(config.label.text(), connection.label())
            + config.label_margin.vertical_sum();
        let y = self.current_y + dy.max(label_height);

        if !connection.label().is_empty() {
            let label = BoxedText::new(&config.label, connection.label(), RenderLayer::Mask, self.sizer);
            let position = Point::new(
                (from_x + to_x) / 2.0,
                y - label_height + config.label_margin.top(),
            );
            self.output.merge(label.render_to_layers(position));
        }

        let start_x = from_x + if options.left() { short * dir } else { 0.0 };
        let end_x = to_x - if options.right() { short * dir } else { 0.0 };
        let line = svg_element::Line::new()
            .set("x1", start_x)
            .set("y1", y)
            .set("x2", end_x)
            .set("y2", y);
        self.output.add_to_layer(
            RenderLayer::Shapes,
            Box::new(apply_stroke!(line, config.stroke(options.line()))),
        );

        // An arrowhead points away from the line it terminates.
        let (toward_from, toward_to) = if dir > 0.0 {
            (ArrowheadDirection::Left, ArrowheadDirection::Right)
        } else {
            (ArrowheadDirection::Right, ArrowheadDirection::Left)
        };
        if options.left() {
            let head = Arrowhead::new(&config.arrow, toward_from);
            self.output
                .merge(head.render_to_layers(Point::new(from_x + short * dir, y)));
        }
        if options.right() {
            let head = Arrowhead::new(&config.arrow, toward_to);
            self.output
                .merge(head.render_to_layers(Point::new(to_x - short * dir, y)));
        }

        self.current_y = y + dy + theme.action_margin();
    }

    fn draw_self_connection(&mut self, connection: &Connection) {
        let theme = self.theme;
        let config = &theme.connect;
        let options = connection.options();
        let from_x = self.x(connection.from());

        let dy = config.arrow.height() / 2.0;
        let short = config.arrow.short(theme.agent_line.width());
        let label_height = self.sizer.height(config.label.text(), connection.label())
            + config.label_margin.vertical_sum();
        let mask_padding = config.loopback_label.padding();

        let y0 = self.current_y + dy.max(label_height);
        let x0 = from_x + short + config.arrow.width() + config.label_padding;

        let label = BoxedText::new(
            &config.loopback_label,
            connection.label(),
            RenderLayer::Mask,
            self.sizer,
        );
        if !connection.label().is_empty() {
            let position = Point::new(
                x0 - mask_padding.left(),
                y0 - label_height + config.label_margin.top(),
            );
            self.output.merge(label.render_to_layers(position));
        }

        let r = config.loopback_radius;
        let x1 = x0 + label.size().width() + config.label_padding - mask_padding.horizontal_sum();
        let y1 = y0 + r * 2.0;
        let start_x = from_x + if options.left() { short } else { 0.0 };
        let end_x = from_x + if options.right() { short } else { 0.0 };

        let path = svg_element::Path::new()
            .set(
                "d",
                format!("M {start_x} {y0} L {x1} {y0} A {r} {r} 0 0 1 {x1} {y1} L {end_x} {y1}"),
            )
            .set("fill", "none");
        self.output.add_to_layer(
            RenderLayer::Shapes,
            Box::new(apply_stroke!(path, config.stroke(options.line()))),
        );

        let tip_x = from_x + short;
        if options.left() {
            let head = Arrowhead::new(&config.arrow, ArrowheadDirection::Left);
            self.output.merge(head.render_to_layers(Point::new(tip_x, y0)));
        }
        if options.right() {
            let head = Arrowhead::new(&config.arrow, ArrowheadDirection::Left);
            self.output.merge(head.render_to_layers(Point::new(tip_x, y1)));
        }

        self.current_y = y1 + dy + theme.action_margin();
    }

    fn draw_note(&mut self, span: NoteSpan, style: &NoteStyle, label: &str) {
        self.current_y += style.margin.top();
        let top = self.current_y;
        let padding = style.padding;

        let text = Text::new(&style.label, label, self.sizer);
        let size = text.size().add_padding(padding);

        let (x0, x1) = match span {
            NoteSpan::Centered(mid) => (mid - size.width() / 2.0, mid + size.width() / 2.0),
            NoteSpan::Between(x0, x1) => (x0, x1),
            NoteSpan::StartAt(x0) => (x0, x0 + size.width()),
            NoteSpan::EndAt(x1) => (x1 - size.width(), x1),
        };

        let shape = NoteBox::new(&style.shape, Size::new(x1 - x0, size.height()));
        self.output.merge(shape.render_to_layers(Point::new(x0, top)));

        let label_x = match style.label.anchor() {
            TextAnchor::Middle => (x0 + padding.left() + x1 - padding.right()) / 2.0,
            TextAnchor::End => x1 - padding.right(),
            TextAnchor::Start => x0 + padding.left(),
        };
        self.output
            .merge(text.render_to_layers(Point::new(label_x, top + padding.top())));

        self.current_y += size.height() + style.margin.bottom() + self.theme.action_margin();
    }
}

impl StageVisitor for DrawPass<'_> {
    type BlockScope = BlockScope;

    fn block_begin(&mut self, block: &Block) -> BlockScope {
        let bounds = [block.left(), block.right()];
        self.check_agent_range(&bounds);
        self.current_y += self.theme.block.margin.top();
        let scope = BlockScope {
            top: self.current_y,
            first: true,
        };
        self.mark_agent_range(&bounds);
        scope
    }

    fn section_begin(&mut self, scope: &mut BlockScope, block: &Block, section: &Section) {
        let bounds = [block.left(), block.right()];
        self.check_agent_range(&bounds);
        let theme = self.theme;
        let config = &theme.block;
        let left_x = self.x(block.left());
        let right_x = self.x(block.right());

        if scope.first {
            scope.first = false;
        } else {
            self.current_y += config.section_padding.bottom();
            let separator = svg_element::Line::new()
                .set("x1", left_x)
                .set("y1", self.current_y)
                .set("x2", right_x)
                .set("y2", self.current_y);
            self.output.add_to_layer(
                RenderLayer::Sections,
                Box::new(apply_stroke!(separator, &config.separator)),
            );
        }

        let y = self.current_y;
        let mode = BoxedText::new(&config.mode, section.mode().as_str(), RenderLayer::Blocks, self.sizer);
        self.output.merge(mode.render_to_layers(Point::new(left_x, y)));

        let label = BoxedText::new(&config.label, section.label(), RenderLayer::Mask, self.sizer);
        if !section.label().is_empty() {
            self.output
                .merge(label.render_to_layers(Point::new(left_x + mode.size().width(), y)));
        }

        self.current_y +=
            mode.size().height().max(label.size().height()) + config.section_padding.top();
        self.mark_agent_range(&bounds);
    }

    fn section_end(&mut self, _scope: &mut BlockScope, _block: &Block, _section: &Section) {}

    fn block_end(&mut self, scope: BlockScope, block: &Block) {
        let bounds = [block.left(), block.right()];
        self.check_agent_range(&bounds);
        let theme = self.theme;
        let config = &theme.block;
        self.current_y += config.section_padding.bottom();

        let left_x = self.x(block.left());
        let right_x = self.x(block.right());
        let rect = svg_element::Rectangle::new()
            .set("x", left_x)
            .set("y", scope.top)
            .set("width", right_x - left_x)
            .set("height", self.current_y - scope.top)
            .set("rx", config.box_radius)
            .set("ry", config.box_radius)
            .set("fill", "none");
        self.output.add_to_layer(
            RenderLayer::Blocks,
            Box::new(apply_stroke!(rect, &config.box_stroke)),
        );

        self.current_y += config.margin.bottom() + theme.action_margin();
        self.mark_agent_range(&bounds);
    }

    fn agent_begin(&mut self, agents: &[Id], cap: CapStyle) {
        self.check_agent_range(agents);
        let mut max_height: f32 = 0.0;
        for agent in agents {
            let shift = self.draw_cap(*agent, cap);
            max_height = max_height.max(shift.height);
            let line_start = self.current_y + shift.line_bottom;
            if let Some(track) = self.tracks.get_mut(agent) {
                track.line_start = Some(line_start);
            }
        }
        self.current_y += max_height + self.theme.action_margin();
        self.mark_agent_range(agents);
    }

    fn agent_end(&mut self, agents: &[Id], cap: CapStyle) {
        self.check_agent_range(agents);
        let mut max_height: f32 = 0.0;
        for agent in agents {
            let shift = self.draw_cap(*agent, cap);
            max_height = max_height.max(shift.height);
            self.draw_lifeline(*agent, self.current_y + shift.line_top);
        }
        self.current_y += max_height + self.theme.action_margin();
        self.mark_agent_range(agents);
    }

    fn connection(&mut self, connection: &Connection) {
        let agents = [connection.from(), connection.to()];
        self.check_agent_range(&agents);
        if connection.is_self_connection() {
            self.draw_self_connection(connection);
        } else {
            self.draw_simple_connection(connection);
        }
        trace!(y = self.current_y; "Connection drawn");
        self.mark_agent_range(&agents);
    }

    fn note(&mut self, note: &Note) {
        let agents = note.agents();
        self.check_agent_range(agents);
        let Some((left_x, right_x)) = self.x_range(agents) else {
            return;
        };
        let theme = self.theme;
        let style = theme.note_style(note.mode());

        let span = match note.position() {
            NotePosition::Over if agents.len() > 1 => {
                let (overlap_left, overlap_right) = style.overlap;
                NoteSpan::Between(left_x - overlap_left, right_x + overlap_right)
            }
            NotePosition::Over => NoteSpan::Centered(left_x),
            NotePosition::Left => NoteSpan::EndAt(left_x - style.margin.right()),
            NotePosition::Right => NoteSpan::StartAt(right_x + style.margin.left()),
            NotePosition::Between => NoteSpan::Centered((left_x + right_x) / 2.0),
        };
        self.draw_note(span, style, note.label());
        self.mark_agent_range(agents);
    }

    fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), self.current_y);
    }

    fn async_jump(&mut self, target: Option<&str>) {
        self.current_y = target
            .and_then(|name| self.marks.get(name).copied())
            .unwrap_or(0.0);
    }
}
