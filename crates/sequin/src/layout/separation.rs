//! Separation pass: minimum horizontal distances between agents.
//!
//! Walks the stage tree once, tracking which agents are visible. Every stage
//! contributes a required distance between some agent pairs, and padding on
//! the outer side of some agents. Contributions combine by maximum, so the
//! final distance between two agents is the largest single requirement.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, trace};

use sequin_core::{
    draw::{TextDefinition, TextSizer},
    identifier::Id,
    semantic::{Agent, Block, CapStyle, Connection, Note, NotePosition, Section, Stage},
};

use super::traverse::{StageVisitor, traverse};
use crate::theme::Theme;

/// Space an agent needs on each side of its lifeline for one stage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct AgentSpace {
    left: f32,
    right: f32,
}

impl AgentSpace {
    pub(crate) fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    fn centered(width: f32) -> Self {
        Self::new(width / 2.0, width / 2.0)
    }
}

/// Layout bookkeeping for one agent.
#[derive(Debug, Clone)]
pub struct AgentSpacing {
    index: usize,
    anchor_right: bool,
    separations: HashMap<Id, f32>,
    max_left_pad: f32,
    max_right_pad: f32,
}

impl AgentSpacing {
    /// Position in the agent list.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn anchor_right(&self) -> bool {
        self.anchor_right
    }

    /// Largest space any stage required to the left of this agent.
    pub fn max_left_pad(&self) -> f32 {
        self.max_left_pad
    }

    /// Largest space any stage required to the right of this agent.
    pub fn max_right_pad(&self) -> f32 {
        self.max_right_pad
    }

    /// Registered separations to other agents.
    pub fn separations(&self) -> impl Iterator<Item = (Id, f32)> + '_ {
        self.separations.iter().map(|(id, dist)| (*id, *dist))
    }
}

/// Symmetric minimum-separation table over an ordered agent list.
///
/// ```
/// # use sequin::layout::Separations;
/// # use sequin::semantic::Agent;
/// # use sequin::identifier::Id;
/// let (a, b) = (Id::new("A"), Id::new("B"));
/// let mut separations = Separations::new(&[Agent::new(a), Agent::new(b)]);
/// separations.add_separation(a, b, 30.0);
/// separations.add_separation(b, a, 10.0);
/// assert_eq!(separations.separation(a, b), Some(30.0));
/// assert_eq!(separations.separation(b, a), Some(30.0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Separations {
    agents: IndexMap<Id, AgentSpacing>,
}

impl Separations {
    /// Creates an empty table; agent indices follow slice order.
    pub fn new(agents: &[Agent]) -> Self {
        let agents = agents
            .iter()
            .enumerate()
            .map(|(index, agent)| {
                (
                    agent.name(),
                    AgentSpacing {
                        index,
                        anchor_right: agent.anchor_right(),
                        separations: HashMap::new(),
                        max_left_pad: 0.0,
                        max_right_pad: 0.0,
                    },
                )
            })
            .collect();
        Self { agents }
    }

    pub fn get(&self, id: Id) -> Option<&AgentSpacing> {
        self.agents.get(&id)
    }

    /// Agents sorted by index.
    pub fn ordered(&self) -> Vec<(Id, &AgentSpacing)> {
        let mut ordered: Vec<_> = self.agents.iter().map(|(id, info)| (*id, info)).collect();
        ordered.sort_by_key(|(_, info)| info.index);
        ordered
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Required distance between two agents, if any stage registered one.
    pub fn separation(&self, a: Id, b: Id) -> Option<f32> {
        self.agents.get(&a)?.separations.get(&b).copied()
    }

    /// Raises the required distance between `a` and `b` to at least `dist`.
    pub fn add_separation(&mut self, a: Id, b: Id, dist: f32) {
        if a == b {
            return;
        }
        for (from, to) in [(a, b), (b, a)] {
            if let Some(info) = self.agents.get_mut(&from) {
                let current = info.separations.entry(to).or_insert(0.0);
                *current = current.max(dist);
            }
        }
    }

    /// Adds separations between every pair of `visible` agents.
    ///
    /// The distance for a pair is the inner space of both agents plus
    /// `margin`. Agents missing from `spaces` need no space. Each agent's
    /// outer padding is raised to its own space.
    pub(crate) fn add_separations(
        &mut self,
        visible: &[Id],
        spaces: &HashMap<Id, AgentSpace>,
        margin: f32,
    ) {
        let space_of = |id: &Id| spaces.get(id).copied().unwrap_or_default();

        for right in visible {
            let space_r = space_of(right);
            let Some(info_r) = self.agents.get_mut(right) else {
                continue;
            };
            info_r.max_left_pad = info_r.max_left_pad.max(space_r.left);
            info_r.max_right_pad = info_r.max_right_pad.max(space_r.right);
            let index_r = info_r.index;

            for left in visible {
                let is_left_of = self
                    .agents
                    .get(left)
                    .is_some_and(|info_l| info_l.index < index_r);
                if is_left_of {
                    let space_l = space_of(left);
                    self.add_separation(*right, *left, space_r.left + space_l.right + margin);
                }
            }
        }
    }

    /// Lowest- and highest-index agents of `ids`. Unknown agents are ignored.
    pub fn extremes(&self, ids: &[Id]) -> Option<(Id, Id)> {
        let known = ids
            .iter()
            .filter_map(|id| self.agents.get(id).map(|info| (info.index, *id)));
        let (_, left) = known.clone().min_by_key(|(index, _)| *index)?;
        let (_, right) = known.max_by_key(|(index, _)| *index)?;
        Some((left, right))
    }
}

/// Runs the separation pass over `stages`.
pub(crate) fn compute_separations(
    agents: &[Agent],
    stages: &[Stage],
    theme: &Theme,
    sizer: &TextSizer,
) -> Separations {
    let mut pass = SeparationPass {
        theme,
        sizer,
        separations: Separations::new(agents),
        visible: vec![Id::left_bound(), Id::right_bound()],
    };
    traverse(stages, &mut pass);

    debug!(agents = pass.separations.len(); "Separation pass complete");
    pass.separations
}

struct SeparationPass<'a> {
    theme: &'a Theme,
    sizer: &'a TextSizer,
    separations: Separations,
    visible: Vec<Id>,
}

impl SeparationPass<'_> {
    fn text_width(&self, definition: &TextDefinition, content: &str) -> f32 {
        self.sizer.width(definition, content)
    }

    fn show(&mut self, ids: &[Id]) {
        for id in ids {
            if !self.visible.contains(id) {
                self.visible.push(*id);
            }
        }
    }

    fn hide(&mut self, ids: &[Id]) {
        self.visible.retain(|id| !ids.contains(id));
    }

    fn add_visible_separations(&mut self, spaces: &HashMap<Id, AgentSpace>) {
        let visible = self.visible.clone();
        self.separations
            .add_separations(&visible, spaces, self.theme.agent_margin());
    }

    fn cap_space(&self, agent: Id, cap: CapStyle) -> AgentSpace {
        let caps = &self.theme.agent_cap;
        match cap {
            CapStyle::Box | CapStyle::Bar => {
                let label = agent.to_string();
                AgentSpace::centered(
                    self.text_width(caps.boxed.text(), &label) + caps.boxed.padding().horizontal_sum(),
                )
            }
            CapStyle::Cross => AgentSpace::centered(caps.cross_size),
            CapStyle::None => AgentSpace::default(),
        }
    }

    fn agent_caps(&mut self, agents: &[Id], cap: CapStyle) {
        let spaces: HashMap<Id, AgentSpace> = agents
            .iter()
            .map(|agent| (*agent, self.cap_space(*agent, cap)))
            .collect();
        self.add_visible_separations(&spaces);
    }

    fn note_width(&self, note: &Note, with_margin: bool) -> f32 {
        let style = self.theme.note_style(note.mode());
        let mut width = self.text_width(&style.label, note.label()) + style.padding.horizontal_sum();
        if with_margin {
            width += style.margin.horizontal_sum();
        }
        width
    }
}

impl StageVisitor for SeparationPass<'_> {
    type BlockScope = ();

    fn block_begin(&mut self, block: &Block) {
        self.show(&[block.left(), block.right()]);
        self.add_visible_separations(&HashMap::new());
    }

    fn section_begin(&mut self, _scope: &mut (), block: &Block, section: &Section) {
        let config = &self.theme.block;
        let width = self.text_width(config.mode.text(), section.mode().as_str())
            + config.mode.padding().horizontal_sum()
            + self.text_width(config.label.text(), section.label())
            + config.label.padding().horizontal_sum();
        self.separations
            .add_separation(block.left(), block.right(), width);
    }

    fn section_end(&mut self, _scope: &mut (), _block: &Block, _section: &Section) {}

    fn block_end(&mut self, _scope: (), block: &Block) {
        self.hide(&[block.left(), block.right()]);
    }

    fn agent_begin(&mut self, agents: &[Id], cap: CapStyle) {
        self.show(agents);
        self.agent_caps(agents, cap);
    }

    fn agent_end(&mut self, agents: &[Id], cap: CapStyle) {
        self.agent_caps(agents, cap);
        self.hide(agents);
    }

    fn connection(&mut self, connection: &Connection) {
        let config = &self.theme.connect;
        let label_width =
            self.text_width(config.label.text(), connection.label()) + config.label_padding * 2.0;
        let short = config.arrow.short(self.theme.agent_line.width());
        let arrow_width = config.arrow.width();

        if connection.is_self_connection() {
            let right = label_width + arrow_width + short + config.loopback_radius;
            let spaces = HashMap::from([(connection.from(), AgentSpace::new(0.0, right))]);
            self.add_visible_separations(&spaces);
        } else {
            self.separations.add_separation(
                connection.from(),
                connection.to(),
                label_width + arrow_width * 2.0 + short * 2.0,
            );
        }
        trace!(from:% = connection.from(), to:% = connection.to(); "Connection separation");
    }

    fn note(&mut self, note: &Note) {
        let Some((left, right)) = self.separations.extremes(note.agents()) else {
            return;
        };
        let style = self.theme.note_style(note.mode());

        match note.position() {
            NotePosition::Over => {
                let width = self.note_width(note, false);
                let spaces = if note.agents().len() > 1 {
                    let (overlap_left, overlap_right) = style.overlap;
                    self.separations
                        .add_separation(left, right, width - overlap_left - overlap_right);
                    HashMap::from([
                        (left, AgentSpace::new(overlap_left, 0.0)),
                        (right, AgentSpace::new(0.0, overlap_right)),
                    ])
                } else {
                    HashMap::from([(left, AgentSpace::centered(width))])
                };
                self.add_visible_separations(&spaces);
            }
            NotePosition::Left => {
                let width = self.note_width(note, true);
                self.add_visible_separations(&HashMap::from([(left, AgentSpace::new(width, 0.0))]));
            }
            NotePosition::Right => {
                let width = self.note_width(note, true);
                self.add_visible_separations(&HashMap::from([(right, AgentSpace::new(0.0, width))]));
            }
            NotePosition::Between if left == right => {
                let width = self.note_width(note, true);
                let spaces = HashMap::from([(left, AgentSpace::centered(width))]);
                self.add_visible_separations(&spaces);
            }
            NotePosition::Between => {
                let width = self.note_width(note, true);
                self.separations.add_separation(left, right, width);
            }
        }
    }

    fn mark(&mut self, _name: &str) {}

    fn async_jump(&mut self, _target: Option<&str>) {}
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;
    use sequin_core::{
        draw::TextMetrics,
        semantic::{ConnectionOptions, LineStyle, NoteMode, Stage},
    };

    use super::*;

    fn agents(names: &[&str]) -> Vec<Agent> {
        names
            .iter()
            .map(|name| Agent::new(Id::new(name)).with_anchor_right(*name == "["))
            .collect()
    }

    fn connect(from: &str, to: &str, label: &str) -> Stage {
        Stage::Connection(Connection::new(
            Id::new(from),
            Id::new(to),
            label,
            ConnectionOptions::new(LineStyle::Solid, false, true),
        ))
    }

    fn run(names: &[&str], stages: &[Stage]) -> Separations {
        let sizer = TextSizer::from_metrics(TextMetrics::Estimate);
        compute_separations(&agents(names), stages, &Theme::basic(), &sizer)
    }

    #[test]
    fn test_add_separation_keeps_maximum() {
        let (a, b) = (Id::new("A"), Id::new("B"));
        let mut separations = Separations::new(&agents(&["A", "B"]));
        assert_eq!(separations.separation(a, b), None);

        separations.add_separation(a, b, 5.0);
        separations.add_separation(b, a, 12.0);
        separations.add_separation(a, b, 3.0);
        assert_eq!(separations.separation(a, b), Some(12.0));
        assert_eq!(separations.separation(b, a), Some(12.0));
    }

    #[test]
    fn test_add_separations_uses_inner_spaces() {
        let ids: Vec<Id> = ["A", "B", "C"].iter().map(|n| Id::new(n)).collect();
        let mut separations = Separations::new(&agents(&["A", "B", "C"]));
        let spaces = HashMap::from([
            (ids[0], AgentSpace::new(1.0, 2.0)),
            (ids[2], AgentSpace::new(4.0, 8.0)),
        ]);
        separations.add_separations(&ids, &spaces, 10.0);

        // A.right + C.left + margin
        assert_eq!(separations.separation(ids[0], ids[2]), Some(16.0));
        assert_eq!(separations.separation(ids[0], ids[1]), Some(12.0));
        assert_eq!(separations.separation(ids[1], ids[2]), Some(14.0));
        assert_eq!(separations.get(ids[2]).unwrap().max_right_pad(), 8.0);
        assert_eq!(separations.get(ids[0]).unwrap().max_left_pad(), 1.0);
    }

    #[test]
    fn test_connection_separation() {
        let separations = run(&["[", "A", "B", "]"], &[connect("A", "B", "hello")]);
        let theme = Theme::basic();
        let sizer = TextSizer::from_metrics(TextMetrics::Estimate);
        let config = &theme.connect;
        let expected = sizer.width(config.label.text(), "hello")
            + config.label_padding * 2.0
            + config.arrow.width() * 2.0
            + config.arrow.short(theme.agent_line.width()) * 2.0;

        let dist = separations.separation(Id::new("A"), Id::new("B")).unwrap();
        assert_approx_eq!(f32, dist, expected);
    }

    #[test]
    fn test_only_visible_agents_are_separated() {
        let stages = [
            Stage::AgentBegin {
                agents: vec![Id::new("A")],
                cap: CapStyle::Box,
            },
            Stage::AgentEnd {
                agents: vec![Id::new("A")],
                cap: CapStyle::Cross,
            },
            Stage::AgentBegin {
                agents: vec![Id::new("B")],
                cap: CapStyle::Box,
            },
        ];
        let separations = run(&["[", "A", "B", "]"], &stages);

        assert_eq!(separations.separation(Id::new("A"), Id::new("B")), None);
        assert!(separations.separation(Id::left_bound(), Id::new("A")).is_some());
        assert!(separations.separation(Id::new("B"), Id::right_bound()).is_some());
    }

    #[test]
    fn test_self_connection_reserves_right_space() {
        let stages = [
            Stage::AgentBegin {
                agents: vec![Id::new("A")],
                cap: CapStyle::None,
            },
            connect("A", "A", "loop"),
        ];
        let separations = run(&["[", "A", "]"], &stages);
        let info = separations.get(Id::new("A")).unwrap();
        assert!(info.max_right_pad() > 0.0);
        assert_eq!(info.max_left_pad(), 0.0);
        assert_eq!(separations.separation(Id::new("A"), Id::new("A")), None);
    }

    #[test]
    fn test_note_between_separates_extremes() {
        let note = Note::new(
            NotePosition::Between,
            NoteMode::Note,
            vec![Id::new("C"), Id::new("A")],
            "between",
        );
        let separations = run(&["[", "A", "B", "C", "]"], &[Stage::Note(note)]);
        assert!(separations.separation(Id::new("A"), Id::new("C")).is_some());
        assert_eq!(separations.separation(Id::new("A"), Id::new("B")), None);
    }

    #[test]
    fn test_note_between_single_agent_reserves_centered_space() {
        let note = Note::new(NotePosition::Between, NoteMode::Note, vec![Id::new("A")], "alone");
        let stages = [
            Stage::AgentBegin {
                agents: vec![Id::new("A")],
                cap: CapStyle::None,
            },
            Stage::Note(note),
        ];
        let separations = run(&["[", "A", "]"], &stages);

        let info = separations.get(Id::new("A")).unwrap();
        assert!(info.max_left_pad() > 0.0);
        assert_approx_eq!(f32, info.max_left_pad(), info.max_right_pad());
        assert_eq!(separations.separation(Id::new("A"), Id::new("A")), None);
    }

    #[test]
    fn test_block_sections_separate_bounds() {
        let (left, right) = (Id::new("__BLOCK0["), Id::new("__BLOCK0]"));
        let block = Block::new(
            left,
            right,
            vec![Section::new(sequin_core::semantic::SectionMode::Repeat, "forever", vec![])],
        );
        let separations = run(&["[", "__BLOCK0[", "__BLOCK0]", "]"], &[Stage::Block(block)]);
        assert!(separations.separation(left, right).unwrap() > 0.0);
    }

    #[test]
    fn test_extremes() {
        let separations = Separations::new(&agents(&["[", "A", "B", "C", "]"]));
        assert_eq!(
            separations.extremes(&[Id::new("B"), Id::new("C"), Id::new("A")]),
            Some((Id::new("A"), Id::new("C")))
        );
        assert_eq!(separations.extremes(&[]), None);
    }

    proptest! {
        #[test]
        fn separation_is_symmetric(
            pairs in prop::collection::vec((0usize..5, 0usize..5, 0.0f32..200.0), 0..40)
        ) {
            let names = ["P0", "P1", "P2", "P3", "P4"];
            let ids: Vec<Id> = names.iter().map(|n| Id::new(n)).collect();
            let mut separations = Separations::new(&agents(&names));
            for (a, b, dist) in pairs {
                separations.add_separation(ids[a], ids[b], dist);
            }
            for a in &ids {
                for b in &ids {
                    prop_assert_eq!(separations.separation(*a, *b), separations.separation(*b, *a));
                }
            }
        }
    }
}
