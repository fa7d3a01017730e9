//! Semantic sequence model.
//!
//! These types describe a diagram after generation: agents are known and
//! ordered, blocks are nested into sections and every agent reference is
//! resolved to an [`Id`]. The renderer consumes a [`Sequence`] and never
//! mutates it.
//!
//! # Pipeline Position
//!
//! ```text
//! Source Text
//!     ↓ lexer
//! Tokens
//!     ↓ line assembler + line parser
//! Parsed stages (flat block begin/split/end)
//!     ↓ generator
//! Semantic Model (these types)
//!     ↓ separation, position and draw passes
//! SVG
//! ```

use std::{fmt, str::FromStr};

use crate::identifier::Id;

/// Visual marker drawn where an agent's lifeline begins or ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CapStyle {
    Box,
    Cross,
    Bar,
    #[default]
    None,
}

impl CapStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Cross => "cross",
            Self::Bar => "bar",
            Self::None => "none",
        }
    }
}

impl FromStr for CapStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "box" => Ok(Self::Box),
            "cross" => Ok(Self::Cross),
            "bar" => Ok(Self::Bar),
            "none" => Ok(Self::None),
            _ => Err(format!(
                "unknown terminator `{s}`, valid values: none, box, cross, bar"
            )),
        }
    }
}

impl fmt::Display for CapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stroke pattern of a connection line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
}

/// Line style and arrowhead presence of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionOptions {
    line: LineStyle,
    left: bool,
    right: bool,
}

impl ConnectionOptions {
    pub fn new(line: LineStyle, left: bool, right: bool) -> Self {
        Self { line, left, right }
    }

    /// Looks up the options for an arrow operator such as `->` or `<-->`.
    ///
    /// ```
    /// # use sequin_core::semantic::{ConnectionOptions, LineStyle};
    /// let options = ConnectionOptions::from_arrow("<--").unwrap();
    /// assert_eq!(options.line(), LineStyle::Dash);
    /// assert!(options.left());
    /// assert!(!options.right());
    /// assert!(ConnectionOptions::from_arrow("-").is_none());
    /// ```
    pub fn from_arrow(arrow: &str) -> Option<Self> {
        let (line, left, right) = match arrow {
            "->" => (LineStyle::Solid, false, true),
            "<-" => (LineStyle::Solid, true, false),
            "<->" => (LineStyle::Solid, true, true),
            "-->" => (LineStyle::Dash, false, true),
            "<--" => (LineStyle::Dash, true, false),
            "<-->" => (LineStyle::Dash, true, true),
            _ => return None,
        };
        Some(Self::new(line, left, right))
    }

    pub fn line(&self) -> LineStyle {
        self.line
    }

    /// Whether an arrowhead is drawn at the source end.
    pub fn left(&self) -> bool {
        self.left
    }

    /// Whether an arrowhead is drawn at the destination end.
    pub fn right(&self) -> bool {
        self.right
    }
}

/// Where a note is attached relative to its agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotePosition {
    Over,
    Left,
    Right,
    Between,
}

/// Box style of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteMode {
    Note,
    State,
}

/// Mode tag of a block section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionMode {
    If,
    Else,
    Repeat,
}

impl SectionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Else => "else",
            Self::Repeat => "repeat",
        }
    }
}

impl fmt::Display for SectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document-level metadata set by `title` and `terminators` directives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    title: String,
    terminators: CapStyle,
}

impl Meta {
    pub fn new(title: impl Into<String>, terminators: CapStyle) -> Self {
        Self {
            title: title.into(),
            terminators,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Cap used for agents still visible when the diagram ends.
    pub fn terminators(&self) -> CapStyle {
        self.terminators
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_terminators(&mut self, terminators: CapStyle) {
        self.terminators = terminators;
    }
}

/// A participant column. Its index is its position in [`Sequence::agents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Agent {
    name: Id,
    anchor_right: bool,
}

impl Agent {
    pub fn new(name: Id) -> Self {
        Self {
            name,
            anchor_right: false,
        }
    }

    /// Marks the agent as pullable toward its right-hand neighbours.
    pub fn with_anchor_right(mut self, anchor_right: bool) -> Self {
        self.anchor_right = anchor_right;
        self
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn anchor_right(&self) -> bool {
        self.anchor_right
    }
}

/// A message between two agents. `from == to` is a self-connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    from: Id,
    to: Id,
    label: String,
    options: ConnectionOptions,
}

impl Connection {
    pub fn new(from: Id, to: Id, label: impl Into<String>, options: ConnectionOptions) -> Self {
        Self {
            from,
            to,
            label: label.into(),
            options,
        }
    }

    pub fn from(&self) -> Id {
        self.from
    }

    pub fn to(&self) -> Id {
        self.to
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn options(&self) -> ConnectionOptions {
        self.options
    }

    pub fn is_self_connection(&self) -> bool {
        self.from == self.to
    }
}

/// A label attached to one or more agents.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    position: NotePosition,
    mode: NoteMode,
    agents: Vec<Id>,
    label: String,
}

impl Note {
    pub fn new(
        position: NotePosition,
        mode: NoteMode,
        agents: Vec<Id>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            position,
            mode,
            agents,
            label: label.into(),
        }
    }

    pub fn position(&self) -> NotePosition {
        self.position
    }

    pub fn mode(&self) -> NoteMode {
        self.mode
    }

    pub fn agents(&self) -> &[Id] {
        &self.agents
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// One labelled branch of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    mode: SectionMode,
    label: String,
    stages: Vec<Stage>,
}

impl Section {
    pub fn new(mode: SectionMode, label: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            mode,
            label: label.into(),
            stages,
        }
    }

    pub fn mode(&self) -> SectionMode {
        self.mode
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub(crate) fn stages_mut(&mut self) -> &mut Vec<Stage> {
        &mut self.stages
    }
}

/// A framed group of sections spanning the agents between `left` and `right`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    left: Id,
    right: Id,
    sections: Vec<Section>,
}

impl Block {
    pub fn new(left: Id, right: Id, sections: Vec<Section>) -> Self {
        Self {
            left,
            right,
            sections,
        }
    }

    /// Boundary agent on the left edge of the frame.
    pub fn left(&self) -> Id {
        self.left
    }

    /// Boundary agent on the right edge of the frame.
    pub fn right(&self) -> Id {
        self.right
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Appends a new section and returns it.
    pub fn push_section(&mut self, section: Section) -> &mut Section {
        self.sections.push(section);
        let last = self.sections.len() - 1;
        &mut self.sections[last]
    }

    /// Stage list of the most recent section, where new stages are appended.
    pub fn current_stages_mut(&mut self) -> Option<&mut Vec<Stage>> {
        self.sections.last_mut().map(Section::stages_mut)
    }
}

/// One instruction of a generated sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Block(Block),
    AgentBegin { agents: Vec<Id>, cap: CapStyle },
    AgentEnd { agents: Vec<Id>, cap: CapStyle },
    Connection(Connection),
    Note(Note),
    /// Records the current vertical position under `name`.
    Mark { name: String },
    /// Moves the vertical cursor to a recorded mark, or to the top when `target` is `None`.
    Async { target: Option<String> },
}

impl Stage {
    /// Agents this stage references directly. Nested section stages are not included.
    pub fn agents(&self) -> Vec<Id> {
        match self {
            Self::Block(block) => vec![block.left(), block.right()],
            Self::AgentBegin { agents, .. } | Self::AgentEnd { agents, .. } => agents.clone(),
            Self::Connection(connection) => vec![connection.from(), connection.to()],
            Self::Note(note) => note.agents().to_vec(),
            Self::Mark { .. } | Self::Async { .. } => Vec::new(),
        }
    }
}

/// A generated sequence diagram ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    meta: Meta,
    agents: Vec<Agent>,
    stages: Vec<Stage>,
}

impl Sequence {
    pub fn new(meta: Meta, agents: Vec<Agent>, stages: Vec<Stage>) -> Self {
        Self {
            meta,
            agents,
            stages,
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    /// Agents in left-to-right order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_style_from_str() {
        assert_eq!("cross".parse::<CapStyle>(), Ok(CapStyle::Cross));
        assert_eq!("none".parse::<CapStyle>(), Ok(CapStyle::None));
        assert!("circle".parse::<CapStyle>().is_err());
    }

    #[test]
    fn test_arrow_table() {
        for (arrow, line, left, right) in [
            ("->", LineStyle::Solid, false, true),
            ("<-", LineStyle::Solid, true, false),
            ("<->", LineStyle::Solid, true, true),
            ("-->", LineStyle::Dash, false, true),
            ("<--", LineStyle::Dash, true, false),
            ("<-->", LineStyle::Dash, true, true),
        ] {
            let options = ConnectionOptions::from_arrow(arrow).unwrap();
            assert_eq!(options, ConnectionOptions::new(line, left, right), "{arrow}");
        }
        assert!(ConnectionOptions::from_arrow("--").is_none());
        assert!(ConnectionOptions::from_arrow("=>").is_none());
    }

    #[test]
    fn test_block_appends_to_last_section() {
        let mut block = Block::new(Id::new("L"), Id::new("R"), Vec::new());
        assert!(block.current_stages_mut().is_none());

        block.push_section(Section::new(SectionMode::If, "a", Vec::new()));
        block.push_section(Section::new(SectionMode::Else, "", Vec::new()));
        block
            .current_stages_mut()
            .unwrap()
            .push(Stage::Mark { name: "m".to_string() });

        assert!(block.sections()[0].stages().is_empty());
        assert_eq!(block.sections()[1].stages().len(), 1);
    }

    #[test]
    fn test_self_connection() {
        let a = Id::new("A");
        let options = ConnectionOptions::new(LineStyle::Solid, false, true);
        assert!(Connection::new(a, a, "", options).is_self_connection());
        assert!(!Connection::new(a, Id::new("B"), "", options).is_self_connection());
    }
}
