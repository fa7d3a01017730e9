//! Generator: turns parsed stages into a renderable [`Sequence`].
//!
//! The generator owns the agent list and agent visibility. It nests flat
//! block commands into [`Block`] stages, inserts implicit `agent begin`
//! stages before an agent's first use, and ends every remaining agent once
//! the input is exhausted.

use std::collections::HashSet;

use log::{debug, trace};
use sequin_core::{
    identifier::Id,
    semantic::{
        Agent, Block, CapStyle, Connection, Note, Section, SectionMode, Sequence, Stage,
    },
};

use crate::{
    error::{Diagnostic, ErrorCode, ParseError, Result},
    parser_types::{ParsedSequence, ParsedStage},
    span::{Span, Spanned},
};

/// Generates the semantic model for a parsed sequence.
pub fn generate(parsed: &ParsedSequence) -> std::result::Result<Sequence, ParseError> {
    let mut generator = Generator::new();
    for stage in parsed.stages() {
        generator.handle(stage)?;
    }
    let (agents, stages) = generator.finish(parsed.meta().terminators())?;
    let sequence = Sequence::new(parsed.meta().clone(), agents, stages);

    debug!(
        agents = sequence.agents().len(),
        stages = sequence.stages().len();
        "Generated sequence"
    );
    Ok(sequence)
}

/// An open block and the agents referenced inside it so far.
#[derive(Debug)]
struct Frame {
    block: Block,
    span: Span,
    touched: Vec<Id>,
}

#[derive(Debug)]
struct Generator {
    agents: Vec<Agent>,
    visible: HashSet<Id>,
    frames: Vec<Frame>,
    root: Vec<Stage>,
    block_count: usize,
}

impl Generator {
    fn new() -> Self {
        Self {
            agents: vec![
                Agent::new(Id::left_bound()).with_anchor_right(true),
                Agent::new(Id::right_bound()),
            ],
            visible: HashSet::new(),
            frames: Vec::new(),
            root: Vec::new(),
            block_count: 0,
        }
    }

    fn handle(&mut self, stage: &Spanned<ParsedStage>) -> Result<()> {
        match stage.inner() {
            ParsedStage::BlockBegin { mode, label } => {
                self.begin_block(*mode, label, stage.span());
                Ok(())
            }
            ParsedStage::BlockSplit { mode, label } => {
                self.split_block(*mode, label, stage.span())
            }
            ParsedStage::BlockEnd => self.end_block(stage.span()),
            ParsedStage::AgentDefine { agents } => {
                for name in agents {
                    self.add_agent(Id::new(name));
                }
                Ok(())
            }
            ParsedStage::AgentBegin { agents, cap } => {
                let ids = self.mention(agents.as_slice());
                self.begin_agents(ids, *cap);
                Ok(())
            }
            ParsedStage::AgentEnd { agents, cap } => {
                let ids = self.mention(agents.as_slice());
                self.end_agents(ids, *cap);
                Ok(())
            }
            ParsedStage::Note {
                position,
                mode,
                agents,
                label,
            } => {
                let ids = self.mention(agents.as_slice());
                self.begin_agents(ids.clone(), CapStyle::Box);
                self.push(Stage::Note(Note::new(*position, *mode, ids, label.as_str())));
                Ok(())
            }
            ParsedStage::Connection {
                from,
                to,
                label,
                options,
            } => {
                let ids = self.mention(&[from.as_str(), to.as_str()]);
                self.begin_agents(ids.clone(), CapStyle::Box);
                self.push(Stage::Connection(Connection::new(
                    ids[0],
                    ids[1],
                    label.as_str(),
                    *options,
                )));
                Ok(())
            }
        }
    }

    /// Ends all visible agents and returns the agent list and root stages.
    fn finish(mut self, terminators: CapStyle) -> Result<(Vec<Agent>, Vec<Stage>)> {
        if let Some(frame) = self.frames.last() {
            return Err(Diagnostic::error("unterminated block")
                .with_code(ErrorCode::E302)
                .with_label(frame.span, "block opened here is never closed")
                .with_help("add a matching `end`"));
        }

        let remaining: Vec<Id> = self
            .agents
            .iter()
            .map(Agent::name)
            .filter(|id| self.visible.contains(id))
            .collect();
        self.end_agents(remaining, terminators);
        Ok((self.agents, self.root))
    }

    /// Stage list new stages are appended to: the innermost open section, or the root.
    fn current_stages(&mut self) -> &mut Vec<Stage> {
        match self
            .frames
            .last_mut()
            .and_then(|frame| frame.block.current_stages_mut())
        {
            Some(stages) => stages,
            None => &mut self.root,
        }
    }

    fn push(&mut self, stage: Stage) {
        self.current_stages().push(stage);
    }

    /// Adds a user agent before the right boundary if it is not yet listed.
    fn add_agent(&mut self, id: Id) {
        if id.is_bound() || self.agents.iter().any(|agent| agent.name() == id) {
            return;
        }
        let index = self.agents.len() - 1;
        self.agents.insert(index, Agent::new(id));
    }

    /// Records agent references: lists them and marks them as used by the open block.
    fn mention<S: AsRef<str>>(&mut self, names: &[S]) -> Vec<Id> {
        let ids: Vec<Id> = names.iter().map(|name| Id::new(name.as_ref())).collect();
        for &id in &ids {
            self.add_agent(id);
        }
        if let Some(frame) = self.frames.last_mut() {
            touch(&mut frame.touched, &ids);
        }
        ids
    }

    fn begin_agents(&mut self, ids: Vec<Id>, cap: CapStyle) {
        let agents: Vec<Id> = ids
            .into_iter()
            .filter(|id| !id.is_bound() && self.visible.insert(*id))
            .collect();
        if agents.is_empty() {
            return;
        }
        trace!(count = agents.len(), cap = cap.as_str(); "Agent begin");
        self.push(Stage::AgentBegin { agents, cap });
    }

    fn end_agents(&mut self, ids: Vec<Id>, cap: CapStyle) {
        let agents: Vec<Id> = ids
            .into_iter()
            .filter(|id| self.visible.remove(id))
            .collect();
        if agents.is_empty() {
            return;
        }
        trace!(count = agents.len(), cap = cap.as_str(); "Agent end");
        self.push(Stage::AgentEnd { agents, cap });
    }

    fn begin_block(&mut self, mode: SectionMode, label: &str, span: Span) {
        let index = self.block_count;
        self.block_count += 1;
        let left = Id::new(&format!("__BLOCK{index}["));
        let right = Id::new(&format!("__BLOCK{index}]"));

        trace!(index = index, mode = mode.as_str(); "Block begin");
        self.frames.push(Frame {
            block: Block::new(left, right, vec![Section::new(mode, label, Vec::new())]),
            span,
            touched: Vec::new(),
        });
    }

    fn split_block(&mut self, mode: SectionMode, label: &str, span: Span) -> Result<()> {
        let Some(frame) = self.frames.last_mut() else {
            return Err(Diagnostic::error("section split outside block")
                .with_code(ErrorCode::E300)
                .with_label(span, "no open block to split")
                .with_help("`else` must appear between `if` or `repeat` and `end`"));
        };
        frame.block.push_section(Section::new(mode, label, Vec::new()));
        Ok(())
    }

    fn end_block(&mut self, span: Span) -> Result<()> {
        let Some(frame) = self.frames.pop() else {
            return Err(Diagnostic::error("unmatched block end")
                .with_code(ErrorCode::E301)
                .with_label(span, "no open block to end"));
        };

        let (left, right) = (frame.block.left(), frame.block.right());
        insert_bounds(&mut self.agents, left, right, &frame.touched);

        if let Some(parent) = self.frames.last_mut() {
            touch(&mut parent.touched, &frame.touched);
            touch(&mut parent.touched, &[left, right]);
        }
        trace!(sections = frame.block.sections().len(); "Block end");
        self.push(Stage::Block(frame.block));
        Ok(())
    }
}

fn touch(touched: &mut Vec<Id>, ids: &[Id]) {
    for &id in ids {
        if !id.is_bound() && !touched.contains(&id) {
            touched.push(id);
        }
    }
}

/// Inserts a block's boundary agents directly around the agents it touched.
///
/// A block that touched no listed agent is placed just before the right
/// boundary `]`.
fn insert_bounds(agents: &mut Vec<Agent>, left: Id, right: Id, touched: &[Id]) {
    let indices: Vec<usize> = touched
        .iter()
        .filter_map(|id| agents.iter().position(|agent| agent.name() == *id))
        .collect();

    let end = agents.len().saturating_sub(1);
    let (low, high) = match (indices.iter().min(), indices.iter().max()) {
        (Some(&low), Some(&high)) => (low, high + 1),
        _ => (end, end),
    };

    agents.insert(high, Agent::new(right));
    agents.insert(low, Agent::new(left).with_anchor_right(true));
}

#[cfg(test)]
mod tests {
    use sequin_core::semantic::{LineStyle, NotePosition};

    use super::*;
    use crate::{lexer::tokenise, lines::split_lines, parser::parse_lines};

    fn generate_source(source: &str) -> std::result::Result<Sequence, ParseError> {
        let parsed = parse_lines(&split_lines(tokenise(source).unwrap())).unwrap();
        generate(&parsed)
    }

    fn agent_names(sequence: &Sequence) -> Vec<String> {
        sequence
            .agents()
            .iter()
            .map(|agent| agent.name().to_string())
            .collect()
    }

    fn ids(names: &[&str]) -> Vec<Id> {
        names.iter().map(|name| Id::new(name)).collect()
    }

    #[test]
    fn test_agents_are_listed_in_mention_order_between_bounds() {
        let sequence = generate_source("define C\nA -> B\nB -> C").unwrap();
        assert_eq!(agent_names(&sequence), ["[", "C", "A", "B", "]"]);
        assert!(sequence.agents()[0].anchor_right());
        assert!(!sequence.agents()[4].anchor_right());
    }

    #[test]
    fn test_implicit_begin_and_terminate() {
        let sequence = generate_source("terminators bar\nA -> B: hi\nB -> C").unwrap();
        assert_eq!(
            sequence.stages(),
            &[
                Stage::AgentBegin {
                    agents: ids(&["A", "B"]),
                    cap: CapStyle::Box
                },
                Stage::Connection(Connection::new(
                    Id::new("A"),
                    Id::new("B"),
                    "hi",
                    sequin_core::semantic::ConnectionOptions::new(LineStyle::Solid, false, true),
                )),
                Stage::AgentBegin {
                    agents: ids(&["C"]),
                    cap: CapStyle::Box
                },
                Stage::Connection(Connection::new(
                    Id::new("B"),
                    Id::new("C"),
                    "",
                    sequin_core::semantic::ConnectionOptions::new(LineStyle::Solid, false, true),
                )),
                Stage::AgentEnd {
                    agents: ids(&["A", "B", "C"]),
                    cap: CapStyle::Bar
                },
            ]
        );
    }

    #[test]
    fn test_explicit_begin_end_are_filtered() {
        let sequence = generate_source("begin A, A\nbegin A\nend A\nend A\nend B").unwrap();
        assert_eq!(
            sequence.stages(),
            &[
                Stage::AgentBegin {
                    agents: ids(&["A"]),
                    cap: CapStyle::Box
                },
                Stage::AgentEnd {
                    agents: ids(&["A"]),
                    cap: CapStyle::Cross
                },
            ]
        );
    }

    #[test]
    fn test_bounds_are_never_begun() {
        let sequence = generate_source("[ -> A\nA -> ]").unwrap();
        assert_eq!(agent_names(&sequence), ["[", "A", "]"]);
        assert_eq!(
            sequence.stages()[0],
            Stage::AgentBegin {
                agents: ids(&["A"]),
                cap: CapStyle::Box
            }
        );
    }

    #[test]
    fn test_note_begins_its_agents() {
        let sequence = generate_source("note over X: hi").unwrap();
        assert_eq!(
            sequence.stages()[1],
            Stage::Note(Note::new(
                NotePosition::Over,
                sequin_core::semantic::NoteMode::Note,
                ids(&["X"]),
                "hi"
            ))
        );
    }

    #[test]
    fn test_if_else_block_nesting() {
        let sequence = generate_source("A -> B\nif cond:\nB -> C\nelse:\nC -> B\nend").unwrap();

        let Some(Stage::Block(block)) = sequence
            .stages()
            .iter()
            .find(|stage| matches!(stage, Stage::Block(_)))
        else {
            panic!("expected a block stage");
        };
        assert_eq!(block.sections().len(), 2);
        assert_eq!(block.sections()[0].mode(), SectionMode::If);
        assert_eq!(block.sections()[0].label(), "cond");
        assert_eq!(block.sections()[1].mode(), SectionMode::Else);
        assert_eq!(block.sections()[1].label(), "");
        // C is begun inside the first section.
        assert!(matches!(
            block.sections()[0].stages()[0],
            Stage::AgentBegin { .. }
        ));
        assert_eq!(block.left().to_string(), "__BLOCK0[");
        assert_eq!(block.right().to_string(), "__BLOCK0]");
    }

    #[test]
    fn test_block_bounds_surround_touched_agents() {
        let sequence = generate_source("A -> B\nB -> C\nC -> D\nif x\nB -> C\nend").unwrap();
        assert_eq!(
            agent_names(&sequence),
            ["[", "A", "__BLOCK0[", "B", "C", "__BLOCK0]", "D", "]"]
        );
        assert!(sequence.agents()[2].anchor_right());
    }

    #[test]
    fn test_nested_block_bounds_are_inside_parent() {
        let sequence =
            generate_source("A -> B\nB -> C\nrepeat\nif x\nB -> C\nend\nA -> B\nend").unwrap();
        assert_eq!(
            agent_names(&sequence),
            [
                "[",
                "__BLOCK0[",
                "A",
                "__BLOCK1[",
                "B",
                "C",
                "__BLOCK1]",
                "__BLOCK0]",
                "]"
            ]
        );
    }

    #[test]
    fn test_empty_block_goes_before_right_bound() {
        let sequence = generate_source("A -> B\nif x\nend").unwrap();
        assert_eq!(
            agent_names(&sequence),
            ["[", "A", "B", "__BLOCK0[", "__BLOCK0]", "]"]
        );
    }

    #[test]
    fn test_block_errors() {
        let code = |source: &str| {
            generate_source(source)
                .unwrap_err()
                .first()
                .and_then(Diagnostic::code)
        };
        assert_eq!(code("else"), Some(ErrorCode::E300));
        assert_eq!(code("A -> B\nend"), Some(ErrorCode::E301));
        assert_eq!(code("if x\nA -> B"), Some(ErrorCode::E302));
    }

    #[test]
    fn test_unterminated_block_points_at_opening_line() {
        let err = generate_source("A -> B\nif x\nA -> B").unwrap_err();
        let span = err.first().unwrap().labels()[0].span();
        assert_eq!(span.start(), 7);
        assert_eq!(span.end(), 11);
    }
}
