//! Depth-first traversal of the stage tree.
//!
//! Both layout passes implement [`StageVisitor`]. The trait has no default
//! methods and [`traverse`] matches every [`Stage`] variant, so adding a
//! stage kind fails to compile until both passes handle it.

use sequin_core::{
    identifier::Id,
    semantic::{Block, CapStyle, Connection, Note, Section, Stage},
};

/// Per-stage callbacks for [`traverse`].
///
/// The visitor is the traversal's only mutable state: it is owned by the
/// pass that drives the traversal and dropped when the pass returns.
pub(crate) trait StageVisitor {
    /// State carried from [`block_begin`](Self::block_begin) through a block's sections.
    type BlockScope;

    fn block_begin(&mut self, block: &Block) -> Self::BlockScope;
    fn section_begin(&mut self, scope: &mut Self::BlockScope, block: &Block, section: &Section);
    fn section_end(&mut self, scope: &mut Self::BlockScope, block: &Block, section: &Section);
    fn block_end(&mut self, scope: Self::BlockScope, block: &Block);

    fn agent_begin(&mut self, agents: &[Id], cap: CapStyle);
    fn agent_end(&mut self, agents: &[Id], cap: CapStyle);
    fn connection(&mut self, connection: &Connection);
    fn note(&mut self, note: &Note);
    fn mark(&mut self, name: &str);
    fn async_jump(&mut self, target: Option<&str>);
}

/// Visits `stages` in document order, descending into block sections.
pub(crate) fn traverse<V: StageVisitor>(stages: &[Stage], visitor: &mut V) {
    for stage in stages {
        match stage {
            Stage::Block(block) => {
                let mut scope = visitor.block_begin(block);
                for section in block.sections() {
                    visitor.section_begin(&mut scope, block, section);
                    traverse(section.stages(), visitor);
                    visitor.section_end(&mut scope, block, section);
                }
                visitor.block_end(scope, block);
            }
            Stage::AgentBegin { agents, cap } => visitor.agent_begin(agents, *cap),
            Stage::AgentEnd { agents, cap } => visitor.agent_end(agents, *cap),
            Stage::Connection(connection) => visitor.connection(connection),
            Stage::Note(note) => visitor.note(note),
            Stage::Mark { name } => visitor.mark(name),
            Stage::Async { target } => visitor.async_jump(target.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use sequin_core::semantic::{ConnectionOptions, LineStyle, SectionMode};

    use super::*;

    /// Records callback names in call order.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl StageVisitor for Recorder {
        type BlockScope = usize;

        fn block_begin(&mut self, _block: &Block) -> usize {
            self.calls.push("block_begin".to_string());
            0
        }

        fn section_begin(&mut self, scope: &mut usize, _block: &Block, section: &Section) {
            *scope += 1;
            self.calls.push(format!("section_begin {} {scope}", section.mode()));
        }

        fn section_end(&mut self, _scope: &mut usize, _block: &Block, _section: &Section) {
            self.calls.push("section_end".to_string());
        }

        fn block_end(&mut self, scope: usize, _block: &Block) {
            self.calls.push(format!("block_end {scope}"));
        }

        fn agent_begin(&mut self, agents: &[Id], cap: CapStyle) {
            self.calls.push(format!("agent_begin {} {cap}", agents.len()));
        }

        fn agent_end(&mut self, agents: &[Id], cap: CapStyle) {
            self.calls.push(format!("agent_end {} {cap}", agents.len()));
        }

        fn connection(&mut self, connection: &Connection) {
            self.calls
                .push(format!("connection {} {}", connection.from(), connection.to()));
        }

        fn note(&mut self, _note: &Note) {
            self.calls.push("note".to_string());
        }

        fn mark(&mut self, name: &str) {
            self.calls.push(format!("mark {name}"));
        }

        fn async_jump(&mut self, target: Option<&str>) {
            self.calls.push(format!("async {target:?}"));
        }
    }

    #[test]
    fn test_traverse_order() {
        let a = Id::new("A");
        let b = Id::new("B");
        let options = ConnectionOptions::new(LineStyle::Solid, false, true);
        let block = Block::new(
            Id::new("__BLOCK0["),
            Id::new("__BLOCK0]"),
            vec![
                Section::new(
                    SectionMode::If,
                    "x",
                    vec![Stage::Connection(Connection::new(a, b, "", options))],
                ),
                Section::new(SectionMode::Else, "", vec![Stage::Mark { name: "m".to_string() }]),
            ],
        );
        let stages = vec![
            Stage::AgentBegin {
                agents: vec![a, b],
                cap: CapStyle::Box,
            },
            Stage::Block(block),
            Stage::Async { target: None },
            Stage::AgentEnd {
                agents: vec![a],
                cap: CapStyle::Cross,
            },
        ];

        let mut recorder = Recorder::default();
        traverse(&stages, &mut recorder);

        assert_eq!(
            recorder.calls,
            [
                "agent_begin 2 box",
                "block_begin",
                "section_begin if 1",
                "connection A B",
                "section_end",
                "section_begin else 2",
                "mark m",
                "section_end",
                "block_end 2",
                "async None",
                "agent_end 1 cross",
            ]
        );
    }
}
