//! Output of the line parser, before generation.
//!
//! Blocks are still flat here: a block is a `BlockBegin`, any number of
//! `BlockSplit`s and a `BlockEnd`, in source order. Agent names are the raw
//! joined token text.

use sequin_core::semantic::{CapStyle, ConnectionOptions, Meta, NoteMode, NotePosition, SectionMode};

use crate::span::Spanned;

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedStage {
    BlockBegin {
        mode: SectionMode,
        label: String,
    },
    BlockSplit {
        mode: SectionMode,
        label: String,
    },
    BlockEnd,
    AgentDefine {
        agents: Vec<String>,
    },
    AgentBegin {
        agents: Vec<String>,
        cap: CapStyle,
    },
    AgentEnd {
        agents: Vec<String>,
        cap: CapStyle,
    },
    Note {
        position: NotePosition,
        mode: NoteMode,
        agents: Vec<String>,
        label: String,
    },
    Connection {
        from: String,
        to: String,
        label: String,
        options: ConnectionOptions,
    },
}

/// Metadata and stages of one parsed document. Each stage carries the span of its line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSequence {
    meta: Meta,
    stages: Vec<Spanned<ParsedStage>>,
}

impl ParsedSequence {
    pub fn new(meta: Meta, stages: Vec<Spanned<ParsedStage>>) -> Self {
        Self { meta, stages }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn stages(&self) -> &[Spanned<ParsedStage>] {
        &self.stages
    }

    /// Stages without their spans.
    pub fn stage_values(&self) -> Vec<&ParsedStage> {
        self.stages.iter().map(Spanned::inner).collect()
    }
}
