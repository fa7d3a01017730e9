//! Line parser: classifies each line as a directive or a stage.
//!
//! Each line is tried against the grammars below and the first match wins:
//!
//! 1. meta directive: `title <text>`, `terminators <none|box|cross|bar>`
//! 2. block command: `if`, `repeat`, `else`, `elif`, `end`
//! 3. agent command: `define`, `begin`, `end` followed by a comma list
//! 4. note: `note <over|left|right|between> [of] <agents>: <label>`,
//!    `state over <agent>: <label>`
//! 5. connection: `<from> <arrow> <to>[: <label>]`
//!
//! Keywords only match bare words and `:`/`,` only match separator tokens,
//! so quoting turns any of them into ordinary text.

use log::{debug, trace};
use sequin_core::semantic::{CapStyle, ConnectionOptions, Meta, NoteMode, NotePosition, SectionMode};

use crate::{
    error::{Diagnostic, ErrorCode, ParseError, Result},
    lines::{Line, join_tokens},
    parser_types::{ParsedSequence, ParsedStage},
    span::Spanned,
    tokens::{Token, TokenKind},
};

/// Parses all lines, stopping at the first line that fails.
pub fn parse_lines(lines: &[Line]) -> std::result::Result<ParsedSequence, ParseError> {
    let mut meta = Meta::default();
    let mut stages = Vec::new();

    for line in lines {
        if parse_meta(line, &mut meta)? {
            continue;
        }
        match parse_line(line)? {
            Some(stage) => {
                trace!(line = line.to_string(); "Parsed stage");
                stages.push(Spanned::new(stage, line.span()));
            }
            None => {
                return Err(Diagnostic::error(format!("unrecognised command: {line}"))
                    .with_code(ErrorCode::E100)
                    .with_label(line.span(), ErrorCode::E100.description())
                    .with_help("expected a title, block, agent, note or connection")
                    .into());
            }
        }
    }

    debug!(stages = stages.len(), title = meta.title(); "Parsed lines");
    Ok(ParsedSequence::new(meta, stages))
}

fn parse_line(line: &Line) -> Result<Option<ParsedStage>> {
    if let Some(stage) = parse_block_command(line) {
        return Ok(Some(stage));
    }
    if let Some(stage) = parse_agent_command(line) {
        return Ok(Some(stage));
    }
    if let Some(stage) = parse_note(line)? {
        return Ok(Some(stage));
    }
    Ok(parse_connection(line))
}

/// Applies `title` and `terminators` to `meta`. Returns `true` if the line was a directive.
fn parse_meta(line: &Line, meta: &mut Meta) -> Result<bool> {
    let tokens = line.tokens();
    let Some(first) = tokens.first() else {
        return Ok(false);
    };

    if first.is_word("title") {
        meta.set_title(join_tokens(&tokens[1..]));
        return Ok(true);
    }

    if first.is_word("terminators") {
        let style = tokens.get(1).map(Token::text).unwrap_or_default();
        let terminators = style.parse::<CapStyle>().map_err(|err| {
            Diagnostic::error(format!("unrecognised terminator `{style}`"))
                .with_code(ErrorCode::E200)
                .with_label(line.span(), err)
                .with_help("use one of: none, box, cross, bar")
        })?;
        meta.set_terminators(terminators);
        return Ok(true);
    }

    Ok(false)
}

/// Parses the label of a block command: an optional leading `:`, then the
/// remaining tokens, ignoring one trailing `:`.
fn block_label(tokens: &[Token]) -> String {
    let tokens = match tokens {
        [colon, rest @ ..] if colon.is_colon() => rest,
        _ => tokens,
    };
    let tokens = match tokens {
        [rest @ .., colon] if colon.is_colon() => rest,
        _ => tokens,
    };
    join_tokens(tokens)
}

fn parse_block_command(line: &Line) -> Option<ParsedStage> {
    let tokens = line.tokens();
    let (first, rest) = tokens.split_first()?;

    if first.is_word("end") && rest.is_empty() {
        return Some(ParsedStage::BlockEnd);
    }

    if first.kind() != TokenKind::Word {
        return None;
    }
    match first.text() {
        "if" => Some(ParsedStage::BlockBegin {
            mode: SectionMode::If,
            label: block_label(rest),
        }),
        "repeat" => Some(ParsedStage::BlockBegin {
            mode: SectionMode::Repeat,
            label: block_label(rest),
        }),
        "else" => {
            let rest = match rest {
                [keyword, after @ ..] if keyword.is_word("if") => after,
                _ => rest,
            };
            Some(ParsedStage::BlockSplit {
                mode: SectionMode::Else,
                label: block_label(rest),
            })
        }
        "elif" => Some(ParsedStage::BlockSplit {
            mode: SectionMode::Else,
            label: block_label(rest),
        }),
        _ => None,
    }
}

/// Splits tokens on commas, joining each group with spaces. Empty names are dropped.
fn parse_comma_list(tokens: &[Token]) -> Vec<String> {
    tokens
        .split(Token::is_comma)
        .filter(|group| !group.is_empty())
        .map(join_tokens)
        .collect()
}

fn parse_agent_command(line: &Line) -> Option<ParsedStage> {
    let tokens = line.tokens();
    let (first, rest) = tokens.split_first()?;
    if rest.is_empty() || first.kind() != TokenKind::Word {
        return None;
    }

    let agents = parse_comma_list(rest);
    if agents.is_empty() {
        return None;
    }
    match first.text() {
        "define" => Some(ParsedStage::AgentDefine { agents }),
        "begin" => Some(ParsedStage::AgentBegin {
            agents,
            cap: CapStyle::Box,
        }),
        "end" => Some(ParsedStage::AgentEnd {
            agents,
            cap: CapStyle::Cross,
        }),
        _ => None,
    }
}

fn invalid_note(line: &Line, reason: &str) -> Diagnostic {
    Diagnostic::error(format!("invalid note: {reason}"))
        .with_code(ErrorCode::E101)
        .with_label(line.span(), reason.to_string())
        .with_help("write e.g. `note over A, B: text` or `note left of A: text`")
}

fn parse_note(line: &Line) -> Result<Option<ParsedStage>> {
    let tokens = line.tokens();
    let (Some(first), Some(second)) = (tokens.first(), tokens.get(1)) else {
        return Ok(None);
    };

    let mode = if first.is_word("note") {
        NoteMode::Note
    } else if first.is_word("state") {
        NoteMode::State
    } else {
        return Ok(None);
    };

    let position = match (mode, second.kind(), second.text()) {
        (_, TokenKind::Word, "over") => NotePosition::Over,
        (NoteMode::Note, TokenKind::Word, "left") => NotePosition::Left,
        (NoteMode::Note, TokenKind::Word, "right") => NotePosition::Right,
        (NoteMode::Note, TokenKind::Word, "between") => NotePosition::Between,
        _ => return Ok(None),
    };

    let Some(label_split) = tokens.iter().position(Token::is_colon) else {
        return Err(invalid_note(line, "missing `:` before the label"));
    };

    let mut agent_tokens = &tokens[2..label_split];
    if matches!(position, NotePosition::Left | NotePosition::Right) {
        if let [of, rest @ ..] = agent_tokens {
            if of.is_word("of") {
                agent_tokens = rest;
            }
        }
    }
    let agents = parse_comma_list(agent_tokens);

    let valid = match (mode, position) {
        (NoteMode::State, _) => agents.len() == 1,
        (NoteMode::Note, NotePosition::Over | NotePosition::Between) => !agents.is_empty(),
        (NoteMode::Note, NotePosition::Left | NotePosition::Right) => agents.len() == 1,
    };
    if !valid {
        let reason = if agents.is_empty() {
            "no agent given"
        } else {
            "expected exactly one agent"
        };
        return Err(invalid_note(line, reason));
    }

    Ok(Some(ParsedStage::Note {
        position,
        mode,
        agents,
        label: join_tokens(&tokens[label_split + 1..]),
    }))
}

fn parse_connection(line: &Line) -> Option<ParsedStage> {
    let tokens = line.tokens();
    let (type_split, options) = tokens.iter().enumerate().find_map(|(i, token)| {
        if token.kind() != TokenKind::Operator {
            return None;
        }
        ConnectionOptions::from_arrow(token.text()).map(|options| (i, options))
    })?;
    let label_split = tokens
        .iter()
        .position(Token::is_colon)
        .unwrap_or(tokens.len());

    // Both agent names must be non-empty.
    if type_split == 0 || type_split + 1 >= label_split {
        return None;
    }

    let label = tokens
        .get(label_split + 1..)
        .map(join_tokens)
        .unwrap_or_default();

    Some(ParsedStage::Connection {
        from: join_tokens(&tokens[..type_split]),
        to: join_tokens(&tokens[type_split + 1..label_split]),
        label,
        options,
    })
}
