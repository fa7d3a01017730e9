//! Lexical analyzer for Sequin source text.
//!
//! At each position the first matching rule wins, in this order:
//!
//! 1. `#` comment up to (not including) the end of the line, discarded
//! 2. double-quoted string
//! 3. single-quoted string
//! 4. bare word: anything up to whitespace or one of `:+-<>,`
//! 5. operator run: a maximal run of `+-<>`, so `<-->` is one token
//! 6. `,` / `:` / newline as single-character tokens
//!
//! Spaces, tabs and carriage returns separate tokens and are otherwise
//! ignored. Inside quotes, a backslash escapes the next character: `\n`
//! becomes a newline and anything else stands for itself. Quoted strings may
//! span lines.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location},
    token::{none_of, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    span::Span,
    tokens::{Token, TokenKind},
};

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_word_break(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\r' | '\n' | ':' | '+' | '-' | '<' | '>' | ','
    )
}

fn is_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '<' | '>')
}

/// `#` to end of line. The newline itself is left for the next token.
fn comment(input: &mut Input<'_>) -> IResult<()> {
    preceded('#', take_while(0.., |c: char| c != '\n'))
        .void()
        .parse_next(input)
}

/// Backslash plus any character except a newline.
fn string_escape(input: &mut Input<'_>) -> IResult<char> {
    preceded('\\', none_of(['\n']))
        .map(|c| if c == 'n' { '\n' } else { c })
        .parse_next(input)
}

fn quoted_string(input: &mut Input<'_>, quote: char) -> IResult<String> {
    let start = input.current_token_start();

    // A backslash that does not start an escape is kept as a raw character.
    let content = repeat(0.., alt((string_escape, none_of([quote])))).fold(
        String::new,
        |mut acc: String, ch: char| {
            acc.push(ch);
            acc
        },
    );

    preceded(
        quote,
        cut_err(terminated(content, quote)).context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add the closing quote"),
            start,
        }),
    )
    .parse_next(input)
}

fn double_quoted(input: &mut Input<'_>) -> IResult<String> {
    quoted_string(input, '"')
}

fn single_quoted(input: &mut Input<'_>) -> IResult<String> {
    quoted_string(input, '\'')
}

fn word<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., |c: char| !is_word_break(c)).parse_next(input)
}

fn operator<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., is_operator).parse_next(input)
}

fn whitespace<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(1.., [' ', '\t', '\r']).parse_next(input)
}

/// Lexes one token. Comments and whitespace yield `None`.
fn positioned_token(input: &mut Input<'_>) -> IResult<Option<Token>> {
    let start = input.current_token_start();

    let lexed = alt((
        comment.value(None),
        double_quoted.map(|s| Some((TokenKind::Quoted, s))),
        single_quoted.map(|s| Some((TokenKind::Quoted, s))),
        word.map(|s: &str| Some((TokenKind::Word, s.to_string()))),
        operator.map(|s: &str| Some((TokenKind::Operator, s.to_string()))),
        ','.value(Some((TokenKind::Comma, ",".to_string()))),
        ':'.value(Some((TokenKind::Colon, ":".to_string()))),
        '\n'.value(Some((TokenKind::Newline, "\n".to_string()))),
        whitespace.value(None),
    ))
    .parse_next(input)?;

    let end = input.current_token_start();
    Ok(lexed.map(|(kind, text)| Token::new(kind, text, Span::new(start..end))))
}

fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(LexerDiagnostic {
        code,
        message,
        help,
        start,
    }) = context_error.context().next()
    {
        let span = Span::new(*start..error_pos);
        let mut diag = Diagnostic::error(*message)
            .with_code(*code)
            .with_label(span, code.description());
        if let Some(h) = help {
            diag = diag.with_help(*h);
        }
        return diag;
    }

    let span = Span::new(error_pos..error_pos.saturating_add(1));
    Diagnostic::error("unexpected character")
        .with_code(ErrorCode::E002)
        .with_label(span, ErrorCode::E002.description())
}

/// Splits `source` into tokens.
///
/// Stops at the first error; the only error a well-formed rule set can
/// produce is an unterminated quoted string.
///
/// ```
/// # use sequin_parser::{tokenise, TokenKind};
/// let tokens = tokenise("A <--> 'B C': hi # done").unwrap();
/// let texts: Vec<&str> = tokens.iter().map(|t| t.text()).collect();
/// assert_eq!(texts, ["A", "<-->", "B C", ":", "hi"]);
/// assert_eq!(tokens[2].kind(), TokenKind::Quoted);
/// ```
pub fn tokenise(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();

    while !input.is_empty() {
        match positioned_token(&mut input) {
            Ok(Some(token)) => tokens.push(token),
            Ok(None) => {}
            Err(err) => {
                let error_pos = input.current_token_start();
                return Err(convert_err_mode(err, error_pos).into());
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn lex(input: &str) -> Vec<(TokenKind, String)> {
        tokenise(input)
            .unwrap_or_else(|err| panic!("failed to lex {input:?}: {err}"))
            .into_iter()
            .map(|t| (t.kind(), t.text().to_string()))
            .collect()
    }

    fn word(text: &str) -> (TokenKind, String) {
        (TokenKind::Word, text.to_string())
    }

    fn op(text: &str) -> (TokenKind, String) {
        (TokenKind::Operator, text.to_string())
    }

    fn quoted(text: &str) -> (TokenKind, String) {
        (TokenKind::Quoted, text.to_string())
    }

    fn colon() -> (TokenKind, String) {
        (TokenKind::Colon, ":".to_string())
    }

    fn newline() -> (TokenKind, String) {
        (TokenKind::Newline, "\n".to_string())
    }

    #[test]
    fn test_connection_line() {
        assert_eq!(
            lex("A->B: hi"),
            vec![word("A"), op("->"), word("B"), colon(), word("hi")]
        );
    }

    #[test]
    fn test_operator_runs_are_maximal() {
        assert_eq!(lex("<-->"), vec![op("<-->")]);
        assert_eq!(lex("a+-b"), vec![word("a"), op("+-"), word("b")]);
    }

    #[test]
    fn test_comment_discarded_newline_kept() {
        assert_eq!(
            lex("A # to the end -> B\nC"),
            vec![word("A"), newline(), word("C")]
        );
        assert_eq!(lex("# only a comment"), vec![]);
    }

    #[test]
    fn test_hash_inside_word() {
        assert_eq!(lex("a#b"), vec![word("a#b")]);
    }

    #[test]
    fn test_separators_and_whitespace() {
        assert_eq!(
            lex("  A\t,\r B "),
            vec![word("A"), (TokenKind::Comma, ",".to_string()), word("B")]
        );
    }

    #[test]
    fn test_quoted_escapes() {
        assert_eq!(lex(r#""a\nb""#), vec![quoted("a\nb")]);
        assert_eq!(lex(r#"'it\'s'"#), vec![quoted("it's")]);
        assert_eq!(lex(r#""x\\y\"z""#), vec![quoted("x\\y\"z")]);
        assert_eq!(lex(r#""\q""#), vec![quoted("q")]);
    }

    #[test]
    fn test_escapes_only_inside_quotes() {
        assert_eq!(lex(r"a\nb"), vec![word(r"a\nb")]);
    }

    #[test]
    fn test_quoted_string_may_span_lines() {
        assert_eq!(lex("\"a\nb\" c"), vec![quoted("a\nb"), word("c")]);
    }

    #[test]
    fn test_quoted_separators_are_text() {
        assert_eq!(lex("\"a:b,c\""), vec![quoted("a:b,c")]);
    }

    #[test]
    fn test_spans() {
        let tokens = tokenise("A -> 'B'").unwrap();
        let spans: Vec<Span> = tokens.iter().map(Token::span).collect();
        assert_eq!(spans, vec![Span::new(0..1), Span::new(2..4), Span::new(5..8)]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenise("\"abc").unwrap_err();
        let diag = err.first().unwrap();
        assert_eq!(diag.code(), Some(ErrorCode::E001));
        assert_eq!(diag.labels()[0].span(), Span::new(0..4));
    }

    #[test]
    fn test_unterminated_single_quote_after_tokens() {
        let err = tokenise("A -> B: 'oops").unwrap_err();
        let diag = err.first().unwrap();
        assert_eq!(diag.code(), Some(ErrorCode::E001));
        assert_eq!(diag.labels()[0].span().start(), 8);
    }

    type Piece = (String, Vec<(TokenKind, String)>);

    /// Writes `content` as a quoted literal that lexes back to `content`.
    fn quote(content: &[char], delimiter: char, escape_newlines: bool) -> String {
        let mut source = String::from(delimiter);
        for &c in content {
            match c {
                '\\' => source.push_str("\\\\"),
                '\n' if escape_newlines => source.push_str("\\n"),
                c if c == delimiter => {
                    source.push('\\');
                    source.push(c);
                }
                c => source.push(c),
            }
        }
        source.push(delimiter);
        source
    }

    fn single(kind: TokenKind, text: &str) -> Piece {
        (text.to_string(), vec![(kind, text.to_string())])
    }

    fn piece() -> impl Strategy<Value = Piece> {
        let content = prop::collection::vec(
            prop::sample::select(vec!['a', 'n', ' ', ':', ',', '#', '-', '"', '\'', '\\', '\n']),
            0..8,
        );
        prop_oneof![
            "[a-zA-Z0-9_]{1,6}".prop_map(|w| single(TokenKind::Word, &w)),
            Just(single(TokenKind::Operator, "->")),
            Just(single(TokenKind::Operator, "<-->")),
            Just(single(TokenKind::Comma, ",")),
            Just(single(TokenKind::Colon, ":")),
            Just(single(TokenKind::Newline, "\n")),
            (content, prop::bool::ANY, prop::bool::ANY).prop_map(|(chars, double, escape)| {
                let delimiter = if double { '"' } else { '\'' };
                let text: String = chars.iter().collect();
                (
                    quote(&chars, delimiter, escape),
                    vec![(TokenKind::Quoted, text)],
                )
            }),
            // A comment swallows the rest of its line but not the newline.
            "[a-z :,'\"#-]{0,8}".prop_map(|text| (format!("#{text}\n"), vec![newline()])),
        ]
    }

    proptest! {
        #[test]
        fn prop_space_joined_pieces_relex_to_their_tokens(
            pieces in prop::collection::vec(piece(), 1..12)
        ) {
            let source = pieces
                .iter()
                .map(|(text, _)| text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            let expected: Vec<_> = pieces.into_iter().flat_map(|(_, tokens)| tokens).collect();
            prop_assert_eq!(lex(&source), expected);
        }
    }
}
