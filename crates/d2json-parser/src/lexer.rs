//! Lexical analyzer for D2 source text.
//!
//! [`tokenize`] turns source text into [`PositionedToken`]s. It recovers from
//! bad input by skipping a character and carrying on, so a single pass
//! reports every lexical problem in the file.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, none_of, one_of, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The reported span runs from here to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Parse the character after a backslash inside a string.
fn string_escape(input: &mut Input<'_>) -> IResult<char> {
    let escape_start = input.current_token_start();

    '\\'.parse_next(input)?;

    let escaped: IResult<char> = one_of(['n', 't', 'r', '"', '\\'])
        .map(|c| match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            other => other,
        })
        .parse_next(input);

    match escaped {
        Ok(ch) => Ok(ch),
        Err(ErrMode::Backtrack(_)) => Err(ErrMode::Cut(ContextError::new().add_context(
            input,
            &input.checkpoint(),
            LexerDiagnostic {
                code: ErrorCode::E003,
                message: "invalid escape sequence",
                help: Some("valid escapes: `\\n`, `\\t`, `\\r`, `\\\"`, `\\\\`"),
                start: escape_start,
            },
        ))),
        Err(e) => Err(e),
    }
}

/// Parse a double-quoted string. Strings may not span lines.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let string_content = repeat(0.., alt((string_escape, none_of(['"', '\\', '\n'])))).fold(
        String::new,
        |mut acc, ch| {
            acc.push(ch);
            acc
        },
    );

    let start_pos = input.current_token_start();

    '"'.parse_next(input)?;

    // Committed once the opening quote is seen.
    cut_err(terminated(string_content, '"'))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            help: Some("add closing `\"` before the end of the line"),
            start: start_pos,
        })
        .parse_next(input)
        .map(Token::StringLiteral)
}

/// `# ...` to the end of the line.
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    preceded('#', take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Word characters, optionally joined by single hyphens (`web-server`).
fn identifier<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    let word = || take_while(1.., is_word_char);
    (word(), repeat(0.., ('-', word())).map(|()| ()))
        .take()
        .map(Token::Identifier)
        .parse_next(input)
}

/// Arrows; longest first so `<->` is not read as `<-` followed by `>`.
fn connector<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        literal("<->").value(Token::DoubleArrow),
        literal("->").value(Token::Arrow),
        literal("<-").value(Token::LeftArrow),
        literal("--").value(Token::Line),
    ))
    .parse_next(input)
}

fn punctuation<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    alt((
        '.'.value(Token::Dot),
        ':'.value(Token::Colon),
        ';'.value(Token::Semicolon),
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
    ))
    .parse_next(input)
}

/// Spaces, tabs and carriage returns.
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Any other printable character, kept verbatim for unquoted values.
fn symbol<'a>(input: &mut Input<'a>) -> IResult<Token<'a>> {
    one_of(|c: char| !c.is_control())
        .take()
        .map(Token::Symbol)
        .parse_next(input)
}

fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,
        string_literal,
        connector,  // Must come before symbol
        identifier, // Must come before symbol
        punctuation,
        newline, // Must come before whitespace
        whitespace,
        symbol,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    let inside_string = diagnostic.code() == Some(ErrorCode::E003);
                    self.diagnostics.emit(diagnostic);

                    if inside_string {
                        Self::skip_rest_of_string(&mut input);
                    } else if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Skip past the closing quote of a string that contained a bad escape,
    /// stopping at the end of the line if there is none.
    fn skip_rest_of_string(input: &mut Input<'a>) {
        let rest = input.peek_slice(input.eof_offset());
        let len = match rest.find(['"', '\n']) {
            Some(idx) if rest[idx..].starts_with('"') => idx + 1,
            Some(idx) => idx,
            None => rest.len(),
        };
        input.next_slice(len);
    }

    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Build a diagnostic from the first `LexerDiagnostic` context, falling
    /// back to E002 for characters no rule accepts.
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
            let span = Span::new(*start..error_pos.max(*start + 1));
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
            .with_help("control characters are only allowed inside quoted strings")
    }
}

/// Tokenize D2 source, collecting every lexical error.
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token<'_>> {
        tokenize(input)
            .expect("input should tokenize")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    fn error_codes(input: &str) -> Vec<ErrorCode> {
        tokenize(input)
            .expect_err("input should fail to tokenize")
            .diagnostics()
            .iter()
            .filter_map(|d| d.code())
            .collect()
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(kinds("web_server"), vec![Token::Identifier("web_server")]);
        assert_eq!(kinds("web-server"), vec![Token::Identifier("web-server")]);
        assert_eq!(kinds("120"), vec![Token::Identifier("120")]);
        assert_eq!(kinds("café"), vec![Token::Identifier("café")]);
    }

    #[test]
    fn test_connectors() {
        assert_eq!(kinds("->"), vec![Token::Arrow]);
        assert_eq!(kinds("<-"), vec![Token::LeftArrow]);
        assert_eq!(kinds("<->"), vec![Token::DoubleArrow]);
        assert_eq!(kinds("--"), vec![Token::Line]);
    }

    #[test]
    fn test_hyphen_does_not_swallow_arrow() {
        assert_eq!(
            kinds("a->b"),
            vec![Token::Identifier("a"), Token::Arrow, Token::Identifier("b")]
        );
        assert_eq!(
            kinds("a--b"),
            vec![Token::Identifier("a"), Token::Line, Token::Identifier("b")]
        );
    }

    #[test]
    fn test_connection_statement() {
        assert_eq!(
            kinds("a.b -> c: hi;"),
            vec![
                Token::Identifier("a"),
                Token::Dot,
                Token::Identifier("b"),
                Token::Whitespace,
                Token::Arrow,
                Token::Whitespace,
                Token::Identifier("c"),
                Token::Colon,
                Token::Whitespace,
                Token::Identifier("hi"),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            kinds(r#""Load Balancer""#),
            vec![Token::StringLiteral("Load Balancer".to_string())]
        );
        assert_eq!(
            kinds(r#""say \"hi\"\n""#),
            vec![Token::StringLiteral("say \"hi\"\n".to_string())]
        );
        assert_eq!(kinds(r#""""#), vec![Token::StringLiteral(String::new())]);
    }

    #[test]
    fn test_comments_and_newlines() {
        assert_eq!(
            kinds("a # note\nb"),
            vec![
                Token::Identifier("a"),
                Token::Whitespace,
                Token::LineComment(" note"),
                Token::Newline,
                Token::Identifier("b"),
            ]
        );
    }

    #[test]
    fn test_symbols_in_labels() {
        assert_eq!(
            kinds("(v2)!"),
            vec![
                Token::Symbol("("),
                Token::Identifier("v2"),
                Token::Symbol(")"),
                Token::Symbol("!"),
            ]
        );
        assert_eq!(kinds("-"), vec![Token::Symbol("-")]);
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize("ab -> cd").unwrap();
        assert_eq!(tokens[0].span, Span::new(0..2));
        assert_eq!(tokens[2].span, Span::new(3..5));
        assert_eq!(tokens[4].span, Span::new(6..8));
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(error_codes("a: \"open\nb"), vec![ErrorCode::E001]);
    }

    #[test]
    fn test_invalid_escape() {
        let codes = error_codes(r#"a: "bad \q escape""#);
        assert_eq!(codes.first(), Some(&ErrorCode::E003));
    }

    #[test]
    fn test_unexpected_control_character() {
        assert_eq!(error_codes("a\u{7}b"), vec![ErrorCode::E002]);
    }

    #[test]
    fn test_multiple_errors_collected() {
        let codes = error_codes("a\u{7}\nb\u{1}");
        assert_eq!(codes, vec![ErrorCode::E002, ErrorCode::E002]);
    }

    #[test]
    fn test_unterminated_string_span_starts_at_quote() {
        let err = tokenize("x: \"abc").unwrap_err();
        let label = &err.diagnostics()[0].labels()[0];
        assert_eq!(label.span().start(), 3);
    }
}
