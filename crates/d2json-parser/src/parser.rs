//! Parser for D2 source tokens.
//!
//! Transforms the token stream from the [`lexer`](super::lexer) into the
//! [`ast`](super::ast) tree. The public entry point is [`build_document`].
//! Parsing stops at the first syntax error.

use winnow::{
    Parser as _,
    combinator::{opt, repeat},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    ast::{ArrowKind, Block, ConnectionDecl, Document, Hop, Key, ShapeDecl, Statement, Value},
    error::{Diagnostic, ErrorCode},
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context attached to parser errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// What the parser was looking for.
    Expected(&'static str),
    /// A block starting at this `{` ran into the end of input.
    UnclosedBlock(Span),
}

type Input<'src> = D2TokenSlice<'src>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;
type D2TokenSlice<'src> = TokenSlice<'src, PositionedToken<'src>>;

/// Turn a backtrack into a committed error that reports `expected`.
fn commit<O>(result: IResult<O>, expected: &'static str) -> IResult<O> {
    result.map_err(|err| match err {
        ErrMode::Backtrack(mut e) => {
            e.push(Context::Expected(expected));
            ErrMode::Cut(e)
        }
        other => other,
    })
}

fn cut_error(context: Context) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(context);
    ErrMode::Cut(e)
}

/// Look at the next token without consuming it.
fn peek_token<'src>(input: &mut Input<'src>) -> Option<&'src PositionedToken<'src>> {
    let checkpoint = input.checkpoint();
    let token = input.next_token();
    input.reset(&checkpoint);
    token
}

fn whitespace<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| matches!(token.token, Token::Whitespace))
        .void()
        .parse_next(input)
}

/// Spaces within a line.
fn inline_ws<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., whitespace).parse_next(input)
}

/// Anything that may sit between statements.
fn separators<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(
        0..,
        any.verify(|token: &PositionedToken<'_>| {
            token.token == Token::Whitespace || token.token.is_terminator()
        })
        .void(),
    )
    .parse_next(input)
}

fn punct<'src>(input: &mut Input<'src>, expected: Token<'static>) -> IResult<Span> {
    any.verify(|token: &PositionedToken<'_>| token.token == expected)
        .map(|token: &PositionedToken<'_>| token.span)
        .parse_next(input)
}

fn quoted<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::StringLiteral(s) => Some(Spanned::new(s.clone(), token.span)),
        _ => None,
    })
    .context(Context::Expected("string"))
    .parse_next(input)
}

fn word<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new((*name).to_string(), token.span)),
        _ => None,
    })
    .context(Context::Expected("identifier"))
    .parse_next(input)
}

/// One key segment: a quoted string, or words separated by single spaces
/// (`my server`).
fn key_segment<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    if let Some(segment) = opt(quoted).parse_next(input)? {
        return Ok(segment);
    }

    let first = word(input)?;
    let mut span = first.span();
    let mut text = first.into_inner();

    loop {
        let checkpoint = input.checkpoint();
        let next = (repeat(1.., whitespace).map(|()| ()), word).parse_next(input);
        match next {
            Ok(((), next)) => {
                text.push(' ');
                text.push_str(next.inner());
                span = span.union(next.span());
            }
            Err(_) => {
                input.reset(&checkpoint);
                break;
            }
        }
    }

    Ok(Spanned::new(text, span))
}

/// A dotted key: `a`, `a.b.c`, `"quoted".child`.
fn key<'src>(input: &mut Input<'src>) -> IResult<Key> {
    let mut key = Key::new(key_segment(input)?);

    while opt(|i: &mut Input<'src>| punct(i, Token::Dot))
        .parse_next(input)?
        .is_some()
    {
        key.push(commit(key_segment(input), "key after `.`")?);
    }

    Ok(key)
}

fn arrow<'src>(input: &mut Input<'src>) -> IResult<Spanned<ArrowKind>> {
    any.verify_map(|token: &PositionedToken<'_>| {
        let kind = match token.token {
            Token::Arrow => ArrowKind::Forward,
            Token::LeftArrow => ArrowKind::Backward,
            Token::DoubleArrow => ArrowKind::Both,
            Token::Line => ArrowKind::Undirected,
            _ => return None,
        };
        Some(Spanned::new(kind, token.span))
    })
    .parse_next(input)
}

fn ends_value(token: &Token<'_>) -> bool {
    token.is_terminator() || matches!(token, Token::LeftBrace | Token::RightBrace)
}

/// The value after `:`. A lone quoted string is a quoted value; anything
/// else up to the end of the statement or an opening `{` is unquoted text.
fn value<'src>(input: &mut Input<'src>) -> IResult<Option<Value>> {
    inline_ws(input)?;

    let checkpoint = input.checkpoint();
    if let Some(text) = opt(quoted).parse_next(input)? {
        inline_ws(input)?;
        if peek_token(input).is_none_or(|t| ends_value(&t.token)) {
            return Ok(Some(Value::Quoted(text)));
        }
        input.reset(&checkpoint);
    }

    let mut span: Option<Span> = None;
    while let Some(token) = peek_token(input) {
        if ends_value(&token.token) {
            break;
        }
        input.next_token();
        if !token.is_trivia() {
            span = Some(span.map_or(token.span, |s| s.union(token.span)));
        }
    }

    Ok(span.map(Value::Unquoted))
}

/// `{ statements }`
fn block<'src>(input: &mut Input<'src>) -> IResult<Block> {
    let open = punct(input, Token::LeftBrace)?;
    let statements = statements(input)?;

    match input.next_token() {
        Some(token) if token.token == Token::RightBrace => Ok(Block {
            statements,
            span: open.union(token.span),
        }),
        _ => Err(cut_error(Context::UnclosedBlock(open))),
    }
}

fn statement<'src>(input: &mut Input<'src>) -> IResult<Statement> {
    let first = commit(key(input), "shape key or connection")?;
    inline_ws(input)?;

    let mut hops = Vec::new();
    while let Some(connector) = opt(arrow).parse_next(input)? {
        inline_ws(input)?;
        let target = commit(key(input), "connection target")?;
        inline_ws(input)?;
        hops.push(Hop {
            arrow: connector,
            target,
        });
    }

    let label = match opt(|i: &mut Input<'src>| punct(i, Token::Colon)).parse_next(input)? {
        Some(_) => value(input)?,
        None => None,
    };
    inline_ws(input)?;

    let body = opt(block).parse_next(input)?;
    inline_ws(input)?;

    match peek_token(input) {
        None => {}
        Some(token) if token.token.is_terminator() || token.token == Token::RightBrace => {}
        Some(_) => return Err(cut_error(Context::Expected("end of statement"))),
    }

    Ok(if hops.is_empty() {
        Statement::Shape(ShapeDecl {
            key: first,
            value: label,
            block: body,
        })
    } else {
        Statement::Connection(ConnectionDecl {
            source: first,
            hops,
            value: label,
            block: body,
        })
    })
}

/// Statements up to the end of input or a closing `}`.
fn statements<'src>(input: &mut Input<'src>) -> IResult<Vec<Statement>> {
    let mut statements = Vec::new();

    loop {
        separators(input)?;
        match peek_token(input) {
            None => break,
            Some(token) if token.token == Token::RightBrace => break,
            Some(_) => statements.push(statement(input)?),
        }
    }

    Ok(statements)
}

fn document<'src>(input: &mut Input<'src>) -> IResult<Document> {
    let statements = statements(input)?;

    // Only a stray `}` can stop the top level early.
    if !input.is_empty() {
        return Err(cut_error(Context::Expected("statement")));
    }

    Ok(Document { statements })
}

fn describe(token: &Token<'_>) -> String {
    match token {
        Token::Newline => "newline".to_string(),
        Token::StringLiteral(_) => "string".to_string(),
        Token::LineComment(_) => "comment".to_string(),
        other => format!("`{other}`"),
    }
}

/// Convert a winnow error at `position` (index of the next unread token)
/// into a diagnostic.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    position: usize,
) -> Diagnostic {
    let end_of_input = tokens
        .last()
        .map(|t| Span::new(t.span.end()..t.span.end()))
        .unwrap_or_default();

    let context = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(open) = context.context().find_map(|ctx| match ctx {
        Context::UnclosedBlock(span) => Some(*span),
        _ => None,
    }) {
        return Diagnostic::error("unclosed block")
            .with_code(ErrorCode::E101)
            .with_label(end_of_input, "expected `}`")
            .with_secondary_label(open, "block opened here")
            .with_help("add a closing `}`");
    }

    // Outermost expectation reads best: "connection target" over "identifier".
    let expected = context
        .context()
        .filter_map(|ctx| match ctx {
            Context::Expected(label) => Some(*label),
            _ => None,
        })
        .last();

    let (span, found) = match tokens.get(position) {
        Some(token) => (token.span, describe(&token.token)),
        None => (end_of_input, "end of input".to_string()),
    };

    let message = match expected {
        Some(expected) => format!("unexpected {found}, expected {expected}"),
        None => format!("unexpected {found}"),
    };

    Diagnostic::error(message)
        .with_code(ErrorCode::E100)
        .with_label(span, ErrorCode::E100.description())
}

/// Build a document from tokens.
pub fn build_document<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<Document, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    document
        .parse_next(&mut token_slice)
        .map_err(|e| convert_error(e, tokens, tokens.len() - token_slice.eof_offset()))
}
