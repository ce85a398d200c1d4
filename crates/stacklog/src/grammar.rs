//! Declarative description of the stack record encoding.
//!
//! A grammar is a static list of [`Rule`]s run in order over a [`Cursor`]
//! that re-lexes the input on demand. Each rule either consumes tokens,
//! fills a capture slot, or fails with a [`GrammarError`] carrying the byte
//! offset where the input stopped matching.
//!
//! The record payload (everything after `STACK_APPEND(` / `STACK_EDIT(`) is:
//!
//! ```text
//! payload  := [id ':'] ACTION DELIM discard ':' position [':' position]
//!             ' - ' [position] junk ':"' word '"' EOL
//! position := '(' INT ',' INT ')'          (whitespace allowed around parts)
//! ```
//!
//! The span end is taken from whichever of the two optional positions is
//! present; exactly one of them must be.

use crate::error::GrammarError;
use crate::ir::{ActionKind, EditEvent, TextPosition, TextSpan};
use crate::lexer::{Lexer, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `UNDO` or `REDO`, optionally preceded by an `<id>:` field.
    Action,
    /// A `true`/`false` literal standing for UNDO/REDO.
    Flag,
    /// Exactly one character of any kind.
    Delimiter,
    /// Discards everything up to and including the next token of this kind.
    SkipThrough(TokenKind),
    /// `(<int>,<int>)` stored into the slot.
    Position(Slot),
    /// A single token of this kind.
    Literal(TokenKind),
    /// Runs the inner rules; on failure, rewinds as if nothing was consumed.
    Optional(&'static [Rule]),
    /// Discards text up to the first `:"`, then captures up to a closing `"`
    /// that ends the input.
    QuotedWord,
    /// Captures the rest of the input verbatim.
    Rest,
}

/// Payload of an APPEND or EDIT record, after the opening `(`.
pub const STACK_RECORD: &[Rule] = &[
    Rule::Action,
    Rule::Delimiter,
    Rule::SkipThrough(TokenKind::Colon),
    Rule::Position(Slot::Start),
    Rule::Optional(&[Rule::Literal(TokenKind::Colon), Rule::Position(Slot::End)]),
    Rule::Literal(TokenKind::Separator),
    Rule::Optional(&[Rule::Position(Slot::End)]),
    Rule::QuotedWord,
];

/// The `Display` rendering of an [`EditEvent`]: `true, (1, 2), (3, 4), word`.
pub const RENDERED_EVENT: &[Rule] = &[
    Rule::Flag,
    Rule::Literal(TokenKind::Comma),
    Rule::Delimiter,
    Rule::Position(Slot::Start),
    Rule::Literal(TokenKind::Comma),
    Rule::Delimiter,
    Rule::Position(Slot::End),
    Rule::Literal(TokenKind::Comma),
    Rule::Delimiter,
    Rule::Rest,
];

/// Values captured while running a grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Captures<'a> {
    pub action: Option<ActionKind>,
    pub start: Option<TextPosition>,
    pub end: Option<TextPosition>,
    pub word: Option<&'a str>,
}

impl Captures<'_> {
    /// Assembles an event once every slot is filled; `at` positions the error.
    fn into_event(self, at: usize) -> Result<EditEvent, GrammarError> {
        let action = self
            .action
            .ok_or_else(|| GrammarError::field(at, "action", "nothing"))?;
        let start = self
            .start
            .ok_or_else(|| GrammarError::field(at, "span start", "nothing"))?;
        let end = self
            .end
            .ok_or_else(|| GrammarError::field(at, "span end", "nothing"))?;
        let word = self
            .word
            .ok_or_else(|| GrammarError::field(at, "word", "nothing"))?;
        Ok(EditEvent::new(action, TextSpan { start, end }, word))
    }
}

/// A byte cursor over the input that lexes one token at a time.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn peek(&self) -> Token<'a> {
        Lexer::at(self.input, self.pos).next_token()
    }

    pub fn bump(&mut self) -> Token<'a> {
        let token = self.peek();
        self.pos = token.end();
        token
    }

    fn skip_whitespace(&mut self) {
        while self.peek().kind == TokenKind::Whitespace {
            self.bump();
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, GrammarError> {
        let token = self.peek();
        if token.kind == kind {
            Ok(self.bump())
        } else {
            Err(GrammarError::field(token.offset, kind.describe(), token.found()))
        }
    }

    fn int(&mut self) -> Result<i32, GrammarError> {
        self.skip_whitespace();
        let token = self.expect(TokenKind::Int)?;
        token
            .text
            .parse()
            .map_err(|_| GrammarError::field(token.offset, "32-bit integer", token.text))
    }

    fn position(&mut self) -> Result<TextPosition, GrammarError> {
        self.skip_whitespace();
        self.expect(TokenKind::LParen)?;
        let row = self.int()?;
        self.skip_whitespace();
        self.expect(TokenKind::Comma)?;
        let col = self.int()?;
        self.skip_whitespace();
        self.expect(TokenKind::RParen)?;
        self.skip_whitespace();
        Ok(TextPosition { row, col })
    }

    /// Matches `UNDO`/`REDO` as a literal prefix; the character after it is
    /// left for [`Rule::Delimiter`].
    fn action(&mut self) -> Result<ActionKind, GrammarError> {
        if let Some(action) = leading_action(self.rest()) {
            self.pos += action.keyword().len();
            return Ok(action);
        }
        // `<id>:` ahead of the keyword. The id is opaque but has no whitespace.
        let rest = self.rest();
        if let Some(colon) = rest.find(':') {
            let id = &rest[..colon];
            if !id.is_empty() && !id.contains(char::is_whitespace) {
                let after = self.pos + colon + 1;
                if let Some(action) = leading_action(&self.input[after..]) {
                    self.pos = after + action.keyword().len();
                    return Ok(action);
                }
                let keyword = Lexer::at(self.input, after).next_token();
                return Err(GrammarError::action(keyword.offset, keyword.found()));
            }
        }
        let first = self.peek();
        Err(GrammarError::action(first.offset, first.found()))
    }

    fn quoted_word(&mut self) -> Result<&'a str, GrammarError> {
        loop {
            let token = self.bump();
            match token.kind {
                TokenKind::Eof => {
                    return Err(GrammarError::field(token.offset, "':\"'", token.found()));
                }
                TokenKind::Colon if self.peek().kind == TokenKind::Quote => {
                    let open = self.bump();
                    let body = self.rest();
                    return match body.strip_suffix('"') {
                        Some(word) => {
                            self.pos = self.input.len();
                            Ok(word)
                        }
                        None => Err(GrammarError::field(
                            open.end() + body.len(),
                            "closing '\"'",
                            TokenKind::Eof.describe(),
                        )),
                    };
                }
                _ => {}
            }
        }
    }

    fn apply(&mut self, rule: &Rule, captures: &mut Captures<'a>) -> Result<(), GrammarError> {
        match rule {
            Rule::Action => captures.action = Some(self.action()?),
            Rule::Flag => {
                let token = self.peek();
                let undo = match token.text {
                    "true" => true,
                    "false" => false,
                    _ => return Err(GrammarError::action(token.offset, token.found())),
                };
                self.bump();
                captures.action = Some(if undo {
                    ActionKind::Undo
                } else {
                    ActionKind::Redo
                });
            }
            Rule::Delimiter => match self.rest().chars().next() {
                Some(c) => self.pos += c.len_utf8(),
                None => {
                    return Err(GrammarError::field(
                        self.pos,
                        "delimiter",
                        TokenKind::Eof.describe(),
                    ));
                }
            },
            Rule::SkipThrough(kind) => loop {
                let token = self.bump();
                if token.kind == *kind {
                    break;
                }
                if token.kind == TokenKind::Eof {
                    return Err(GrammarError::field(token.offset, kind.describe(), token.found()));
                }
            },
            Rule::Position(slot) => {
                let at = self.pos;
                let position = self.position()?;
                let target = match slot {
                    Slot::Start => &mut captures.start,
                    Slot::End => &mut captures.end,
                };
                if target.is_some() {
                    return Err(GrammarError::field(at, "a single span end", "another position"));
                }
                *target = Some(position);
            }
            Rule::Literal(kind) => {
                self.expect(*kind)?;
            }
            Rule::Optional(rules) => {
                let (saved_cursor, saved_captures) = (*self, *captures);
                for inner in rules.iter() {
                    if self.apply(inner, captures).is_err() {
                        *self = saved_cursor;
                        *captures = saved_captures;
                        break;
                    }
                }
            }
            Rule::QuotedWord => captures.word = Some(self.quoted_word()?),
            Rule::Rest => {
                captures.word = Some(self.rest());
                self.pos = self.input.len();
            }
        }
        Ok(())
    }

    /// Runs `rules` in order from the current position.
    pub fn run(&mut self, rules: &[Rule]) -> Result<Captures<'a>, GrammarError> {
        let mut captures = Captures::default();
        for rule in rules {
            self.apply(rule, &mut captures)?;
        }
        Ok(captures)
    }
}

fn leading_action(text: &str) -> Option<ActionKind> {
    [ActionKind::Undo, ActionKind::Redo]
        .into_iter()
        .find(|action| text.starts_with(action.keyword()))
}

/// Parses a record payload into an event. Offsets in errors are payload-relative.
pub fn parse_record(payload: &str) -> Result<EditEvent, GrammarError> {
    let mut cursor = Cursor::new(payload);
    cursor.run(STACK_RECORD)?.into_event(cursor.pos())
}

/// Parses the rendering produced by `EditEvent`'s `Display` impl.
pub fn parse_rendered(text: &str) -> Result<EditEvent, GrammarError> {
    let mut cursor = Cursor::new(text);
    cursor.run(RENDERED_EVENT)?.into_event(cursor.pos())
}
