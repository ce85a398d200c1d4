/// Kinds of token found in a stack record payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LParen,
    RParen,
    Comma,
    Colon,
    /// The literal ` - ` between the span and word fields.
    Separator,
    Quote,
    /// ASCII digits, optionally preceded by `-`.
    Int,
    Whitespace,
    /// Anything else, consumed greedily until a special character.
    Text,
    Eof,
}

impl TokenKind {
    /// How the token is spelled in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Separator => "' - '",
            TokenKind::Quote => "'\"'",
            TokenKind::Int => "integer",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Text => "text",
            TokenKind::Eof => "end of line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the token in the lexed input.
    pub offset: usize,
}

impl Token<'_> {
    pub fn end(&self) -> usize {
        self.offset + self.text.len()
    }

    /// The token text, or a readable placeholder at end of input.
    pub fn found(&self) -> String {
        match self.kind {
            TokenKind::Eof => TokenKind::Eof.describe().to_string(),
            _ => self.text.to_string(),
        }
    }
}

const SEPARATOR: &str = " - ";

/// A lexer for stack record payloads.
///
/// Single pass and zero-copy: tokens borrow from the input and carry their
/// byte offset, so callers can slice the original text between any two tokens.
/// A lexer can also start mid-input with [`Lexer::at`], which lets the grammar
/// re-lex from an arbitrary cursor.
///
/// ```
/// use stacklog::lexer::{Lexer, TokenKind};
///
/// let kinds: Vec<_> = Lexer::new("(1,2) - x").map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::LParen,
///         TokenKind::Int,
///         TokenKind::Comma,
///         TokenKind::Int,
///         TokenKind::RParen,
///         TokenKind::Separator,
///         TokenKind::Text,
///     ]
/// );
/// ```
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::at(input, 0)
    }

    /// Creates a lexer that starts at byte `position`, clamped to the input
    /// and rounded down to a char boundary.
    pub fn at(input: &'a str, position: usize) -> Self {
        let mut position = position.min(input.len());
        while !input.is_char_boundary(position) {
            position -= 1;
        }
        Self { input, position }
    }

    /// Returns the next token, or an empty `Eof` token at the end.
    pub fn next_token(&mut self) -> Token<'a> {
        let start = self.position;
        let rest = &self.input[start..];
        let Some(c) = rest.chars().next() else {
            return Token {
                kind: TokenKind::Eof,
                text: "",
                offset: start,
            };
        };

        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '"' => self.single(TokenKind::Quote),
            ' ' if rest.starts_with(SEPARATOR) => {
                self.position += SEPARATOR.len();
                TokenKind::Separator
            }
            c if c.is_whitespace() => {
                self.position += c.len_utf8();
                while let Some(n) = self.input[self.position..].chars().next() {
                    if !n.is_whitespace() || self.input[self.position..].starts_with(SEPARATOR) {
                        break;
                    }
                    self.position += n.len_utf8();
                }
                TokenKind::Whitespace
            }
            '-' if rest[1..].starts_with(|n: char| n.is_ascii_digit()) => {
                self.position += 1;
                self.eat_digits();
                TokenKind::Int
            }
            c if c.is_ascii_digit() => {
                self.eat_digits();
                TokenKind::Int
            }
            _ => {
                self.position += c.len_utf8();
                while let Some(n) = self.input[self.position..].chars().next() {
                    match n {
                        '(' | ')' | ',' | ':' | '"' => break,
                        n if n.is_whitespace() => break,
                        _ => self.position += n.len_utf8(),
                    }
                }
                TokenKind::Text
            }
        };

        Token {
            kind,
            text: &self.input[start..self.position],
            offset: start,
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.position += 1;
        kind
    }

    fn eat_digits(&mut self) {
        let digits = self.input[self.position..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        self.position += digits;
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<(TokenKind, &str)> {
        Lexer::new(input).map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn test_position_tokens() {
        assert_eq!(
            tokenize("(12, -3)"),
            vec![
                (TokenKind::LParen, "("),
                (TokenKind::Int, "12"),
                (TokenKind::Comma, ","),
                (TokenKind::Whitespace, " "),
                (TokenKind::Int, "-3"),
                (TokenKind::RParen, ")"),
            ]
        );
    }

    #[test]
    fn test_separator_is_one_token() {
        assert_eq!(
            tokenize("a - b"),
            vec![
                (TokenKind::Text, "a"),
                (TokenKind::Separator, " - "),
                (TokenKind::Text, "b"),
            ]
        );
    }

    #[test]
    fn test_whitespace_stops_before_separator() {
        assert_eq!(
            tokenize("a  - b"),
            vec![
                (TokenKind::Text, "a"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Separator, " - "),
                (TokenKind::Text, "b"),
            ]
        );
    }

    #[test]
    fn test_dash_without_digit_is_text() {
        assert_eq!(
            tokenize("-x -"),
            vec![
                (TokenKind::Text, "-x"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Text, "-"),
            ]
        );
    }

    #[test]
    fn test_quoted_word() {
        assert_eq!(
            tokenize(":\"héllo\""),
            vec![
                (TokenKind::Colon, ":"),
                (TokenKind::Quote, "\""),
                (TokenKind::Text, "héllo"),
                (TokenKind::Quote, "\""),
            ]
        );
    }

    #[test]
    fn test_digits_then_text() {
        assert_eq!(
            tokenize("12ab"),
            vec![(TokenKind::Int, "12"), (TokenKind::Text, "ab")]
        );
    }

    #[test]
    fn test_offsets_and_restart() {
        let input = "UNDO x:(1,2)";
        let tokens: Vec<_> = Lexer::new(input).collect();
        assert_eq!(tokens[2].offset, 5);
        assert_eq!(tokens[3].offset, 6);

        let mut mid = Lexer::at(input, 7);
        assert_eq!(mid.next_token().kind, TokenKind::LParen);
        assert_eq!(Lexer::at(input, 100).next_token().kind, TokenKind::Eof);
    }

    #[test]
    fn test_start_inside_multibyte_char() {
        let token = Lexer::at("é:", 1).next_token();
        assert_eq!(token.kind, TokenKind::Text);
        assert_eq!(token.text, "é");
        assert_eq!(token.offset, 0);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("").is_empty());
        let eof = Lexer::new("").next_token();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.found(), "end of line");
    }
}
