//! RTF lexer/tokenizer.
//!
//! The lexer works on raw bytes and produces one [`Token`] at a time. It keeps a
//! single cursor into the input; lookahead is implemented by re-scanning from a
//! saved cursor, so no token buffer is ever allocated.

use std::borrow::Cow;
use std::fmt;

/// Lexical token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Any byte that matches no other rule
    Invalid,
    /// A single `\n`
    Newline,
    /// End of input (zero-length)
    Eof,
    /// `{`
    OpenGroup,
    /// `}`
    CloseGroup,
    /// `\`
    Escape,
    /// `;`
    Semicolon,
    /// A run of ASCII letters
    StringRun,
    /// A run of ASCII digits
    NumberRun,
    /// A space followed by any number of spaces or tabs
    Whitespace,
}

impl TokenKind {
    /// Human readable name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Invalid => "invalid byte",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of input",
            TokenKind::OpenGroup => "'{'",
            TokenKind::CloseGroup => "'}'",
            TokenKind::Escape => "'\\'",
            TokenKind::Semicolon => "';'",
            TokenKind::StringRun => "word",
            TokenKind::NumberRun => "number",
            TokenKind::Whitespace => "whitespace",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexical token borrowing its bytes from the input.
///
/// `text` is always `&input[start..end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token classification
    pub kind: TokenKind,
    /// Raw bytes of the token
    pub text: &'a [u8],
    /// Byte offset of the first byte
    pub start: usize,
    /// Byte offset one past the last byte
    pub end: usize,
}

impl<'a> Token<'a> {
    /// Lossy UTF-8 view of the token text.
    #[inline]
    pub fn as_str(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.text)
    }

    /// Whether the token text equals `word`.
    #[inline]
    pub fn is(&self, word: &str) -> bool {
        self.text == word.as_bytes()
    }

    /// Whether this is the `-` sign preceding a negative control word argument.
    #[inline]
    pub fn is_minus(&self) -> bool {
        self.kind == TokenKind::Invalid && self.text == b"-"
    }

    /// Whether this is the `\r` of a CRLF line break.
    #[inline]
    pub fn is_carriage_return(&self) -> bool {
        self.kind == TokenKind::Invalid && self.text == b"\r"
    }

    /// Whether the token only formats the source: whitespace or a line break.
    #[inline]
    pub fn is_blank(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Newline)
            || self.is_carriage_return()
    }

    /// Length of the token in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the token is zero-length (only `Eof` is).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The same token with its first byte removed.
    ///
    /// A space directly after a control word delimits the word and is not
    /// part of the text that follows; this splits it off a whitespace run.
    pub fn without_delimiter(&self) -> Token<'a> {
        if self.is_empty() {
            return *self;
        }
        Token {
            kind: self.kind,
            text: &self.text[1..],
            start: self.start + 1,
            end: self.end,
        }
    }
}

/// RTF lexer over an in-memory byte buffer.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    /// Source input
    input: &'a [u8],
    /// Current position in bytes
    pos: usize,
    /// Set once the `Eof` token has been handed out through `Iterator`
    finished: bool,
}

/// Create a pull-based tokenizer over `input`.
#[inline]
pub fn tokenize(input: &[u8]) -> Lexer<'_> {
    Lexer::new(input)
}

impl<'a> Lexer<'a> {
    /// Create a new lexer.
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            finished: false,
        }
    }

    /// Current cursor position in bytes.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The whole input buffer.
    #[inline]
    pub fn input(&self) -> &'a [u8] {
        self.input
    }

    /// Scan the next token and advance past it.
    ///
    /// Once the input is exhausted every call returns a zero-length `Eof`
    /// token positioned at the end of the input.
    pub fn next_token(&mut self) -> Token<'a> {
        let start = self.pos;

        let Some(&c) = self.input.get(self.pos) else {
            return self.make(TokenKind::Eof, start);
        };
        self.pos += 1;

        let kind = match c {
            b'\n' => TokenKind::Newline,
            b'\\' => TokenKind::Escape,
            b'{' => TokenKind::OpenGroup,
            b'}' => TokenKind::CloseGroup,
            b';' => TokenKind::Semicolon,
            b' ' => {
                self.eat_while(|b| b == b' ' || b == b'\t');
                TokenKind::Whitespace
            },
            c if c.is_ascii_alphabetic() => {
                self.eat_while(|b| b.is_ascii_alphabetic());
                TokenKind::StringRun
            },
            c if c.is_ascii_digit() => {
                self.eat_while(|b| b.is_ascii_digit());
                TokenKind::NumberRun
            },
            _ => TokenKind::Invalid,
        };

        self.make(kind, start)
    }

    /// Look at the next token without moving the cursor.
    #[inline]
    pub fn peek(&mut self) -> Token<'a> {
        self.peek_ahead(0)
    }

    /// Look `n` tokens past the next one without moving the cursor.
    ///
    /// `peek_ahead(0)` is the same as [`Lexer::peek`].
    pub fn peek_ahead(&mut self, n: usize) -> Token<'a> {
        let saved = self.pos;
        let mut token = self.next_token();
        for _ in 0..n {
            token = self.next_token();
        }
        self.pos = saved;
        token
    }

    #[inline]
    fn make(&self, kind: TokenKind, start: usize) -> Token<'a> {
        Token {
            kind,
            text: &self.input[start..self.pos],
            start,
            end: self.pos,
        }
    }

    #[inline]
    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while let Some(&b) = self.input.get(self.pos) {
            if !pred(b) {
                break;
            }
            self.pos += 1;
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    /// Yields every token including one trailing `Eof`, then `None`.
    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.finished = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        tokenize(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_tokenization() {
        let input = br"{\rtf1\ansi Hello}";
        let tokens: Vec<_> = tokenize(input).collect();

        assert_eq!(
            kinds(input),
            vec![
                TokenKind::OpenGroup,
                TokenKind::Escape,
                TokenKind::StringRun,
                TokenKind::NumberRun,
                TokenKind::Escape,
                TokenKind::StringRun,
                TokenKind::Whitespace,
                TokenKind::StringRun,
                TokenKind::CloseGroup,
                TokenKind::Eof,
            ]
        );
        assert_eq!(tokens[2].text, b"rtf");
        assert_eq!(tokens[3].text, b"1");
        assert_eq!(tokens[7].text, b"Hello");
        assert_eq!((tokens[7].start, tokens[7].end), (12, 17));
    }

    #[test]
    fn test_whitespace_run_starts_with_space() {
        let tokens: Vec<_> = tokenize(b"a \t  b\tc").collect();
        assert_eq!(tokens[1].kind, TokenKind::Whitespace);
        assert_eq!(tokens[1].text, b" \t  ");
        // A tab that does not follow a space is not whitespace
        assert_eq!(tokens[3].kind, TokenKind::Invalid);
        assert_eq!(tokens[3].text, b"\t");
    }

    #[test]
    fn test_invalid_bytes_are_single() {
        let tokens: Vec<_> = tokenize("-é".as_bytes()).collect();
        assert_eq!(tokens.len(), 4);
        assert!(tokens[0].is_minus());
        assert_eq!(tokens[1].kind, TokenKind::Invalid);
        assert_eq!(tokens[1].len(), 1);
        assert_eq!(tokens[2].kind, TokenKind::Invalid);
    }

    #[test]
    fn test_eof_repeats_at_end() {
        let mut lexer = Lexer::new(b"ab");
        assert_eq!(lexer.next_token().kind, TokenKind::StringRun);
        for _ in 0..3 {
            let eof = lexer.next_token();
            assert_eq!(eof.kind, TokenKind::Eof);
            assert_eq!((eof.start, eof.end), (2, 2));
            assert!(eof.text.is_empty());
        }
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut lexer = Lexer::new(br"\par 12");
        assert_eq!(lexer.peek().kind, TokenKind::Escape);
        assert_eq!(lexer.peek_ahead(1).text, b"par");
        assert_eq!(lexer.peek_ahead(3).kind, TokenKind::NumberRun);
        assert_eq!(lexer.peek_ahead(10).kind, TokenKind::Eof);
        assert_eq!(lexer.position(), 0);
        assert_eq!(lexer.next_token().kind, TokenKind::Escape);
        assert_eq!(lexer.position(), 1);
    }

    #[test]
    fn test_without_delimiter() {
        let tokens: Vec<_> = tokenize(b"x   y").collect();
        let ws = tokens[1];
        let trimmed = ws.without_delimiter();
        assert_eq!(trimmed.text, b"  ");
        assert_eq!((trimmed.start, trimmed.end), (2, 4));
    }

    #[test]
    fn test_crlf_is_blank() {
        let tokens: Vec<_> = tokenize(b"\r\n \tx\r").collect();
        let blank: Vec<_> = tokens.iter().map(Token::is_blank).collect();
        assert_eq!(blank, vec![true, true, true, false, true, false]);
        assert!(tokens[0].is_carriage_return());
        assert!(!tokens[1].is_carriage_return());
    }

    #[test]
    fn test_iterator_ends_after_single_eof() {
        let tokens: Vec<_> = tokenize(b"").collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn prop_tokenization_is_lossless(input in prop::collection::vec(any::<u8>(), 0..256)) {
                let mut rebuilt = Vec::with_capacity(input.len());
                let mut last_end = 0;
                for token in tokenize(&input) {
                    prop_assert_eq!(token.start, last_end);
                    prop_assert_eq!(token.text, &input[token.start..token.end]);
                    rebuilt.extend_from_slice(token.text);
                    last_end = token.end;
                }
                prop_assert_eq!(rebuilt, input);
            }

            #[test]
            fn prop_rtf_like_input_is_lossless(input in r"[{}\\; a-z0-9\n\t-]{0,128}") {
                let rebuilt: Vec<u8> = tokenize(input.as_bytes())
                    .flat_map(|t| t.text.iter().copied())
                    .collect();
                prop_assert_eq!(rebuilt, input.into_bytes());
            }
        }
    }
}
