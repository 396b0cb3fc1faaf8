//! RTF parser that turns the token stream into an ordered entity sequence.
//!
//! Control words are routed to specialized grammars through immutable
//! compile-time tables; everything the tables do not know becomes a generic
//! [`ControlWord`]. The parser never recovers: the first error aborts.

use super::entity::*;
use super::error::{RtfError, RtfResult};
use super::lexer::{Lexer, Token, TokenKind};
use log::{debug, trace};
use phf::phf_map;
use serde::{Deserialize, Serialize};

/// Token kinds that end a text run in the document body.
const BODY_TEXT_TERMINATORS: &[TokenKind] = &[
    TokenKind::OpenGroup,
    TokenKind::CloseGroup,
    TokenKind::Escape,
];

/// Token kinds that end a font name inside the font table.
const FONT_NAME_TERMINATORS: &[TokenKind] = &[
    TokenKind::OpenGroup,
    TokenKind::CloseGroup,
    TokenKind::Escape,
    TokenKind::Semicolon,
];

/// Single-byte control symbols passed through as [`ControlSymbol`].
const CONTROL_SYMBOLS: &[u8] = b"*~-_|:";

/// Sub-grammar a control word is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grammar {
    CharacterSet,
    FontTable,
    ColorTable,
    ColorComponent,
    TextFormat,
    TextFormatNoArg,
}

static GRAMMARS: phf::Map<&'static str, Grammar> = phf_map! {
    // Character sets
    "ansi" => Grammar::CharacterSet,
    "ansicpg" => Grammar::CharacterSet,
    "mac" => Grammar::CharacterSet,
    "pc" => Grammar::CharacterSet,
    "pca" => Grammar::CharacterSet,
    "fbidis" => Grammar::CharacterSet,

    // Tables
    "fonttbl" => Grammar::FontTable,
    "colortbl" => Grammar::ColorTable,
    "red" => Grammar::ColorComponent,
    "green" => Grammar::ColorComponent,
    "blue" => Grammar::ColorComponent,
    "alpha" => Grammar::ColorComponent,

    // Formatting with a numeric argument
    "cf" => Grammar::TextFormat,
    "f" => Grammar::TextFormat,
    "fs" => Grammar::TextFormat,
    "li" => Grammar::TextFormat,
    "fi" => Grammar::TextFormat,

    // Formatting without argument
    "pard" => Grammar::TextFormatNoArg,
    "par" => Grammar::TextFormatNoArg,
    "b" => Grammar::TextFormatNoArg,
    "i" => Grammar::TextFormatNoArg,
    "strike" => Grammar::TextFormatNoArg,
    "ql" => Grammar::TextFormatNoArg,
    "qc" => Grammar::TextFormatNoArg,
    "qj" => Grammar::TextFormatNoArg,
    "qr" => Grammar::TextFormatNoArg,
};

static CHARACTER_SETS: phf::Map<&'static str, CharacterSetKind> = phf_map! {
    "ansi" => CharacterSetKind::Ansi,
    "ansicpg" => CharacterSetKind::AnsiCodePage,
    "mac" => CharacterSetKind::Mac,
    "pc" => CharacterSetKind::Pc,
    "pca" => CharacterSetKind::Pca,
    "fbidis" => CharacterSetKind::Fbidis,
};

static TEXT_FORMATS: phf::Map<&'static str, TextFormatKind> = phf_map! {
    "cf" => TextFormatKind::Color,
    "i" => TextFormatKind::Italic,
    "strike" => TextFormatKind::Strike,
    "f" => TextFormatKind::FontIndex,
    "fs" => TextFormatKind::FontSize,
    "b" => TextFormatKind::FontWeightBold,
    "ql" => TextFormatKind::AlignLeft,
    "qc" => TextFormatKind::AlignCenter,
    "qj" => TextFormatKind::AlignJustify,
    "qr" => TextFormatKind::AlignRight,
    "li" => TextFormatKind::LeftIndent,
    "fi" => TextFormatKind::FirstLineIndent,
    "pard" => TextFormatKind::ParagraphClear,
    "par" => TextFormatKind::ParagraphEnd,
};

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Maximum group nesting depth before the parse is rejected
    pub max_group_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_group_depth: 512,
        }
    }
}

/// Control word names are ASCII letters, so this never loses information.
#[inline]
fn word_str<'t>(token: &Token<'t>) -> &'t str {
    std::str::from_utf8(token.text).unwrap_or_default()
}

/// Convert a `NumberRun` token to an integer of the requested width.
fn parse_number<T: TryFrom<i64>>(token: &Token<'_>) -> RtfResult<T> {
    atoi_simd::parse::<i64, true, false>(token.text)
        .ok()
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| RtfError::InvalidNumber(token.into()))
}

/// RTF entity parser.
pub struct Parser<'a> {
    /// Token source
    lexer: Lexer<'a>,
    /// Most recently consumed token
    current: Token<'a>,
    /// Current group nesting depth
    depth: usize,
    /// Parsed entities, in document order
    entities: Vec<Entity<'a>>,
    options: ParseOptions,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default options.
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    /// Create a new parser.
    pub fn with_options(input: &'a [u8], options: ParseOptions) -> Self {
        // Zero-length placeholder until the first token is consumed
        let current = Token {
            kind: TokenKind::Eof,
            text: &input[..0],
            start: 0,
            end: 0,
        };
        Self {
            lexer: Lexer::new(input),
            current,
            depth: 0,
            entities: Vec::new(),
            options,
        }
    }

    /// Parse the whole input into an entity sequence.
    pub fn parse(mut self) -> RtfResult<Vec<Entity<'a>>> {
        loop {
            let token = self.consume();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::OpenGroup | TokenKind::CloseGroup => {
                    let group = self.parse_control_group(token)?;
                    self.entities.push(Entity::ControlGroup(group));
                },
                TokenKind::Escape => self.parse_escape()?,
                TokenKind::StringRun
                | TokenKind::NumberRun
                | TokenKind::Whitespace
                | TokenKind::Invalid
                | TokenKind::Semicolon => {
                    let text = self.parse_text(token, BODY_TEXT_TERMINATORS);
                    self.entities.push(Entity::Text(text));
                },
                // Line breaks in the source carry no meaning
                TokenKind::Newline => {},
            }
        }

        debug!(
            "parsed {} entities from {} bytes",
            self.entities.len(),
            self.lexer.input().len()
        );
        Ok(self.entities)
    }

    /// Advance to the next token.
    #[inline]
    fn consume(&mut self) -> Token<'a> {
        self.current = self.lexer.next_token();
        self.current
    }

    /// Consume the next token, requiring it to be of `kind`.
    fn expect_next(&mut self, kind: TokenKind) -> RtfResult<Token<'a>> {
        let token = self.consume();
        if token.kind != kind {
            return Err(RtfError::unexpected(kind, &token));
        }
        Ok(token)
    }

    /// Require the most recently consumed token to be of `kind`.
    fn expect(&self, kind: TokenKind) -> RtfResult<Token<'a>> {
        if self.current.kind != kind {
            return Err(RtfError::unexpected(kind, &self.current));
        }
        Ok(self.current)
    }

    /// Consume whitespace and line breaks that only format the source.
    fn skip_blank(&mut self) {
        while self.lexer.peek().is_blank() {
            self.consume();
        }
    }

    fn parse_control_group(&mut self, token: Token<'a>) -> RtfResult<ControlGroup<'a>> {
        let kind = if token.kind == TokenKind::OpenGroup {
            self.depth += 1;
            if self.depth > self.options.max_group_depth {
                return Err(RtfError::NestingTooDeep {
                    limit: self.options.max_group_depth,
                    token: token.into(),
                });
            }
            GroupKind::Begin
        } else {
            if self.depth == 0 {
                return Err(RtfError::UnbalancedGroup(token.into()));
            }
            self.depth -= 1;
            GroupKind::End
        };

        Ok(ControlGroup { kind, token })
    }

    /// Parse whatever follows an escape character.
    fn parse_escape(&mut self) -> RtfResult<()> {
        let next = self.consume();
        let entity = match next.kind {
            TokenKind::StringRun => {
                let entity = self.parse_control_word(next)?;
                self.entities.push(entity);
                self.parse_delimiter();
                return Ok(());
            },
            // Escaped literals: \\ \{ \}
            TokenKind::Escape | TokenKind::OpenGroup | TokenKind::CloseGroup => {
                Entity::Text(Text::new(next))
            },
            // A backslash before a line break is a paragraph mark
            TokenKind::Newline => Entity::TextFormat(TextFormat {
                word: next,
                kind: TextFormatKind::ParagraphEnd,
                arg: TextFormat::NO_ARG,
            }),
            TokenKind::Invalid if CONTROL_SYMBOLS.contains(&next.text[0]) => {
                Entity::ControlSymbol(ControlSymbol { symbol: next })
            },
            _ => return Err(RtfError::unexpected(TokenKind::StringRun, &next)),
        };

        self.entities.push(entity);
        Ok(())
    }

    /// Dispatch a control word to its grammar.
    fn parse_control_word(&mut self, word: Token<'a>) -> RtfResult<Entity<'a>> {
        let Some(grammar) = GRAMMARS.get(word_str(&word)).copied() else {
            let arg = self.parse_optional_arg()?;
            trace!("generic control word {} (arg {:?})", word.as_str(), arg);
            return Ok(Entity::ControlWord(ControlWord { name: word, arg }));
        };

        match grammar {
            Grammar::CharacterSet => self.parse_character_set(word),
            Grammar::FontTable => self.parse_font_table(word),
            Grammar::ColorTable => self.parse_color_table(word),
            Grammar::ColorComponent => {
                let channel = Channel::from_word(word.text)
                    .ok_or_else(|| RtfError::UnexpectedControlWord(word.into()))?;
                self.parse_color_component(word, channel)
                    .map(Entity::ColorComponent)
            },
            Grammar::TextFormat => self.parse_text_format(word),
            Grammar::TextFormatNoArg => self.parse_text_format_no_arg(word),
        }
    }

    /// Swallow the space that terminates a control word.
    ///
    /// Any spaces after the first one are text and start a new run.
    fn parse_delimiter(&mut self) {
        let next = self.lexer.peek();
        if next.kind != TokenKind::Whitespace {
            return;
        }
        self.consume();
        if next.len() > 1 {
            let text = self.parse_text(next.without_delimiter(), BODY_TEXT_TERMINATORS);
            self.entities.push(Entity::Text(text));
        }
    }

    /// Accumulate a text run starting at `first`.
    fn parse_text(&mut self, first: Token<'a>, terminators: &[TokenKind]) -> Text<'a> {
        let mut text = Text::new(first);
        loop {
            let next = self.lexer.peek();
            if next.kind == TokenKind::Eof || terminators.contains(&next.kind) {
                break;
            }
            self.consume();
            text.tokens.push(next);
        }
        text
    }

    /// Optional signed numeric parameter of a control word.
    fn parse_optional_arg(&mut self) -> RtfResult<Option<i32>> {
        let next = self.lexer.peek();
        if next.is_minus() && self.lexer.peek_ahead(1).kind == TokenKind::NumberRun {
            self.consume();
            let number = self.consume();
            return parse_number::<i32>(&number).map(|n| Some(-n));
        }
        if next.kind == TokenKind::NumberRun {
            let number = self.consume();
            return parse_number::<i32>(&number).map(Some);
        }
        Ok(None)
    }

    fn parse_character_set(&mut self, word: Token<'a>) -> RtfResult<Entity<'a>> {
        let kind = CHARACTER_SETS
            .get(word_str(&word))
            .copied()
            .ok_or_else(|| RtfError::UnknownCharacterSet(word.into()))?;

        let code_page = if kind == CharacterSetKind::AnsiCodePage {
            let number = self.expect_next(TokenKind::NumberRun)?;
            Some(parse_number::<u32>(&number)?)
        } else {
            None
        };

        Ok(Entity::CharacterSet(CharacterSet {
            word,
            kind,
            code_page,
        }))
    }

    /// Parse `\fonttbl` up to (not including) its closing brace.
    fn parse_font_table(&mut self, word: Token<'a>) -> RtfResult<Entity<'a>> {
        let mut entries = Vec::new();

        loop {
            self.skip_blank();
            match self.lexer.peek().kind {
                TokenKind::OpenGroup => {
                    self.consume();
                    entries.push(self.parse_font_table_entry(true)?);
                },
                // Single font written without its own group
                TokenKind::Escape => entries.push(self.parse_font_table_entry(false)?),
                _ => break,
            }
        }

        debug!("font table with {} entries", entries.len());
        Ok(Entity::FontTable(FontTable { word, entries }))
    }

    fn parse_font_table_entry(&mut self, braced: bool) -> RtfResult<FontTableEntry<'a>> {
        let mut entry = FontTableEntry::default();

        loop {
            let token = self.consume();
            if token.is_blank() {
                continue;
            }
            match token.kind {
                TokenKind::Semicolon => break,
                TokenKind::StringRun | TokenKind::NumberRun | TokenKind::Invalid => {
                    entry.name = Some(self.parse_text(token, FONT_NAME_TERMINATORS));
                    continue;
                },
                _ => {},
            }

            self.expect(TokenKind::Escape)?;
            let word = self.expect_next(TokenKind::StringRun)?;

            match word.text {
                b"f" => {
                    let number = self.expect_next(TokenKind::NumberRun)?;
                    entry.index = parse_number(&number)?;
                },
                b"fcharset" => {
                    let number = self.expect_next(TokenKind::NumberRun)?;
                    entry.charset = parse_number(&number)?;
                },
                b"fprq" => {
                    let number = self.expect_next(TokenKind::NumberRun)?;
                    entry.pitch = Some(parse_number(&number)?);
                },
                b"fnil" => {
                    entry.is_default_fallback = true;
                    entry.family = FontFamily::Nil;
                },
                other => {
                    entry.family = FontFamily::from_word(other)
                        .ok_or_else(|| RtfError::UnexpectedControlWord(word.into()))?;
                },
            }
        }

        if braced {
            self.expect_next(TokenKind::CloseGroup)?;
        }

        Ok(entry)
    }

    /// Parse `\colortbl` up to (not including) its closing brace.
    fn parse_color_table(&mut self, word: Token<'a>) -> RtfResult<Entity<'a>> {
        let mut entries = Vec::new();

        loop {
            let next = self.lexer.peek();
            match next.kind {
                TokenKind::CloseGroup => break,
                TokenKind::Semicolon => {
                    self.consume();
                },
                _ if next.is_blank() => {
                    self.consume();
                },
                TokenKind::Escape => entries.push(self.parse_color_table_entry()?),
                _ => return Err(RtfError::unexpected(TokenKind::CloseGroup, &next)),
            }
        }

        debug!("color table with {} entries", entries.len());
        Ok(Entity::ColorTable(ColorTable { word, entries }))
    }

    fn parse_color_table_entry(&mut self) -> RtfResult<ColorTableEntry<'a>> {
        let mut entry = ColorTableEntry::default();

        for _ in 0..entry.channels.len() {
            self.skip_blank();
            if self.lexer.peek().kind == TokenKind::Semicolon {
                break;
            }

            self.expect_next(TokenKind::Escape)?;
            let word = self.expect_next(TokenKind::StringRun)?;
            let channel = Channel::from_word(word.text)
                .ok_or_else(|| RtfError::UnexpectedControlWord(word.into()))?;
            entry.channels[channel.slot()] = Some(self.parse_color_component(word, channel)?);
        }

        Ok(entry)
    }

    fn parse_color_component(
        &mut self,
        word: Token<'a>,
        channel: Channel,
    ) -> RtfResult<ColorComponent<'a>> {
        let number = self.expect_next(TokenKind::NumberRun)?;
        let value = parse_number::<i64>(&number)?;
        let value = u8::try_from(value).map_err(|_| RtfError::ColorOutOfRange(number.into()))?;

        Ok(ColorComponent {
            word,
            channel,
            value,
        })
    }

    fn text_format_kind(word: &Token<'a>) -> RtfResult<TextFormatKind> {
        TEXT_FORMATS
            .get(word_str(word))
            .copied()
            .ok_or_else(|| RtfError::UnknownTextFormat(word.into()))
    }

    fn parse_text_format(&mut self, word: Token<'a>) -> RtfResult<Entity<'a>> {
        let kind = Self::text_format_kind(&word)?;

        let mut next = self.consume();
        let negate = next.is_minus();
        if negate {
            next = self.consume();
        }
        self.expect(TokenKind::NumberRun)?;

        let value = parse_number::<i32>(&next)?;
        let arg = if negate { -value } else { value };

        Ok(Entity::TextFormat(TextFormat { word, kind, arg }))
    }

    fn parse_text_format_no_arg(&mut self, word: Token<'a>) -> RtfResult<Entity<'a>> {
        let kind = Self::text_format_kind(&word)?;

        let mut format = TextFormat {
            word,
            kind,
            arg: TextFormat::NO_ARG,
        };

        // Toggles may be switched off explicitly: \b0, \i0, \strike0
        if matches!(
            kind,
            TextFormatKind::Italic | TextFormatKind::Strike | TextFormatKind::FontWeightBold
        ) && self.lexer.peek().kind == TokenKind::NumberRun
        {
            let number = self.consume();
            format.arg = parse_number(&number)?;
        }

        Ok(Entity::TextFormat(format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Vec<Entity<'_>> {
        Parser::new(input.as_bytes()).parse().unwrap()
    }

    fn parse_err(input: &str) -> RtfError {
        Parser::new(input.as_bytes()).parse().unwrap_err()
    }

    fn text_of(entity: &Entity<'_>) -> String {
        match entity {
            Entity::Text(text) => String::from_utf8(text.raw().into_owned()).unwrap(),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_groups_and_text() {
        let entities = parse("{abc {de f}}");
        assert_eq!(entities.len(), 6);
        assert!(matches!(
            entities[0],
            Entity::ControlGroup(ControlGroup { kind: GroupKind::Begin, .. })
        ));
        assert_eq!(text_of(&entities[1]), "abc ");
        assert_eq!(text_of(&entities[3]), "de f");
        assert!(matches!(
            entities[5],
            Entity::ControlGroup(ControlGroup { kind: GroupKind::End, .. })
        ));
    }

    #[test]
    fn test_character_sets() {
        let entities = parse(r"\ansi\ansicpg1251\mac");
        let sets: Vec<_> = entities
            .iter()
            .map(|e| match e {
                Entity::CharacterSet(set) => (set.kind, set.code_page),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            sets,
            vec![
                (CharacterSetKind::Ansi, None),
                (CharacterSetKind::AnsiCodePage, Some(1251)),
                (CharacterSetKind::Mac, None),
            ]
        );
    }

    #[test]
    fn test_ansicpg_requires_number() {
        let err = parse_err(r"\ansicpg x");
        assert!(matches!(
            err,
            RtfError::UnexpectedToken { expected: TokenKind::NumberRun, .. }
        ));
        assert_eq!(err.token().start, 8);
    }

    #[test]
    fn test_font_table() {
        let entities =
            parse(r"{\fonttbl{\f0\fnil\fcharset0 Calibri;}{\f1\froman\fprq2 Times New Roman;}}");
        let Entity::FontTable(table) = &entities[1] else {
            panic!("expected font table, got {:?}", entities[1]);
        };
        assert_eq!(table.entries.len(), 2);

        let calibri = &table.entries[0];
        assert_eq!(calibri.index, 0);
        assert_eq!(calibri.charset, 0);
        assert!(calibri.is_default_fallback);
        assert_eq!(calibri.name.as_ref().unwrap().raw().as_ref(), b"Calibri");

        let times = &table.entries[1];
        assert_eq!(times.index, 1);
        assert_eq!(times.family, FontFamily::Roman);
        assert_eq!(times.pitch, Some(2));
        assert!(!times.is_default_fallback);
        assert_eq!(times.name.as_ref().unwrap().raw().as_ref(), b"Times New Roman");

        assert!(matches!(
            entities[2],
            Entity::ControlGroup(ControlGroup { kind: GroupKind::End, .. })
        ));
        assert_eq!(entities.len(), 3);
    }

    #[test]
    fn test_unbraced_font_entry() {
        let entities = parse(r"{\fonttbl\f3\fswiss Helvetica;}");
        let Entity::FontTable(table) = &entities[1] else {
            panic!("expected font table");
        };
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.entries[0].index, 3);
        assert_eq!(table.entries[0].family, FontFamily::Swiss);
    }

    #[test]
    fn test_font_entry_rejects_unknown_word() {
        let err = parse_err(r"{\fonttbl{\f0\bogus Arial;}}");
        assert!(matches!(err, RtfError::UnexpectedControlWord(ref t) if t.text == "bogus"));
    }

    #[test]
    fn test_font_entry_requires_close_group() {
        let err = parse_err(r"{\fonttbl{\f0 Arial;");
        assert!(matches!(
            err,
            RtfError::UnexpectedToken { expected: TokenKind::CloseGroup, .. }
        ));
    }

    #[test]
    fn test_color_table() {
        let entities = parse(r"{\colortbl;\red255\green0\blue0;\red1\green2\blue3\alpha4;}");
        let Entity::ColorTable(table) = &entities[1] else {
            panic!("expected color table");
        };
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[0].resolve(), crate::common::Rgba::new(255, 0, 0, 255));
        assert_eq!(table.entries[1].resolve(), crate::common::Rgba::new(1, 2, 3, 4));
        assert!(table.entries[0].channels[Channel::Alpha.slot()].is_none());
    }

    #[test]
    fn test_color_table_places_channels_by_name() {
        let entities = parse("{\\colortbl;\\blue9 \\red7;\n}");
        let Entity::ColorTable(table) = &entities[1] else {
            panic!("expected color table");
        };
        assert_eq!(table.entries[0].resolve(), crate::common::Rgba::new(7, 0, 9, 255));
    }

    #[test]
    fn test_color_component_range() {
        let err = parse_err(r"{\colortbl;\red256;}");
        assert!(matches!(err, RtfError::ColorOutOfRange(ref t) if t.text == "256"));
    }

    #[test]
    fn test_color_table_unterminated() {
        let err = parse_err(r"{\colortbl;\red1;");
        assert!(matches!(
            err,
            RtfError::UnexpectedToken { expected: TokenKind::CloseGroup, .. }
        ));
    }

    #[test]
    fn test_tables_with_crlf_line_breaks() {
        let entities = parse("{\\colortbl;\r\n\\red255\\green0\\blue0;\r\n\\red1\r\n\\green2;\r\n}");
        let Entity::ColorTable(table) = &entities[1] else {
            panic!("expected color table, got {:?}", entities[1]);
        };
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[1].resolve(), crate::common::Rgba::new(1, 2, 0, 255));

        let entities =
            parse("{\\fonttbl\r\n{\\f0\\fnil Calibri;}\r\n{\\f1\\froman\r\n Times;}\r\n}");
        let Entity::FontTable(table) = &entities[1] else {
            panic!("expected font table, got {:?}", entities[1]);
        };
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[1].index, 1);
        assert_eq!(table.entries[1].name.as_ref().unwrap().raw().as_ref(), b"Times");
        assert_eq!(entities.len(), 3);
    }

    #[test]
    fn test_leading_zeros_in_arguments() {
        let entities = parse(r"\fs0000000000000000000024");
        assert!(matches!(
            entities[0],
            Entity::TextFormat(TextFormat { kind: TextFormatKind::FontSize, arg: 24, .. })
        ));
    }

    #[test]
    fn test_text_format_arguments() {
        let entities = parse(r"\li-360\fs24\b\b0\par");
        let formats: Vec<_> = entities
            .iter()
            .map(|e| match e {
                Entity::TextFormat(f) => (f.kind, f.arg),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(
            formats,
            vec![
                (TextFormatKind::LeftIndent, -360),
                (TextFormatKind::FontSize, 24),
                (TextFormatKind::FontWeightBold, TextFormat::NO_ARG),
                (TextFormatKind::FontWeightBold, 0),
                (TextFormatKind::ParagraphEnd, TextFormat::NO_ARG),
            ]
        );
    }

    #[test]
    fn test_text_format_requires_number() {
        let err = parse_err(r"\cf\par");
        assert!(matches!(
            err,
            RtfError::UnexpectedToken { expected: TokenKind::NumberRun, .. }
        ));
    }

    #[test]
    fn test_integer_overflow() {
        let err = parse_err(r"\fs99999999999");
        assert!(matches!(err, RtfError::InvalidNumber(_)));
    }

    #[test]
    fn test_generic_control_word_takes_argument() {
        let entities = parse(r"{\rtf1\deff0 Hi}");
        let Entity::ControlWord(rtf) = &entities[1] else {
            panic!("expected control word");
        };
        assert!(rtf.name.is("rtf"));
        assert_eq!(rtf.arg, Some(1));
        let Entity::ControlWord(deff) = &entities[2] else {
            panic!("expected control word");
        };
        assert_eq!(deff.arg, Some(0));
        assert_eq!(text_of(&entities[3]), "Hi");
    }

    #[test]
    fn test_delimiter_space_is_consumed() {
        let entities = parse(r"\cf1 Hello\par");
        assert_eq!(entities.len(), 3);
        assert_eq!(text_of(&entities[1]), "Hello");

        // Only the first space delimits the word
        let entities = parse(r"\b   x");
        assert_eq!(text_of(&entities[1]), "  x");
        let Entity::Text(text) = &entities[1] else { unreachable!() };
        assert_eq!(text.tokens[0].start, 3);
    }

    #[test]
    fn test_escaped_literals_and_symbols() {
        let entities = parse(r"{\*\generator x}\{\}\\");
        assert!(matches!(entities[1], Entity::ControlSymbol(_)));
        assert!(matches!(entities[2], Entity::ControlWord(_)));
        assert_eq!(text_of(&entities[3]), "x");
        assert_eq!(text_of(&entities[5]), "{");
        assert_eq!(text_of(&entities[6]), "}");
        assert_eq!(text_of(&entities[7]), "\\");
    }

    #[test]
    fn test_escape_requires_word() {
        let err = parse_err(r"\'e9");
        assert!(matches!(
            err,
            RtfError::UnexpectedToken { expected: TokenKind::StringRun, ref found }
                if found.text == "'" && found.start == 1
        ));
    }

    #[test]
    fn test_unbalanced_close_group() {
        let err = parse_err("{a}}");
        assert!(matches!(err, RtfError::UnbalancedGroup(ref t) if t.start == 3));
    }

    #[test]
    fn test_nesting_limit() {
        let options = ParseOptions { max_group_depth: 2 };
        assert!(Parser::with_options(b"{{}}", options.clone()).parse().is_ok());
        let err = Parser::with_options(b"{{{}}}", options).parse().unwrap_err();
        assert!(matches!(err, RtfError::NestingTooDeep { limit: 2, .. }));
    }

    #[test]
    fn test_text_runs_skip_newlines_at_top_level() {
        let entities = parse("\n\nab\ncd");
        assert_eq!(entities.len(), 1);
        assert_eq!(text_of(&entities[0]), "ab\ncd");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Balanced documents made only of groups and plain words.
        fn balanced_doc() -> impl Strategy<Value = String> {
            "[a-z0-9]{1,6}( [a-z]{1,4})?".prop_recursive(4, 32, 4, |inner| {
                prop::collection::vec(inner, 1..4)
                    .prop_map(|parts| format!("{{{}}}", parts.join("{}")))
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            #[test]
            fn prop_balanced_groups_stay_balanced(doc in balanced_doc()) {
                let entities = Parser::new(doc.as_bytes()).parse().unwrap();

                let begins = entities.iter().filter(|e| matches!(
                    e, Entity::ControlGroup(ControlGroup { kind: GroupKind::Begin, .. })
                )).count();
                let ends = entities.iter().filter(|e| matches!(
                    e, Entity::ControlGroup(ControlGroup { kind: GroupKind::End, .. })
                )).count();
                prop_assert_eq!(begins, ends);

                // One entity per brace plus one per maximal run of text
                let braces = doc.bytes().filter(|b| matches!(b, b'{' | b'}')).count();
                let runs = doc
                    .split(['{', '}'])
                    .filter(|s| !s.is_empty())
                    .count();
                prop_assert_eq!(entities.len(), braces + runs);
            }
        }
    }
}
