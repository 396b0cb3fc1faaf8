//! Semantic entities produced by the parser.
//!
//! The parser flattens the nested group structure of a document into a single
//! ordered sequence: nesting survives only as interleaved
//! [`GroupKind::Begin`]/[`GroupKind::End`] markers, and the layout engine
//! rebuilds scoping from them.

use super::lexer::Token;
use crate::common::Rgba;
use crate::common::encoding::codepage_to_encoding;
use encoding_rs::Encoding;
use smallvec::SmallVec;
use std::borrow::Cow;

/// A semantic unit of the document, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity<'a> {
    /// `{` or `}`
    ControlGroup(ControlGroup<'a>),
    /// Control word without a specialized grammar
    ControlWord(ControlWord<'a>),
    /// Escape followed by a single non-letter byte (`\*`, `\~`, ...)
    ControlSymbol(ControlSymbol<'a>),
    /// Document character set declaration
    CharacterSet(CharacterSet<'a>),
    /// `\fonttbl` destination
    FontTable(FontTable<'a>),
    /// `\colortbl` destination
    ColorTable(ColorTable<'a>),
    /// Color channel word outside of a color table
    ColorComponent(ColorComponent<'a>),
    /// Character or paragraph formatting command
    TextFormat(TextFormat<'a>),
    /// Run of literal text
    Text(Text<'a>),
}

impl<'a> Entity<'a> {
    /// The token the entity starts at.
    pub fn token(&self) -> Token<'a> {
        match self {
            Entity::ControlGroup(e) => e.token,
            Entity::ControlWord(e) => e.name,
            Entity::ControlSymbol(e) => e.symbol,
            Entity::CharacterSet(e) => e.word,
            Entity::FontTable(e) => e.word,
            Entity::ColorTable(e) => e.word,
            Entity::ColorComponent(e) => e.word,
            Entity::TextFormat(e) => e.word,
            Entity::Text(e) => e.tokens[0],
        }
    }
}

/// Group boundary direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Opening brace
    Begin,
    /// Closing brace
    End,
}

/// Structural nesting marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlGroup<'a> {
    pub kind: GroupKind,
    pub token: Token<'a>,
}

/// Unrecognized control word with its optional numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlWord<'a> {
    pub name: Token<'a>,
    pub arg: Option<i32>,
}

/// Control symbol such as `\*` (ignorable destination) or `\~`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSymbol<'a> {
    pub symbol: Token<'a>,
}

/// Character set families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterSetKind {
    /// `\ansi`
    Ansi,
    /// `\ansicpg<N>`
    AnsiCodePage,
    /// `\mac`
    Mac,
    /// `\pc` (code page 437)
    Pc,
    /// `\pca` (code page 850)
    Pca,
    /// `\fbidis`
    Fbidis,
}

/// Document character set declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterSet<'a> {
    pub word: Token<'a>,
    pub kind: CharacterSetKind,
    /// Only present for [`CharacterSetKind::AnsiCodePage`]
    pub code_page: Option<u32>,
}

impl CharacterSet<'_> {
    /// Text encoding implied by the declaration, if it names one.
    pub fn encoding(&self) -> Option<&'static Encoding> {
        match self.kind {
            CharacterSetKind::Ansi => Some(encoding_rs::WINDOWS_1252),
            CharacterSetKind::AnsiCodePage => self.code_page.and_then(codepage_to_encoding),
            CharacterSetKind::Mac => Some(encoding_rs::MACINTOSH),
            CharacterSetKind::Pc => codepage_to_encoding(437),
            CharacterSetKind::Pca => codepage_to_encoding(850),
            CharacterSetKind::Fbidis => None,
        }
    }
}

/// Font family categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum FontFamily {
    /// Nil (unknown or default)
    #[default]
    Nil,
    /// Roman (serif) fonts
    Roman,
    /// Swiss (sans-serif) fonts
    Swiss,
    /// Modern (monospace) fonts
    Modern,
    /// Script fonts
    Script,
    /// Decorative fonts
    Decor,
    /// Technical, symbol, and mathematical fonts
    Tech,
    /// Arabic, Hebrew and other bidirectional fonts
    Bidi,
}

impl FontFamily {
    /// Family selected by a font table control word, e.g. `fswiss`.
    pub fn from_word(word: &[u8]) -> Option<Self> {
        Some(match word {
            b"fnil" => FontFamily::Nil,
            b"froman" => FontFamily::Roman,
            b"fswiss" => FontFamily::Swiss,
            b"fmodern" => FontFamily::Modern,
            b"fscript" => FontFamily::Script,
            b"fdecor" => FontFamily::Decor,
            b"ftech" => FontFamily::Tech,
            b"fbidi" => FontFamily::Bidi,
            _ => return None,
        })
    }
}

/// `\fonttbl` with its entries in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FontTable<'a> {
    pub word: Token<'a>,
    pub entries: Vec<FontTableEntry<'a>>,
}

/// A single font definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FontTableEntry<'a> {
    /// Display name, without the terminating semicolon
    pub name: Option<Text<'a>>,
    /// Key used by `\f<N>` references
    pub index: u16,
    /// Windows character set id
    pub charset: u8,
    /// Set by `\fnil`
    pub is_default_fallback: bool,
    pub family: FontFamily,
    /// `\fprq` pitch, if given
    pub pitch: Option<u8>,
}

impl Default for FontTableEntry<'_> {
    fn default() -> Self {
        Self {
            name: None,
            index: 0,
            charset: 0,
            is_default_fallback: false,
            family: FontFamily::Nil,
            pitch: None,
        }
    }
}

/// `\colortbl` with its non-empty entries in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable<'a> {
    pub word: Token<'a>,
    pub entries: Vec<ColorTableEntry<'a>>,
}

/// Color channel named by a color table word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
    Alpha = 3,
}

impl Channel {
    /// Channel for a control word name, e.g. `red`.
    pub fn from_word(word: &[u8]) -> Option<Self> {
        match word {
            b"red" => Some(Channel::Red),
            b"green" => Some(Channel::Green),
            b"blue" => Some(Channel::Blue),
            b"alpha" => Some(Channel::Alpha),
            _ => None,
        }
    }

    /// Slot of the channel in [`ColorTableEntry::channels`].
    #[inline]
    pub const fn slot(self) -> usize {
        self as usize
    }
}

/// One color channel assignment, e.g. `\red255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorComponent<'a> {
    pub word: Token<'a>,
    pub channel: Channel,
    pub value: u8,
}

/// One color definition. Slots are R, G, B, Alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorTableEntry<'a> {
    pub channels: [Option<ColorComponent<'a>>; 4],
}

impl ColorTableEntry<'_> {
    /// Resolve to a concrete color. Missing RGB channels are 0, a missing
    /// alpha channel is fully opaque.
    pub fn resolve(&self) -> Rgba {
        let value = |channel: Channel, default: u8| {
            self.channels[channel.slot()].map_or(default, |c| c.value)
        };
        Rgba::new(
            value(Channel::Red, 0),
            value(Channel::Green, 0),
            value(Channel::Blue, 0),
            value(Channel::Alpha, u8::MAX),
        )
    }
}

/// Formatting commands understood by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextFormatKind {
    /// `\cf<N>`: color table reference (1-based)
    Color,
    /// `\i`
    Italic,
    /// `\strike`
    Strike,
    /// `\f<N>`: font table reference
    FontIndex,
    /// `\fs<N>`: size in half-points
    FontSize,
    /// `\b`
    FontWeightBold,
    /// `\ql`
    AlignLeft,
    /// `\qc`
    AlignCenter,
    /// `\qj`
    AlignJustify,
    /// `\qr`
    AlignRight,
    /// `\li<N>`: twips
    LeftIndent,
    /// `\fi<N>`: twips
    FirstLineIndent,
    /// `\pard`
    ParagraphClear,
    /// `\par`
    ParagraphEnd,
}

/// A formatting command with its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormat<'a> {
    pub word: Token<'a>,
    pub kind: TextFormatKind,
    /// [`TextFormat::NO_ARG`] when the word carries no number
    pub arg: i32,
}

impl TextFormat<'_> {
    /// Argument sentinel for commands written without a number.
    pub const NO_ARG: i32 = -1;

    /// Whether the command is a toggle switched off explicitly (`\b0`).
    #[inline]
    pub fn is_toggle_off(&self) -> bool {
        matches!(
            self.kind,
            TextFormatKind::Italic | TextFormatKind::Strike | TextFormatKind::FontWeightBold
        ) && self.arg == 0
    }
}

/// A maximal run of content tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text<'a> {
    /// Never empty
    pub tokens: SmallVec<[Token<'a>; 4]>,
}

impl<'a> Text<'a> {
    /// Start a run with its first token.
    #[inline]
    pub fn new(first: Token<'a>) -> Self {
        let mut tokens = SmallVec::new();
        tokens.push(first);
        Self { tokens }
    }

    /// Raw bytes of the run.
    ///
    /// Borrowed when the run is a single token.
    pub fn raw(&self) -> Cow<'a, [u8]> {
        match self.tokens.as_slice() {
            [only] => Cow::Borrowed(only.text),
            tokens => Cow::Owned(tokens.iter().flat_map(|t| t.text.iter().copied()).collect()),
        }
    }

    /// Raw bytes of the run with line breaks removed.
    ///
    /// RTF writers wrap long lines freely; `\n` and `\r` are never content.
    pub fn content(&self) -> Cow<'a, [u8]> {
        let raw = self.raw();
        if raw.iter().any(|&b| b == b'\n' || b == b'\r') {
            Cow::Owned(raw.iter().copied().filter(|&b| b != b'\n' && b != b'\r').collect())
        } else {
            raw
        }
    }
}
