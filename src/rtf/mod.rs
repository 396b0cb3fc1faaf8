//! RTF (Rich Text Format) layout module.
//!
//! This module turns a subset of RTF into a tree of paragraphs and text runs
//! whose formatting is fully resolved: table references are looked up, scoped
//! formatting is unwound at group boundaries, and composable properties are
//! merged across nested scopes.
//!
//! # Architecture
//!
//! The pipeline has three single-pass stages:
//! - **Lexer**: splits raw bytes into byte-span tokens, never failing
//! - **Parser**: dispatches control words to their grammars and flattens the
//!   document into an ordered entity sequence
//! - **Layout**: replays the entities against a scope-aware format stack and
//!   builds the paragraph/text forest
//!
//! # Example
//!
//! ```rust
//! use rtflayout::rtf::RtfDocument;
//!
//! let rtf = br"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}\f0\pard Hello World!\par}";
//! let doc = RtfDocument::parse(rtf)?;
//! assert_eq!(doc.text(), "Hello World!");
//! # Ok::<(), rtflayout::rtf::RtfError>(())
//! ```

mod document;
pub mod entity;
mod error;
pub mod layout;
pub mod lexer;
mod parser;

// Re-exports
pub use document::RtfDocument;
pub use entity::Entity;
pub use error::{RtfError, RtfResult, TokenSpan};
pub use layout::{
    LayoutBuilder, LayoutForest, LayoutNode, LayoutOptions, Paragraph, TextNode, build_layout,
    build_layout_with,
};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{ParseOptions, Parser};

/// Parse a document into its entity sequence with default options.
///
/// Entities borrow from `input`. The first error aborts the parse.
#[inline]
pub fn parse(input: &[u8]) -> RtfResult<Vec<Entity<'_>>> {
    Parser::new(input).parse()
}

/// Parse a document into its entity sequence.
#[inline]
pub fn parse_with<'a>(input: &'a [u8], options: &ParseOptions) -> RtfResult<Vec<Entity<'a>>> {
    Parser::with_options(input, options.clone()).parse()
}
