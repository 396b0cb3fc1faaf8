//! rtflayout - A Rust library for laying out RTF documents
//!
//! This library turns Rich Text Format input into a tree of paragraphs and
//! text runs, each carrying fully resolved formatting, ready for a renderer.
//!
//! # Features
//!
//! - **Lossless tokenizer**: every input byte belongs to exactly one token
//! - **Table-driven parser**: character sets, font and color tables, and
//!   character/paragraph formatting commands
//! - **Scoped format resolution**: group-aware unwinding, closest-wins
//!   overrides, and accumulation of indents and style bits
//! - **Zero-copy parsing**: tokens and entities borrow from the input
//!
//! # Example
//!
//! ```
//! use rtflayout::rtf::RtfDocument;
//! use rtflayout::rtf::layout::TextIndent;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let doc = RtfDocument::parse(br"\pard\li100\fi50 A\par\pard\li20 B\par")?;
//!
//! for paragraph in doc.paragraphs() {
//!     let indent = paragraph.format.text_indent().unwrap_or_default();
//!     println!("{} twips: {:?}", indent.value, paragraph.texts().next());
//! }
//! assert_eq!(
//!     doc.paragraphs()[0].format.text_indent(),
//!     Some(TextIndent { value: 100, first_line_offset: 50 })
//! );
//! # Ok(())
//! # }
//! ```

/// Shared helpers: colors, units and text encodings
pub mod common;

/// RTF tokenizer, parser and layout engine
pub mod rtf;

// Re-export commonly used types for convenience
pub use rtf::{LayoutForest, LayoutNode, RtfDocument, RtfError, RtfResult};
