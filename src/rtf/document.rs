//! RTF document representation.

use super::error::RtfResult;
use super::layout::{LayoutBuilder, LayoutForest, LayoutNode, LayoutOptions, Paragraph, TextNode};
use super::parser::{ParseOptions, Parser};
use log::debug;

/// RTF Document.
///
/// This is the main entry point for turning RTF bytes into a laid-out
/// document. It runs the whole pipeline eagerly and owns the resulting
/// [`LayoutForest`], so it does not borrow the input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RtfDocument {
    layout: LayoutForest,
}

impl RtfDocument {
    /// Parse an RTF document with default options.
    ///
    /// # Examples
    ///
    /// ```
    /// use rtflayout::rtf::RtfDocument;
    ///
    /// let doc = RtfDocument::parse(br"{\rtf1\ansi\pard Hello World!\par}")?;
    /// assert_eq!(doc.text(), "Hello World!");
    /// # Ok::<(), rtflayout::rtf::RtfError>(())
    /// ```
    pub fn parse(input: &[u8]) -> RtfResult<Self> {
        Self::parse_with(input, &ParseOptions::default(), &LayoutOptions::default())
    }

    /// Parse an RTF document.
    pub fn parse_with(
        input: &[u8],
        parse_options: &ParseOptions,
        layout_options: &LayoutOptions,
    ) -> RtfResult<Self> {
        let entities = Parser::with_options(input, parse_options.clone()).parse()?;
        let layout = LayoutBuilder::new(layout_options.clone()).build(entities);
        debug!("document laid out into {} root nodes", layout.roots.len());
        Ok(Self { layout })
    }

    /// The layout tree.
    #[inline]
    pub fn layout(&self) -> &LayoutForest {
        &self.layout
    }

    /// Take ownership of the layout tree.
    #[inline]
    pub fn into_layout(self) -> LayoutForest {
        self.layout
    }

    /// Plain text, one line per paragraph.
    pub fn text(&self) -> String {
        self.layout.text()
    }

    /// Every paragraph, nested ones included, in document order.
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        self.layout.paragraphs()
    }

    /// Get the number of paragraphs in the document.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().len()
    }

    /// Every text run in document order.
    pub fn runs(&self) -> Vec<&TextNode> {
        self.paragraphs()
            .into_iter()
            .flat_map(|paragraph| paragraph.children.iter())
            .filter_map(LayoutNode::as_text)
            .collect()
    }
}
