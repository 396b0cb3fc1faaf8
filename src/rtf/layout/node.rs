//! Layout tree produced by the layout engine.

use super::format::FormatRecord;
use serde::Serialize;

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LayoutNode {
    Paragraph(Paragraph),
    Text(TextNode),
}

impl LayoutNode {
    /// Resolved format of the node.
    pub fn format(&self) -> &FormatRecord {
        match self {
            LayoutNode::Paragraph(paragraph) => &paragraph.format,
            LayoutNode::Text(text) => &text.format,
        }
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            LayoutNode::Paragraph(paragraph) => Some(paragraph),
            LayoutNode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            LayoutNode::Text(text) => Some(text),
            LayoutNode::Paragraph(_) => None,
        }
    }
}

/// A paragraph with its ordered children.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Paragraph {
    /// Format frozen when the paragraph ended
    pub format: FormatRecord,
    pub children: Vec<LayoutNode>,
}

impl Paragraph {
    /// Text children, skipping nested paragraphs.
    pub fn texts(&self) -> impl Iterator<Item = &TextNode> {
        self.children.iter().filter_map(LayoutNode::as_text)
    }
}

/// A run of text with the format in effect where it appeared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextNode {
    pub format: FormatRecord,
    pub value: String,
}

/// The layout of a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutForest {
    /// Top-level nodes in document order
    pub roots: Vec<LayoutNode>,
}

impl LayoutForest {
    /// Whether the document produced no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Every paragraph, depth first in document order.
    pub fn paragraphs(&self) -> Vec<&Paragraph> {
        let mut out = Vec::new();
        let mut stack: Vec<&LayoutNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            if let LayoutNode::Paragraph(paragraph) = node {
                out.push(paragraph);
                stack.extend(paragraph.children.iter().rev());
            }
        }
        out
    }

    /// Plain text of the document, one line per paragraph.
    ///
    /// A nested paragraph starts a new line and the text of its parent
    /// continues on another one after it.
    pub fn text(&self) -> String {
        enum Step<'n> {
            Node(&'n LayoutNode),
            Break,
        }

        let mut out = String::new();
        let mut stack: Vec<Step<'_>> = self.roots.iter().rev().map(Step::Node).collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Node(LayoutNode::Text(text)) => out.push_str(&text.value),
                Step::Node(LayoutNode::Paragraph(paragraph)) => {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    stack.push(Step::Break);
                    stack.extend(paragraph.children.iter().rev().map(Step::Node));
                },
                Step::Break => {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                },
            }
        }

        if out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> LayoutNode {
        LayoutNode::Text(TextNode {
            format: FormatRecord::default(),
            value: value.to_string(),
        })
    }

    fn paragraph(children: Vec<LayoutNode>) -> LayoutNode {
        LayoutNode::Paragraph(Paragraph {
            format: FormatRecord::default(),
            children,
        })
    }

    #[test]
    fn test_plain_text_lines() {
        let forest = LayoutForest {
            roots: vec![
                paragraph(vec![text("Hello"), text(" world")]),
                paragraph(vec![text("a"), paragraph(vec![text("b")]), text("c")]),
                paragraph(vec![]),
            ],
        };
        assert_eq!(forest.text(), "Hello world\na\nb\nc");
    }

    #[test]
    fn test_paragraphs_in_document_order() {
        let forest = LayoutForest {
            roots: vec![
                paragraph(vec![text("a"), paragraph(vec![text("b")])]),
                paragraph(vec![text("c")]),
            ],
        };
        let firsts: Vec<_> = forest
            .paragraphs()
            .iter()
            .map(|p| p.texts().next().map(|t| t.value.as_str()))
            .collect();
        assert_eq!(firsts, vec![Some("a"), Some("b"), Some("c")]);
    }

    #[test]
    fn test_node_accessors() {
        let node = text("x");
        assert!(node.as_paragraph().is_none());
        assert_eq!(node.as_text().map(|t| t.value.as_str()), Some("x"));
        assert!(node.format().is_empty());
        assert!(LayoutForest::default().is_empty());
    }
}
