//! Format operations and their resolution into fixed-shape records.
//!
//! The layout engine pushes one [`FormatOp`] per formatting command onto a
//! scope-aware stack. [`FormatRecord::resolve`] collapses that stack into one
//! value per [`FormatKind`]: the most recent operation wins, except for
//! composable kinds, where older operations are merged in.

use crate::common::Rgba;
use crate::common::unit::{half_points_to_points, twips_to_points};
use crate::rtf::entity::FontFamily;
use bitflags::bitflags;
use serde::Serialize;

/// Slot of a [`FormatRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormatKind {
    Color,
    Font,
    FontSize,
    FontWeight,
    TextStyle,
    TextAlign,
    TextIndent,
}

impl FormatKind {
    /// Number of format kinds.
    pub const COUNT: usize = 7;

    /// Every kind, in slot order.
    pub const ALL: [FormatKind; Self::COUNT] = [
        FormatKind::Color,
        FormatKind::Font,
        FormatKind::FontSize,
        FormatKind::FontWeight,
        FormatKind::TextStyle,
        FormatKind::TextAlign,
        FormatKind::TextIndent,
    ];

    /// Whether older operations of this kind accumulate into newer ones
    /// instead of being overridden.
    #[inline]
    pub const fn is_composable(self) -> bool {
        matches!(self, FormatKind::TextStyle | FormatKind::TextIndent)
    }

    #[inline]
    const fn slot(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Independent character style bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
    #[serde(transparent)]
    pub struct TextStyle: u8 {
        const ITALIC = 1;
        const STRIKE = 1 << 1;
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Paragraph alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Justify,
    Right,
}

/// Font size in half-points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FontSize(pub i32);

impl FontSize {
    /// Size in points.
    #[inline]
    pub fn points(self) -> f32 {
        half_points_to_points(self.0)
    }
}

/// Paragraph indentation in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextIndent {
    /// Left indent of every line
    pub value: i32,
    /// Extra indent of the first line, relative to `value`
    pub first_line_offset: i32,
}

impl TextIndent {
    /// Left indent in points.
    #[inline]
    pub fn value_points(&self) -> f32 {
        twips_to_points(self.value)
    }

    /// First line offset in points.
    #[inline]
    pub fn first_line_points(&self) -> f32 {
        twips_to_points(self.first_line_offset)
    }
}

/// A font resolved from the document's font table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Font {
    pub index: u16,
    pub name: String,
    pub family: FontFamily,
    pub charset: u8,
    pub is_default_fallback: bool,
}

/// A single pending formatting operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FormatOp {
    Color(Rgba),
    Font(Font),
    FontSize(FontSize),
    FontWeight(FontWeight),
    TextStyle(TextStyle),
    TextAlign(TextAlign),
    TextIndent(TextIndent),
}

impl FormatOp {
    /// The record slot this operation fills.
    pub fn kind(&self) -> FormatKind {
        match self {
            FormatOp::Color(_) => FormatKind::Color,
            FormatOp::Font(_) => FormatKind::Font,
            FormatOp::FontSize(_) => FormatKind::FontSize,
            FormatOp::FontWeight(_) => FormatKind::FontWeight,
            FormatOp::TextStyle(_) => FormatKind::TextStyle,
            FormatOp::TextAlign(_) => FormatKind::TextAlign,
            FormatOp::TextIndent(_) => FormatKind::TextIndent,
        }
    }

    /// Fold an older operation of the same composable kind into this one.
    ///
    /// Style bits are OR-ed, indents are summed component-wise. Anything else
    /// leaves `self` untouched.
    pub fn merge(&mut self, older: &FormatOp) {
        match (self, older) {
            (FormatOp::TextStyle(style), FormatOp::TextStyle(other)) => *style |= *other,
            (FormatOp::TextIndent(indent), FormatOp::TextIndent(other)) => {
                indent.value = indent.value.saturating_add(other.value);
                indent.first_line_offset =
                    indent.first_line_offset.saturating_add(other.first_line_offset);
            },
            _ => {},
        }
    }
}

/// Fully resolved formatting: one optional value per [`FormatKind`].
///
/// An empty slot means "inherit the renderer's default".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormatRecord {
    slots: [Option<FormatOp>; FormatKind::COUNT],
}

impl FormatRecord {
    /// Collapse a format stack (oldest first) into a record.
    pub fn resolve(stack: &[FormatOp]) -> Self {
        let mut record = FormatRecord::default();

        for op in stack.iter().rev() {
            let kind = op.kind();
            match &mut record.slots[kind.slot()] {
                Some(newer) => {
                    if kind.is_composable() {
                        newer.merge(op);
                    }
                },
                empty => *empty = Some(op.clone()),
            }
        }

        record
    }

    /// The operation in the slot for `kind`.
    #[inline]
    pub fn get(&self, kind: FormatKind) -> Option<&FormatOp> {
        self.slots[kind.slot()].as_ref()
    }

    /// All filled slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &FormatOp> {
        self.slots.iter().flatten()
    }

    /// Whether every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn color(&self) -> Option<Rgba> {
        match self.get(FormatKind::Color) {
            Some(FormatOp::Color(color)) => Some(*color),
            _ => None,
        }
    }

    pub fn font(&self) -> Option<&Font> {
        match self.get(FormatKind::Font) {
            Some(FormatOp::Font(font)) => Some(font),
            _ => None,
        }
    }

    pub fn font_size(&self) -> Option<FontSize> {
        match self.get(FormatKind::FontSize) {
            Some(FormatOp::FontSize(size)) => Some(*size),
            _ => None,
        }
    }

    pub fn font_weight(&self) -> Option<FontWeight> {
        match self.get(FormatKind::FontWeight) {
            Some(FormatOp::FontWeight(weight)) => Some(*weight),
            _ => None,
        }
    }

    pub fn text_style(&self) -> Option<TextStyle> {
        match self.get(FormatKind::TextStyle) {
            Some(FormatOp::TextStyle(style)) => Some(*style),
            _ => None,
        }
    }

    pub fn text_align(&self) -> Option<TextAlign> {
        match self.get(FormatKind::TextAlign) {
            Some(FormatOp::TextAlign(align)) => Some(*align),
            _ => None,
        }
    }

    pub fn text_indent(&self) -> Option<TextIndent> {
        match self.get(FormatKind::TextIndent) {
            Some(FormatOp::TextIndent(indent)) => Some(*indent),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indent(value: i32, first_line_offset: i32) -> FormatOp {
        FormatOp::TextIndent(TextIndent {
            value,
            first_line_offset,
        })
    }

    #[test]
    fn test_kinds_match_slots() {
        for (slot, kind) in FormatKind::ALL.iter().enumerate() {
            assert_eq!(kind.slot(), slot);
        }
        let composable: Vec<_> = FormatKind::ALL
            .into_iter()
            .filter(|k| k.is_composable())
            .collect();
        assert_eq!(composable, vec![FormatKind::TextStyle, FormatKind::TextIndent]);
    }

    #[test]
    fn test_closest_wins_for_simple_kinds() {
        let stack = [
            FormatOp::Color(Rgba::opaque(1, 1, 1)),
            FormatOp::FontSize(FontSize(20)),
            FormatOp::Color(Rgba::opaque(2, 2, 2)),
        ];
        let record = FormatRecord::resolve(&stack);
        assert_eq!(record.color(), Some(Rgba::opaque(2, 2, 2)));
        assert_eq!(record.font_size(), Some(FontSize(20)));
        assert_eq!(record.font_weight(), None);
        assert_eq!(record.iter().count(), 2);
    }

    #[test]
    fn test_composable_kinds_accumulate() {
        let stack = [
            indent(100, 0),
            FormatOp::TextStyle(TextStyle::STRIKE),
            indent(50, 25),
            FormatOp::TextStyle(TextStyle::ITALIC),
            FormatOp::TextStyle(TextStyle::ITALIC),
        ];
        let record = FormatRecord::resolve(&stack);
        assert_eq!(
            record.text_indent(),
            Some(TextIndent {
                value: 150,
                first_line_offset: 25
            })
        );
        assert_eq!(record.text_style(), Some(TextStyle::ITALIC | TextStyle::STRIKE));
    }

    #[test]
    fn test_merge_ignores_other_kinds() {
        let mut op = FormatOp::FontWeight(FontWeight::Bold);
        op.merge(&FormatOp::TextStyle(TextStyle::ITALIC));
        assert_eq!(op, FormatOp::FontWeight(FontWeight::Bold));
    }

    #[test]
    fn test_indent_sum_saturates() {
        let record = FormatRecord::resolve(&[indent(i32::MAX, 0), indent(10, 0)]);
        assert_eq!(record.text_indent().map(|i| i.value), Some(i32::MAX));
    }

    #[test]
    fn test_empty_stack() {
        let record = FormatRecord::resolve(&[]);
        assert!(record.is_empty());
        assert_eq!(record, FormatRecord::default());
    }

    #[test]
    fn test_unit_helpers() {
        assert_eq!(FontSize(24).points(), 12.0);
        let indent = TextIndent {
            value: 720,
            first_line_offset: -360,
        };
        assert_eq!(indent.value_points(), 36.0);
        assert_eq!(indent.first_line_points(), -18.0);
    }
}
