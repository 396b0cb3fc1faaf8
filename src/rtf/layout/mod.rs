//! Layout engine: scope-aware format resolution over the entity sequence.
//!
//! The entity sequence is flat. Nesting only survives as group markers, so the
//! engine rebuilds scoping with a stack of pending [`FormatOp`]s and a list of
//! frames recording the stack length at each `{` and `\pard`. Closing a scope
//! truncates the stack back to the frame, which discards everything pushed
//! inside it.
//!
//! Paragraphs live in an arena while the pass runs; a nested paragraph keeps
//! the id of its parent so a closing scope can move the cursor back up. The
//! arena is folded into an owned [`LayoutForest`] at the end.
//!
//! # Examples
//!
//! ```
//! use rtflayout::rtf::{build_layout, parse};
//! use rtflayout::common::Rgba;
//!
//! let entities = parse(br"{\colortbl;\red255\green0\blue0;}\pard\cf1 Hello\par")?;
//! let forest = build_layout(entities);
//!
//! let paragraph = forest.roots[0].as_paragraph().unwrap();
//! assert_eq!(paragraph.format.color(), Some(Rgba::new(255, 0, 0, 255)));
//! assert_eq!(forest.text(), "Hello");
//! # Ok::<(), rtflayout::rtf::RtfError>(())
//! ```

pub mod format;
mod node;

pub use format::{
    Font, FontSize, FontWeight, FormatKind, FormatOp, FormatRecord, TextAlign, TextIndent,
    TextStyle,
};
pub use node::{LayoutForest, LayoutNode, Paragraph, TextNode};

use super::entity::{
    CharacterSet, ColorTable, ControlGroup, ControlSymbol, Entity, FontTable, GroupKind, Text,
    TextFormat, TextFormatKind,
};
use crate::common::Rgba;
use crate::common::encoding::{decode_text, default_encoding};
use encoding_rs::Encoding;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Layout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Keep source line breaks inside text runs instead of dropping them
    pub preserve_newlines: bool,
}

/// Build the layout of a parsed document with default options.
///
/// # Panics
///
/// Panics if `entities` closes more groups than it opens. Sequences returned
/// by a successful [`parse`](super::parse) are always balanced.
#[inline]
pub fn build_layout(entities: Vec<Entity<'_>>) -> LayoutForest {
    LayoutBuilder::new(LayoutOptions::default()).build(entities)
}

/// Build the layout of a parsed document.
///
/// # Panics
///
/// See [`build_layout`].
#[inline]
pub fn build_layout_with(entities: Vec<Entity<'_>>, options: &LayoutOptions) -> LayoutForest {
    LayoutBuilder::new(options.clone()).build(entities)
}

type ParagraphId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Group,
    Paragraph(ParagraphId),
}

/// Scope boundary on the format stack.
#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    /// Stack length when the scope opened
    depth: usize,
}

#[derive(Debug)]
enum Child {
    Paragraph(ParagraphId),
    Text(TextNode),
}

/// Paragraph under construction.
#[derive(Debug)]
struct ParagraphSlot {
    parent: Option<ParagraphId>,
    /// Set once, when the paragraph ends
    format: Option<FormatRecord>,
    children: Vec<Child>,
}

/// Single-use state of one layout pass.
pub struct LayoutBuilder {
    options: LayoutOptions,
    /// Pending format operations, oldest first
    stack: Vec<FormatOp>,
    frames: SmallVec<[Frame; 16]>,
    /// Open groups, independent of frames dropped by a paragraph reset
    group_depth: usize,
    /// Depth of the `{\*...}` destination being skipped, if any
    ignored_depth: Option<usize>,
    fonts: HashMap<u16, Font>,
    colors: Vec<Rgba>,
    paragraphs: Vec<ParagraphSlot>,
    roots: Vec<ParagraphId>,
    current: Option<ParagraphId>,
    encoding: &'static Encoding,
}

impl LayoutBuilder {
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
            frames: SmallVec::new(),
            group_depth: 0,
            ignored_depth: None,
            fonts: HashMap::new(),
            colors: Vec::new(),
            paragraphs: Vec::new(),
            roots: Vec::new(),
            current: None,
            encoding: default_encoding(),
        }
    }

    /// Consume the entity sequence and produce the layout.
    ///
    /// # Panics
    ///
    /// Panics if the sequence closes more groups than it opens.
    pub fn build(mut self, entities: Vec<Entity<'_>>) -> LayoutForest {
        for entity in entities {
            self.apply(entity);
        }
        self.finish()
    }

    fn apply(&mut self, entity: Entity<'_>) {
        if self.ignored_depth.is_some() && !matches!(entity, Entity::ControlGroup(_)) {
            return;
        }

        match entity {
            Entity::ControlGroup(group) => self.apply_group(&group),
            Entity::CharacterSet(set) => self.apply_character_set(&set),
            Entity::FontTable(table) => self.register_fonts(&table),
            Entity::ColorTable(table) => self.register_colors(&table),
            Entity::TextFormat(format) => self.apply_text_format(&format),
            Entity::Text(text) => self.append_text(&text),
            Entity::ControlSymbol(symbol) => self.apply_control_symbol(&symbol),
            Entity::ControlWord(_) | Entity::ColorComponent(_) => {},
        }
    }

    fn apply_group(&mut self, group: &ControlGroup<'_>) {
        match group.kind {
            GroupKind::Begin => {
                self.frames.push(Frame {
                    kind: FrameKind::Group,
                    depth: self.stack.len(),
                });
                self.group_depth += 1;
            },
            GroupKind::End => {
                assert!(
                    self.group_depth > 0,
                    "group closed at byte {} was never opened",
                    group.token.start
                );
                self.group_depth -= 1;
                if self.ignored_depth.is_some_and(|depth| self.group_depth < depth) {
                    self.ignored_depth = None;
                }
                self.close_scope();
            },
        }
    }

    /// `\*` marks the enclosing group as a destination to skip entirely.
    fn apply_control_symbol(&mut self, symbol: &ControlSymbol<'_>) {
        if symbol.symbol.text != b"*" {
            return;
        }
        if self.group_depth == 0 {
            debug!("ignorable marker at byte {} outside any group", symbol.symbol.start);
            return;
        }
        trace!("skipping destination at byte {}", symbol.symbol.start);
        self.ignored_depth = Some(self.group_depth);
    }

    /// Pop frames down to and including the innermost group frame.
    fn close_scope(&mut self) {
        while let Some(frame) = self.frames.pop() {
            match frame.kind {
                FrameKind::Paragraph(id) => self.close_paragraph(id),
                FrameKind::Group => {
                    self.stack.truncate(frame.depth);
                    return;
                },
            }
        }
        // The group frame went away with a paragraph reset
        self.stack.clear();
    }

    fn apply_character_set(&mut self, set: &CharacterSet<'_>) {
        match set.encoding() {
            Some(encoding) => {
                debug!("text encoding set to {}", encoding.name());
                self.encoding = encoding;
            },
            None => debug!(
                "character set {:?} keeps encoding {}",
                set.kind,
                self.encoding.name()
            ),
        }
    }

    fn register_fonts(&mut self, table: &FontTable<'_>) {
        for entry in &table.entries {
            let name = entry
                .name
                .as_ref()
                .map(|name| decode_text(&name.content(), self.encoding).trim().to_string())
                .unwrap_or_default();
            let font = Font {
                index: entry.index,
                name,
                family: entry.family,
                charset: entry.charset,
                is_default_fallback: entry.is_default_fallback,
            };
            if let Some(previous) = self.fonts.insert(entry.index, font) {
                debug!("font {} redefined, was {:?}", entry.index, previous.name);
            }
        }
        trace!("{} fonts registered", self.fonts.len());
    }

    fn register_colors(&mut self, table: &ColorTable<'_>) {
        if !self.colors.is_empty() {
            debug!(
                "color table at byte {} replaces the previous one",
                table.word.start
            );
        }
        self.colors = table.entries.iter().map(|entry| entry.resolve()).collect();
        trace!("{} colors registered", self.colors.len());
    }

    fn apply_text_format(&mut self, format: &TextFormat<'_>) {
        if format.is_toggle_off() {
            trace!("{:?} switched off at byte {}", format.kind, format.word.start);
            return;
        }

        let op = match format.kind {
            TextFormatKind::ParagraphClear => return self.begin_paragraph(),
            TextFormatKind::ParagraphEnd => return self.end_paragraph(format),
            TextFormatKind::Color if format.arg == 0 => {
                trace!("default color at byte {}", format.word.start);
                return;
            },
            TextFormatKind::Color => match self.lookup_color(format.arg) {
                Some(color) => FormatOp::Color(color),
                None => {
                    warn!(
                        "color {} at byte {} is not in the color table",
                        format.arg, format.word.start
                    );
                    return;
                },
            },
            TextFormatKind::FontIndex => {
                let font = u16::try_from(format.arg)
                    .ok()
                    .and_then(|index| self.fonts.get(&index));
                match font {
                    Some(font) => FormatOp::Font(font.clone()),
                    None => {
                        warn!(
                            "font {} at byte {} is not in the font table",
                            format.arg, format.word.start
                        );
                        return;
                    },
                }
            },
            TextFormatKind::FontSize => FormatOp::FontSize(FontSize(format.arg)),
            TextFormatKind::Italic => FormatOp::TextStyle(TextStyle::ITALIC),
            TextFormatKind::Strike => FormatOp::TextStyle(TextStyle::STRIKE),
            TextFormatKind::FontWeightBold => FormatOp::FontWeight(FontWeight::Bold),
            TextFormatKind::AlignLeft => FormatOp::TextAlign(TextAlign::Left),
            TextFormatKind::AlignCenter => FormatOp::TextAlign(TextAlign::Center),
            TextFormatKind::AlignJustify => FormatOp::TextAlign(TextAlign::Justify),
            TextFormatKind::AlignRight => FormatOp::TextAlign(TextAlign::Right),
            TextFormatKind::LeftIndent => FormatOp::TextIndent(TextIndent {
                value: format.arg,
                first_line_offset: 0,
            }),
            TextFormatKind::FirstLineIndent => FormatOp::TextIndent(TextIndent {
                value: 0,
                first_line_offset: format.arg,
            }),
        };

        self.stack.push(op);
    }

    /// Color table references are 1-based; `\cf0` is the default color.
    fn lookup_color(&self, reference: i32) -> Option<Rgba> {
        let index = usize::try_from(reference).ok()?.checked_sub(1)?;
        self.colors.get(index).copied()
    }

    fn begin_paragraph(&mut self) {
        if self.current.is_none() {
            self.stack.clear();
            self.frames.clear();
        }

        let id = self.paragraphs.len();
        self.paragraphs.push(ParagraphSlot {
            parent: self.current,
            format: None,
            children: Vec::new(),
        });
        match self.current {
            Some(parent) => self.paragraphs[parent].children.push(Child::Paragraph(id)),
            None => self.roots.push(id),
        }
        self.frames.push(Frame {
            kind: FrameKind::Paragraph(id),
            depth: self.stack.len(),
        });
        self.current = Some(id);
    }

    fn end_paragraph(&mut self, format: &TextFormat<'_>) {
        let Some(id) = self.current else {
            debug!("paragraph end at byte {} outside any paragraph", format.word.start);
            return;
        };

        self.close_paragraph(id);
        if let Some(frame) = self.frames.last().copied()
            && frame.kind == FrameKind::Paragraph(id)
        {
            self.frames.pop();
            self.stack.truncate(frame.depth);
        }
    }

    /// Freeze the paragraph if it is still open and move the cursor off it.
    fn close_paragraph(&mut self, id: ParagraphId) {
        let slot = &mut self.paragraphs[id];
        if slot.format.is_none() {
            slot.format = Some(FormatRecord::resolve(&self.stack));
        }
        if self.current == Some(id) {
            self.current = slot.parent;
        }
    }

    fn append_text(&mut self, text: &Text<'_>) {
        let Some(id) = self.current else {
            debug!(
                "dropping text at byte {} outside any paragraph",
                text.tokens[0].start
            );
            return;
        };

        let bytes = if self.options.preserve_newlines {
            text.raw()
        } else {
            text.content()
        };
        if bytes.is_empty() {
            return;
        }

        let value = decode_text(&bytes, self.encoding).into_owned();
        self.paragraphs[id].children.push(Child::Text(TextNode {
            format: FormatRecord::resolve(&self.stack),
            value,
        }));
    }

    /// Close what is still open and fold the arena into the forest.
    fn finish(mut self) -> LayoutForest {
        while let Some(id) = self.current {
            debug!("paragraph {} left open at end of input", id);
            self.close_paragraph(id);
        }

        // Children always get higher ids than their parents, so walking the
        // arena backwards finds every child already assembled.
        let mut built: Vec<Option<Paragraph>> =
            std::iter::repeat_with(|| None).take(self.paragraphs.len()).collect();
        for (id, slot) in self.paragraphs.into_iter().enumerate().rev() {
            let children = slot
                .children
                .into_iter()
                .filter_map(|child| match child {
                    Child::Text(text) => Some(LayoutNode::Text(text)),
                    Child::Paragraph(child) => built[child].take().map(LayoutNode::Paragraph),
                })
                .collect();
            built[id] = Some(Paragraph {
                format: slot.format.unwrap_or_default(),
                children,
            });
        }

        let roots = self
            .roots
            .iter()
            .filter_map(|&id| built[id].take().map(LayoutNode::Paragraph))
            .collect();
        LayoutForest { roots }
    }
}
