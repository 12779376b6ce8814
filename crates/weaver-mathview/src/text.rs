//! Text storage for documents.
//!
//! `Document` only needs char-indexed edits and slices from its storage, so
//! that is all `TextBuffer` asks for. `EditorRope` backs it with ropey, whose
//! clones share structure; every step produces a new document from a clone.

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

/// Char-indexed text storage.
///
/// Offsets are Unicode scalar values, the same unit positions use everywhere
/// else in the crate.
pub trait TextBuffer {
    fn len_chars(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    fn insert(&mut self, char_offset: usize, text: &str);

    fn delete(&mut self, char_range: Range<usize>);

    /// Replace `char_range` with `text`. Empty ranges are plain inserts.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        if !char_range.is_empty() {
            self.delete(char_range.clone());
        }
        if !text.is_empty() {
            self.insert(char_range.start, text);
        }
    }

    /// Slice as SmolStr, or None when the range is inverted or past the end.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    fn to_string(&self) -> String;
}

/// Ropey-backed document text.
#[derive(Clone, Debug, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
}

impl EditorRope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
        }
    }
}

impl TextBuffer for EditorRope {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.rope.insert(char_offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        self.rope.remove(char_range);
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.start > char_range.end || char_range.end > self.len_chars() {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn to_string(&self) -> String {
        self.rope.to_string()
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}
