//! Position mapping across edits.
//!
//! Each step produces a `StepMap` describing which ranges it replaced. A
//! `Mapping` chains the maps of a whole transaction so positions in the old
//! document can be carried into the new one.

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    /// Stay before inserted content.
    Before,
    /// Move past inserted content.
    #[default]
    After,
}

/// Result of mapping a single position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    /// The mapped position.
    pub pos: usize,
    /// Whether the content on the position's associated side was deleted.
    pub deleted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReplacedRange {
    start: usize,
    old_size: usize,
    new_size: usize,
}

/// Replaced ranges of a single step, in ascending order of old position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepMap {
    ranges: Vec<ReplacedRange>,
}

impl StepMap {
    /// A map that changes nothing (mark steps).
    pub fn identity() -> Self {
        Self::default()
    }

    /// A map replacing `old_size` chars at `start` with `new_size` chars.
    pub fn new(start: usize, old_size: usize, new_size: usize) -> Self {
        if old_size == 0 && new_size == 0 {
            return Self::identity();
        }
        Self {
            ranges: vec![ReplacedRange {
                start,
                old_size,
                new_size,
            }],
        }
    }

    pub fn is_identity(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut diff: isize = 0;
        for range in &self.ranges {
            if range.start > pos {
                break;
            }
            let end = range.start + range.old_size;
            if pos <= end {
                let side = if range.old_size == 0 {
                    assoc
                } else if pos == range.start {
                    Assoc::Before
                } else if pos == end {
                    Assoc::After
                } else {
                    assoc
                };
                let offset = match side {
                    Assoc::Before => 0,
                    Assoc::After => range.new_size as isize,
                };
                let deleted = match assoc {
                    Assoc::Before => pos != range.start,
                    Assoc::After => pos != end,
                };
                return MapResult {
                    pos: (range.start as isize + diff + offset) as usize,
                    deleted,
                };
            }
            diff += range.new_size as isize - range.old_size as isize;
        }
        MapResult {
            pos: (pos as isize + diff) as usize,
            deleted: false,
        }
    }
}

/// The chained step maps of one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    /// Map through every step. The position counts as deleted if any step deleted it.
    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        self.maps.iter().fold(
            MapResult {
                pos,
                deleted: false,
            },
            |acc, map| {
                let next = map.map_result(acc.pos, assoc);
                MapResult {
                    pos: next.pos,
                    deleted: acc.deleted || next.deleted,
                }
            },
        )
    }
}
