//! Atomic document edits.

use smol_str::SmolStr;

use crate::document::Document;
use crate::error::TransformError;
use crate::mapping::StepMap;
use crate::mark::{Mark, MarkType};
use crate::text::TextBuffer;

/// One atomic edit. Steps are the unit that transactions record and that
/// plugins inspect to find out what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Replace `from..to` with `text`, which carries exactly `marks`.
    Replace {
        from: usize,
        to: usize,
        text: SmolStr,
        marks: Vec<Mark>,
    },
    /// Apply `mark` to `from..to`.
    AddMark { from: usize, to: usize, mark: Mark },
    /// Remove `mark` from `from..to`.
    RemoveMark { from: usize, to: usize, mark: Mark },
}

impl Step {
    /// Apply to `doc`, producing the new document.
    pub fn apply(&self, doc: &Document) -> Result<Document, TransformError> {
        match self {
            Step::Replace {
                from,
                to,
                text,
                marks,
            } => {
                doc.check_range(*from, *to)?;
                let mut rope = doc.text().clone();
                let mut mark_set = doc.marks().clone();
                rope.replace(*from..*to, text);
                mark_set.replace(*from..*to, text.chars().count(), marks);
                Ok(Document::with_parts(rope, mark_set))
            }
            Step::AddMark { from, to, mark } => {
                doc.check_range(*from, *to)?;
                let mut mark_set = doc.marks().clone();
                mark_set.add(*from..*to, mark.clone());
                Ok(Document::with_parts(doc.text().clone(), mark_set))
            }
            Step::RemoveMark { from, to, mark } => {
                doc.check_range(*from, *to)?;
                let mut mark_set = doc.marks().clone();
                mark_set.remove(*from..*to, mark);
                Ok(Document::with_parts(doc.text().clone(), mark_set))
            }
        }
    }

    /// How this step moves positions.
    pub fn get_map(&self) -> StepMap {
        match self {
            Step::Replace { from, to, text, .. } => {
                StepMap::new(*from, to - from, text.chars().count())
            }
            Step::AddMark { .. } | Step::RemoveMark { .. } => StepMap::identity(),
        }
    }

    /// The mark type touched by an add/remove mark step.
    pub fn mark_type(&self) -> Option<&MarkType> {
        match self {
            Step::AddMark { mark, .. } | Step::RemoveMark { mark, .. } => Some(&mark.ty),
            Step::Replace { .. } => None,
        }
    }

    /// Whether applying this step to `doc` moves the edges of a run of `ty`
    /// in a way position mapping cannot follow.
    ///
    /// Mark steps of `ty` always do. A replace does when its text carries a
    /// mark of `ty` or when its range reaches into a run of `ty`. Inserting
    /// plain text exactly at a run's edge only shifts the run.
    pub fn changes_mark(&self, doc: &Document, ty: &MarkType) -> bool {
        match self {
            Step::AddMark { .. } | Step::RemoveMark { .. } => self.mark_type() == Some(ty),
            Step::Replace { from, to, marks, .. } => {
                if marks.iter().any(|mark| mark.is_type(ty)) {
                    return true;
                }
                if from == to {
                    doc.mark_range(*from, ty).is_some_and(|range| range.start < *from)
                } else {
                    doc.has_mark_in(*from, *to, ty)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Assoc;

    fn math() -> Mark {
        Mark::new(MarkType::MATH)
    }

    #[test]
    fn test_replace_step() {
        let doc = Document::from_parts("x $a$ y", [(2..5, math())]).unwrap();
        let step = Step::Replace {
            from: 0,
            to: 1,
            text: "xyz".into(),
            marks: vec![],
        };
        let next = step.apply(&doc).unwrap();
        assert_eq!(next.content(), "xyz $a$ y");
        assert_eq!(next.mark_range(4, &MarkType::MATH), Some(4..7));
        assert_eq!(step.get_map().map(5, Assoc::After), 7);
        assert_eq!(step.mark_type(), None);
    }

    #[test]
    fn test_mark_steps_keep_positions() {
        let doc = Document::new("x $a$ y");
        let add = Step::AddMark {
            from: 2,
            to: 5,
            mark: math(),
        };
        let marked = add.apply(&doc).unwrap();
        assert_eq!(marked.mark_range(3, &MarkType::MATH), Some(2..5));
        assert!(add.get_map().is_identity());
        assert_eq!(add.mark_type(), Some(&MarkType::MATH));

        let remove = Step::RemoveMark {
            from: 2,
            to: 5,
            mark: math(),
        };
        let unmarked = remove.apply(&marked).unwrap();
        assert!(unmarked.marks().is_empty());
        assert!(remove.changes_mark(&marked, &MarkType::MATH));
        assert!(!remove.changes_mark(&marked, &MarkType::new("em")));
    }

    #[test]
    fn test_replace_changes_mark() {
        // "x $ab$ y", math on 2..6
        let doc = Document::from_parts("x $ab$ y", [(2..6, math())]).unwrap();
        let replace = |from, to, marks: Vec<Mark>| Step::Replace {
            from,
            to,
            text: "q".into(),
            marks,
        };
        let ty = &MarkType::MATH;

        // Plain text next to the run, or at its edges, only shifts it.
        assert!(!replace(0, 1, vec![]).changes_mark(&doc, ty));
        assert!(!replace(2, 2, vec![]).changes_mark(&doc, ty));
        assert!(!replace(6, 6, vec![]).changes_mark(&doc, ty));

        // Cutting into the run, splitting it, or inserting math does not.
        assert!(replace(1, 3, vec![]).changes_mark(&doc, ty));
        assert!(replace(4, 4, vec![]).changes_mark(&doc, ty));
        assert!(replace(7, 7, vec![math()]).changes_mark(&doc, ty));
    }

    #[test]
    fn test_step_out_of_range() {
        let doc = Document::new("abc");
        let step = Step::Replace {
            from: 2,
            to: 8,
            text: SmolStr::default(),
            marks: vec![],
        };
        assert_eq!(
            step.apply(&doc).unwrap_err(),
            TransformError::PositionOutOfRange { pos: 8, len: 3 }
        );
    }
}
