use crate::error::BooleanError;

use super::segment::{Segment, SegmentFill};

/// The boolean combination to extract from combined segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Intersect,
    /// Primary minus secondary.
    Difference,
    /// Secondary minus primary.
    DifferenceRev,
    Xor,
}

/// What to do with one segment: drop it, or keep it with its fill on one
/// side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keep {
    Discard,
    FilledAbove,
    FilledBelow,
}

use Keep::{Discard as D, FilledAbove as A, FilledBelow as B};

// Indexed by `above1 << 3 | below1 << 2 | above2 << 1 | below2`.
const UNION: [Keep; 16] = [D, B, A, D, B, B, D, D, A, D, A, D, D, D, D, D];
const INTERSECT: [Keep; 16] = [D, D, D, D, D, B, D, B, D, D, A, A, D, B, A, D];
const DIFFERENCE: [Keep; 16] = [D, D, D, D, B, D, B, D, A, A, D, D, D, A, B, D];
const DIFFERENCE_REV: [Keep; 16] = [D, B, A, D, D, D, A, A, D, B, D, B, D, D, D, D];
const XOR: [Keep; 16] = [D, B, A, D, B, D, D, A, A, D, D, B, D, A, B, D];

impl BooleanOp {
    /// The 16-entry truth table for this operation.
    #[must_use]
    pub fn table(self) -> &'static [Keep; 16] {
        match self {
            Self::Union => &UNION,
            Self::Intersect => &INTERSECT,
            Self::Difference => &DIFFERENCE,
            Self::DifferenceRev => &DIFFERENCE_REV,
            Self::Xor => &XOR,
        }
    }

    /// Decision for one fill combination.
    #[must_use]
    pub fn keep(self, mine: (bool, bool), other: (bool, bool)) -> Keep {
        let index = usize::from(mine.0) << 3
            | usize::from(mine.1) << 2
            | usize::from(other.0) << 1
            | usize::from(other.1);
        self.table()[index]
    }
}

/// Filters combined segments through `op`'s table. Kept segments carry the
/// resulting fill as their own and no other fill.
///
/// # Errors
///
/// Returns `BooleanError::UnresolvedFill` if any segment reaches selection
/// without both fills classified.
pub fn select(segments: &[Segment], op: BooleanOp) -> Result<Vec<Segment>, BooleanError> {
    let mut out = Vec::new();
    for seg in segments {
        let other = seg.other_fill.ok_or(BooleanError::UnresolvedFill)?;
        let (Some(a1), Some(b1), Some(a2), Some(b2)) =
            (seg.my_fill.above, seg.my_fill.below, other.above, other.below)
        else {
            return Err(BooleanError::UnresolvedFill);
        };
        let fill = match op.keep((a1, b1), (a2, b2)) {
            Keep::Discard => continue,
            Keep::FilledAbove => SegmentFill::new(true, false),
            Keep::FilledBelow => SegmentFill::new(false, true),
        };
        out.push(Segment {
            start: seg.start,
            end: seg.end,
            my_fill: fill,
            other_fill: None,
        });
    }
    Ok(out)
}
