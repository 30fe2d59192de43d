use crate::math::Point2;

/// Whether the area directly above and below a segment is filled.
///
/// `None` means the side has not been classified yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentFill {
    pub above: Option<bool>,
    pub below: Option<bool>,
}

impl SegmentFill {
    /// A fully resolved fill.
    #[must_use]
    pub fn new(above: bool, below: bool) -> Self {
        Self {
            above: Some(above),
            below: Some(below),
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.above.is_some() && self.below.is_some()
    }
}

/// A directed edge with fill annotations, oriented from the sweep-earlier
/// point to the sweep-later one.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
    /// Fill relative to the polygon the segment came from.
    pub my_fill: SegmentFill,
    /// Fill relative to the other operand, set while combining.
    pub other_fill: Option<SegmentFill>,
}

impl Segment {
    #[must_use]
    pub fn new(start: Point2, end: Point2) -> Self {
        Self {
            start,
            end,
            my_fill: SegmentFill::default(),
            other_fill: None,
        }
    }

    /// A segment over `start -> end` carrying `template`'s own fill.
    #[must_use]
    pub fn copy_with(start: Point2, end: Point2, template: &Segment) -> Self {
        Self {
            start,
            end,
            my_fill: template.my_fill,
            other_fill: None,
        }
    }
}
