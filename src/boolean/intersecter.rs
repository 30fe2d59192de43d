//! Sweep-line intersection and fill classification.
//!
//! Events are kept in a sorted linked list, the segments crossing the sweep
//! line in a second one ordered bottom to top. Whenever two segments become
//! neighbours in the status list they are tested for intersection and split
//! so that the output contains no crossings, only shared endpoints.

use std::cmp::Ordering;

use slotmap::new_key_type;

use crate::error::BooleanError;
use crate::math::{Along, Epsilon, Point2};

use super::list::LinkedList;
use super::segment::{Segment, SegmentFill};

new_key_type! {
    struct EventId;
    struct StatusId;
}

#[derive(Debug, Clone, Copy)]
struct Event {
    is_start: bool,
    pt: Point2,
    seg: usize,
    primary: bool,
    other: EventId,
    status: Option<StatusId>,
}

/// Which pass of the engine the sweep runs for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    /// Resolve one polygon's own crossings and compute `my_fill`.
    SelfIntersection,
    /// Merge two resolved operands and compute `other_fill`.
    Combine,
}

pub(crate) struct Intersecter {
    pass: Pass,
    eps: Epsilon,
    segs: Vec<Segment>,
    events: LinkedList<EventId, Event>,
    status: LinkedList<StatusId, EventId>,
}

impl Intersecter {
    pub(crate) fn new(pass: Pass, eps: Epsilon) -> Self {
        Self {
            pass,
            eps,
            segs: Vec::new(),
            events: LinkedList::new(),
            status: LinkedList::new(),
        }
    }

    /// Adds every edge of a closed region, skipping zero-length edges.
    pub(crate) fn add_region(&mut self, region: &[Point2]) {
        let Some(&last) = region.last() else {
            return;
        };
        let mut pt2 = last;
        for &pt in region {
            let pt1 = pt2;
            pt2 = pt;
            match self.eps.points_compare(&pt1, &pt2) {
                Ordering::Equal => {}
                Ordering::Less => self.add_segment(Segment::new(pt1, pt2), true),
                Ordering::Greater => self.add_segment(Segment::new(pt2, pt1), true),
            }
        }
    }

    /// Queues an already oriented segment.
    pub(crate) fn add_segment(&mut self, seg: Segment, primary: bool) {
        let (start, end) = (seg.start, seg.end);
        let index = self.segs.len();
        self.segs.push(seg);

        let ev_start = self.events.alloc(Event {
            is_start: true,
            pt: start,
            seg: index,
            primary,
            other: EventId::default(),
            status: None,
        });
        self.event_add(ev_start, end);

        let ev_end = self.events.alloc(Event {
            is_start: false,
            pt: end,
            seg: index,
            primary,
            other: ev_start,
            status: None,
        });
        self.events[ev_start].other = ev_end;
        self.event_add(ev_end, start);
    }

    /// Sweep order of two events; `p1_other` / `p2_other` are the opposite
    /// ends of their segments.
    fn event_compare(
        &self,
        p1_is_start: bool,
        p1: &Point2,
        p1_other: &Point2,
        p2_is_start: bool,
        p2: &Point2,
        p2_other: &Point2,
    ) -> Ordering {
        let comp = self.eps.points_compare(p1, p2);
        if comp != Ordering::Equal {
            return comp;
        }
        if self.eps.points_same(p1_other, p2_other) {
            return Ordering::Equal;
        }
        if p1_is_start != p2_is_start {
            return if p1_is_start {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
        let (left, right) = if p2_is_start {
            (p2, p2_other)
        } else {
            (p2_other, p2)
        };
        if self.eps.point_above_or_on_line(p1_other, left, right) {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }

    fn event_add(&mut self, id: EventId, other_pt: Point2) {
        let ev = self.events[id];
        let at = self.events.find_transition(|_, here| {
            let here_other = self.events[here.other].pt;
            self.event_compare(ev.is_start, &ev.pt, &other_pt, here.is_start, &here.pt, &here_other)
                == Ordering::Less
        });
        self.events.insert_at(id, at);
    }

    /// Moves the end of `id`'s segment to `end` and re-sorts its end event.
    fn event_update_end(&mut self, id: EventId, end: Point2) {
        let ev = self.events[id];
        self.events.unlink(ev.other);
        self.segs[ev.seg].end = end;
        self.events[ev.other].pt = end;
        self.event_add(ev.other, ev.pt);
    }

    /// Splits the segment of `id` at `pt`.
    fn event_divide(&mut self, id: EventId, pt: Point2) {
        let ev = self.events[id];
        let tail = Segment::copy_with(pt, self.segs[ev.seg].end, &self.segs[ev.seg]);
        self.event_update_end(id, pt);
        self.add_segment(tail, ev.primary);
    }

    /// `true` if `ev1`'s segment sorts above `ev2`'s in the status list.
    fn status_above(&self, ev1: EventId, ev2: EventId) -> bool {
        let a = &self.segs[self.events[ev1].seg];
        let b = &self.segs[self.events[ev2].seg];
        let (a1, a2, b1, b2) = (&a.start, &a.end, &b.start, &b.end);
        if self.eps.points_collinear(a1, b1, b2) {
            if self.eps.points_collinear(a2, b1, b2) {
                return true;
            }
            return self.eps.point_above_or_on_line(a2, b1, b2);
        }
        self.eps.point_above_or_on_line(a1, b1, b2)
    }

    /// Tests two neighbouring segments and splits them where they meet.
    ///
    /// Returns `ev2` when both segments turn out to be the same segment.
    fn check_intersection(&mut self, ev1: EventId, ev2: EventId) -> Option<EventId> {
        let seg1 = &self.segs[self.events[ev1].seg];
        let seg2 = &self.segs[self.events[ev2].seg];
        let (a1, a2, b1, b2) = (seg1.start, seg1.end, seg2.start, seg2.end);
        let eps = self.eps;

        let Some(i) = eps.lines_intersect(&a1, &a2, &b1, &b2) else {
            // parallel: only coincident segments matter
            if !eps.points_collinear(&a1, &a2, &b1) {
                return None;
            }
            if eps.points_same(&a1, &b2) || eps.points_same(&a2, &b1) {
                return None;
            }
            let a1_equ_b1 = eps.points_same(&a1, &b1);
            let a2_equ_b2 = eps.points_same(&a2, &b2);
            if a1_equ_b1 && a2_equ_b2 {
                return Some(ev2);
            }
            let a1_between = !a1_equ_b1 && eps.point_between(&a1, &b1, &b2);
            let a2_between = !a2_equ_b2 && eps.point_between(&a2, &b1, &b2);
            if a1_equ_b1 {
                if a2_between {
                    self.event_divide(ev2, a2);
                } else {
                    self.event_divide(ev1, b2);
                }
                return Some(ev2);
            } else if a1_between {
                if !a2_equ_b2 {
                    if a2_between {
                        self.event_divide(ev2, a2);
                    } else {
                        self.event_divide(ev1, b2);
                    }
                }
                self.event_divide(ev2, a1);
            }
            return None;
        };

        if i.along_a == Along::Inside {
            match i.along_b {
                Along::AtStart => self.event_divide(ev1, b1),
                Along::Inside => self.event_divide(ev1, i.point),
                Along::AtEnd => self.event_divide(ev1, b2),
                Along::Before | Along::After => {}
            }
        }
        if i.along_b == Along::Inside {
            match i.along_a {
                Along::AtStart => self.event_divide(ev2, a1),
                Along::Inside => self.event_divide(ev2, i.point),
                Along::AtEnd => self.event_divide(ev2, a2),
                Along::Before | Along::After => {}
            }
        }
        None
    }

    fn toggles(fill: SegmentFill) -> bool {
        match fill.below {
            None => true,
            Some(below) => fill.above != Some(below),
        }
    }

    /// Runs the sweep and returns the split, annotated segments.
    pub(crate) fn calculate(mut self) -> Result<Vec<Segment>, BooleanError> {
        let mut out = Vec::new();

        while let Some(head) = self.events.head() {
            let ev = self.events[head];

            if ev.is_start {
                let surrounding = self
                    .status
                    .find_transition(|_, &here| self.status_above(head, here));
                let above = surrounding.before.map(|s| self.status[s]);
                let below = surrounding.after.map(|s| self.status[s]);

                let mut eve = None;
                if let Some(above) = above {
                    eve = self.check_intersection(head, above);
                }
                if eve.is_none() {
                    if let Some(below) = below {
                        eve = self.check_intersection(head, below);
                    }
                }

                if let Some(eve) = eve {
                    // same segment already in the status list: merge fills
                    let eve_seg = self.events[eve].seg;
                    match self.pass {
                        Pass::SelfIntersection => {
                            if Self::toggles(self.segs[ev.seg].my_fill) {
                                let fill = &mut self.segs[eve_seg].my_fill;
                                fill.above = fill.above.map(|a| !a);
                            }
                        }
                        Pass::Combine => {
                            self.segs[eve_seg].other_fill = Some(self.segs[ev.seg].my_fill);
                        }
                    }
                    self.events.unlink(ev.other);
                    self.events.unlink(head);
                }

                if self.events.head() != Some(head) {
                    continue;
                }

                match self.pass {
                    Pass::SelfIntersection => {
                        let toggle = Self::toggles(self.segs[ev.seg].my_fill);
                        let below_fill = match below {
                            None => false,
                            Some(b) => self.segs[self.events[b].seg]
                                .my_fill
                                .above
                                .ok_or(BooleanError::UnresolvedFill)?,
                        };
                        let above_fill = if toggle { !below_fill } else { below_fill };
                        self.segs[ev.seg].my_fill = SegmentFill::new(above_fill, below_fill);
                    }
                    Pass::Combine => {
                        if self.segs[ev.seg].other_fill.is_none() {
                            let inside = match below {
                                None => false,
                                Some(b) => {
                                    let below_ev = self.events[b];
                                    let below_seg = &self.segs[below_ev.seg];
                                    let fill = if ev.primary == below_ev.primary {
                                        below_seg.other_fill.and_then(|f| f.above)
                                    } else {
                                        below_seg.my_fill.above
                                    };
                                    fill.ok_or(BooleanError::UnresolvedFill)?
                                }
                            };
                            self.segs[ev.seg].other_fill = Some(SegmentFill::new(inside, inside));
                        }
                    }
                }

                let node = self.status.alloc(head);
                self.status.insert_at(node, surrounding);
                self.events[ev.other].status = Some(node);
            } else {
                let Some(st) = ev.status else {
                    return Err(BooleanError::ZeroLengthSegment);
                };
                if let (Some(prev), Some(next)) = (self.status.prev(st), self.status.next(st)) {
                    let (prev_ev, next_ev) = (self.status[prev], self.status[next]);
                    self.check_intersection(prev_ev, next_ev);
                }
                self.status.unlink(st);

                let seg = &mut self.segs[ev.seg];
                if !ev.primary {
                    // combined output reports the primary operand in my_fill
                    if let Some(other) = seg.other_fill {
                        seg.other_fill = Some(seg.my_fill);
                        seg.my_fill = other;
                    }
                }
                out.push(seg.clone());
            }

            self.events.unlink(head);
        }

        Ok(out)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn self_pass(region: &[Point2]) -> Vec<Segment> {
        let mut i = Intersecter::new(Pass::SelfIntersection, Epsilon::default());
        i.add_region(region);
        i.calculate().unwrap()
    }

    #[test]
    fn square_edges_get_consistent_fill() {
        let segs = self_pass(&[p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)]);
        assert_eq!(segs.len(), 4);
        for s in &segs {
            assert!(s.my_fill.is_resolved());
            // exactly one side of every boundary edge is filled
            assert_ne!(s.my_fill.above, s.my_fill.below);
            if s.start.y == 0.0 && s.end.y == 0.0 {
                assert_eq!(s.my_fill.above, Some(true));
            }
            if s.start.y == 1.0 && s.end.y == 1.0 {
                assert_eq!(s.my_fill.below, Some(true));
            }
        }
    }

    #[test]
    fn bow_tie_is_split_at_crossing() {
        let segs = self_pass(&[p(0.0, 0.0), p(2.0, 2.0), p(2.0, 0.0), p(0.0, 2.0)]);
        // the two diagonals are cut at (1, 1)
        assert_eq!(segs.len(), 6);
        let eps = Epsilon::default();
        let touching = segs
            .iter()
            .filter(|s| eps.points_same(&s.start, &p(1.0, 1.0)) || eps.points_same(&s.end, &p(1.0, 1.0)))
            .count();
        assert_eq!(touching, 4);
    }

    #[test]
    fn duplicate_region_cancels_out() {
        let sq = [p(0.0, 0.0), p(1.0, 0.0), p(1.0, 1.0), p(0.0, 1.0)];
        let mut i = Intersecter::new(Pass::SelfIntersection, Epsilon::default());
        i.add_region(&sq);
        i.add_region(&sq);
        let segs = i.calculate().unwrap();
        // even-odd: the doubled square has the same fill on both sides
        assert!(segs.iter().all(|s| s.my_fill.above == s.my_fill.below));
    }
}
