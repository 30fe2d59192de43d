use tracing::warn;

use crate::math::{Epsilon, Point2};

use super::segment::Segment;

#[derive(Debug, Clone, Copy)]
struct Match {
    index: usize,
    matches_head: bool,
    matches_pt1: bool,
}

/// Joins selected segments head-to-tail into closed regions.
///
/// Intermediate points that are collinear with their neighbours are dropped
/// as chains grow, so a straight run of split segments comes back as one
/// edge. Open chains left over at the end are discarded.
pub struct SegmentChainer {
    eps: Epsilon,
    chains: Vec<Vec<Point2>>,
    regions: Vec<Vec<Point2>>,
}

impl SegmentChainer {
    #[must_use]
    pub fn new(eps: Epsilon) -> Self {
        Self {
            eps,
            chains: Vec::new(),
            regions: Vec::new(),
        }
    }

    /// Chains all segments and returns the closed regions.
    #[must_use]
    pub fn chain(mut self, segments: &[Segment]) -> Vec<Vec<Point2>> {
        for seg in segments {
            self.add(seg.start, seg.end);
        }
        if !self.chains.is_empty() {
            warn!(open = self.chains.len(), "discarding open chains");
        }
        self.regions.retain(|r| r.len() >= 3);
        self.regions
    }

    fn add(&mut self, pt1: Point2, pt2: Point2) {
        let eps = self.eps;
        if eps.points_same(&pt1, &pt2) {
            warn!("zero-length segment skipped while chaining; epsilon may be badly chosen");
            return;
        }

        let mut matches: Vec<Match> = Vec::with_capacity(2);
        for (index, chain) in self.chains.iter().enumerate() {
            let (Some(head), Some(tail)) = (chain.first(), chain.last()) else {
                continue;
            };
            let found = if eps.points_same(head, &pt1) {
                Some((true, true))
            } else if eps.points_same(head, &pt2) {
                Some((true, false))
            } else if eps.points_same(tail, &pt1) {
                Some((false, true))
            } else if eps.points_same(tail, &pt2) {
                Some((false, false))
            } else {
                None
            };
            if let Some((matches_head, matches_pt1)) = found {
                matches.push(Match {
                    index,
                    matches_head,
                    matches_pt1,
                });
                if matches.len() == 2 {
                    break;
                }
            }
        }

        match matches.as_slice() {
            [] => self.chains.push(vec![pt1, pt2]),
            [first] => self.extend(*first, pt1, pt2),
            [first, second, ..] => self.join(*first, *second),
        }
    }

    /// Grows one chain by the far point of the segment, closing it when the
    /// point meets the chain's other end.
    fn extend(&mut self, m: Match, pt1: Point2, pt2: Point2) {
        let eps = self.eps;
        let pt = if m.matches_pt1 { pt2 } else { pt1 };
        let add_to_head = m.matches_head;
        let chain = &mut self.chains[m.index];
        let n = chain.len();

        let (mut grow, grow2) = if add_to_head {
            (chain[0], chain[1])
        } else {
            (chain[n - 1], chain[n - 2])
        };
        let (oppo, oppo2) = if add_to_head {
            (chain[n - 1], chain[n - 2])
        } else {
            (chain[0], chain[1])
        };

        if eps.points_collinear(&grow2, &grow, &pt) {
            if add_to_head {
                chain.remove(0);
            } else {
                chain.pop();
            }
            grow = grow2;
        }

        if eps.points_same(&oppo, &pt) {
            let mut region = self.chains.remove(m.index);
            if eps.points_collinear(&oppo2, &oppo, &grow) {
                if add_to_head {
                    region.pop();
                } else if !region.is_empty() {
                    region.remove(0);
                }
            }
            self.regions.push(region);
            return;
        }

        if add_to_head {
            chain.insert(0, pt);
        } else {
            chain.push(pt);
        }
    }

    /// Joins the two chains a segment connects.
    fn join(&mut self, first: Match, second: Match) {
        let (f, s) = (first.index, second.index);
        let reverse_f = self.chains[f].len() < self.chains[s].len();
        match (first.matches_head, second.matches_head) {
            (true, true) => {
                if reverse_f {
                    self.chains[f].reverse();
                    self.append(f, s);
                } else {
                    self.chains[s].reverse();
                    self.append(s, f);
                }
            }
            (true, false) => self.append(s, f),
            (false, true) => self.append(f, s),
            (false, false) => {
                if reverse_f {
                    self.chains[f].reverse();
                    self.append(s, f);
                } else {
                    self.chains[s].reverse();
                    self.append(f, s);
                }
            }
        }
    }

    /// Appends chain `j` to the tail of chain `i` and removes `j`.
    fn append(&mut self, i: usize, j: usize) {
        let eps = self.eps;
        let mut second = std::mem::take(&mut self.chains[j]);
        let first = &mut self.chains[i];

        let n = first.len();
        let (mut tail, tail2) = (first[n - 1], first[n - 2]);
        let (head, head2) = (second[0], second[1]);

        if eps.points_collinear(&tail2, &tail, &head) {
            first.pop();
            tail = tail2;
        }
        if eps.points_collinear(&tail, &head, &head2) {
            second.remove(0);
        }
        first.extend(second);
        self.chains.remove(j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn seg(a: Point2, b: Point2) -> Segment {
        Segment::new(a, b)
    }

    #[test]
    fn square_from_shuffled_segments() {
        let segs = vec![
            seg(p(0.0, 0.0), p(1.0, 0.0)),
            seg(p(0.0, 1.0), p(1.0, 1.0)),
            seg(p(0.0, 0.0), p(0.0, 1.0)),
            seg(p(1.0, 0.0), p(1.0, 1.0)),
        ];
        let regions = SegmentChainer::new(Epsilon::default()).chain(&segs);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 4);
    }

    #[test]
    fn collinear_points_are_merged() {
        let segs = vec![
            seg(p(0.0, 0.0), p(0.5, 0.0)),
            seg(p(0.5, 0.0), p(1.0, 0.0)),
            seg(p(1.0, 0.0), p(1.0, 1.0)),
            seg(p(0.0, 1.0), p(1.0, 1.0)),
            seg(p(0.0, 0.0), p(0.0, 1.0)),
        ];
        let regions = SegmentChainer::new(Epsilon::default()).chain(&segs);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].len(), 4);
        assert!(!regions[0].contains(&p(0.5, 0.0)));
    }

    #[test]
    fn zero_length_and_open_chains_are_dropped() {
        let segs = vec![
            seg(p(0.0, 0.0), p(0.0, 0.0)),
            seg(p(0.0, 0.0), p(1.0, 0.0)),
            seg(p(1.0, 0.0), p(1.0, 1.0)),
        ];
        let regions = SegmentChainer::new(Epsilon::default()).chain(&segs);
        assert!(regions.is_empty());
    }

    #[test]
    fn two_islands_stay_separate() {
        let mut segs = Vec::new();
        for offset in [0.0, 5.0] {
            segs.push(seg(p(offset, 0.0), p(offset + 1.0, 0.0)));
            segs.push(seg(p(offset + 1.0, 0.0), p(offset, 1.0)));
            segs.push(seg(p(offset, 0.0), p(offset, 1.0)));
        }
        let regions = SegmentChainer::new(Epsilon::default()).chain(&segs);
        assert_eq!(regions.len(), 2);
        assert!(regions.iter().all(|r| r.len() == 3));
    }
}
