//! The 15-step priority hierarchy (spec.md §4.6) that fuses the independent
//! shape testers' verdicts into a single ranked interpretation list.
//!
//! Grounded on `pal_recognize` in `libsr/src/paleo/paleo.c`: the `ENQ_H`/
//! `PUSH_H` macros and the add-once bitmask become [`Hierarchy::enqueue`]/
//! [`Hierarchy::push`] over a `Vec` plus a fixed-size boolean array, and the
//! 15 numbered steps are transcribed in the same order with the same
//! conditions.

use crate::config::ShapeRanks;
use crate::preprocess::EnrichedStroke;
use crate::shapes::{Shape, ShapeKind, TestResult, SHAPE_KIND_COUNT};
use crate::testers::composite::composite_rank;
use crate::testers::line::PolyLineResult;

/// The ordered interpretation list plus an add-once bitmask, mirroring
/// `pal_recognize`'s `context.hier` array and `context.added` bitmask.
pub struct Hierarchy {
    entries: Vec<(ShapeKind, Shape)>,
    added: [bool; SHAPE_KIND_COUNT],
}

impl Hierarchy {
    fn new() -> Self {
        Self {
            entries: Vec::with_capacity(SHAPE_KIND_COUNT),
            added: [false; SHAPE_KIND_COUNT],
        }
    }

    /// `ENQ(T, R)`: append to the back if `T` hasn't been added yet.
    fn enqueue(&mut self, kind: ShapeKind, shape: Shape) {
        if !self.added[kind.index()] {
            self.added[kind.index()] = true;
            self.entries.push((kind, shape));
        }
    }

    /// `PUSH(T, R)`: prepend if `T` hasn't been added yet.
    fn push(&mut self, kind: ShapeKind, shape: Shape) {
        if !self.added[kind.index()] {
            self.added[kind.index()] = true;
            self.entries.insert(0, (kind, shape));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self) -> Option<&(ShapeKind, Shape)> {
        self.entries.first()
    }

    pub fn into_entries(self) -> Vec<(ShapeKind, Shape)> {
        self.entries
    }
}

/// Rank of an already-resolved entry, used by step 14's tie-break against
/// the current top of the list, and exposed publicly as `pal_shape_rank`
/// (spec.md §6) via [`crate::paleo::pal_shape_rank`]. Fixed constants come
/// from `ranks`; line and composite compute their own per spec.md §4.6.
pub(crate) fn rank_of(kind: ShapeKind, shape: &Shape, ranks: &ShapeRanks) -> i32 {
    match (kind, shape) {
        (ShapeKind::Line, _) => 2,
        (ShapeKind::PolyLine, Shape::PolyLine(p)) => p.pts.len() as i32,
        (ShapeKind::Circle, _) => ranks.circle,
        (ShapeKind::Ellipse, _) => ranks.ellipse,
        (ShapeKind::Arc, _) => ranks.arc,
        (ShapeKind::Curve, _) => ranks.curve,
        (ShapeKind::Spiral, _) => ranks.spiral,
        (ShapeKind::Helix, _) => ranks.helix,
        (ShapeKind::Composite, Shape::Composite(c)) => composite_rank(c) as i32,
        _ => i32::MAX,
    }
}

/// All nine testers' verdicts, gathered up front so the hierarchy can run
/// purely over data with no knowledge of how each tester was invoked.
pub struct TesterResults {
    pub line: TestResult,
    pub pline: PolyLineResult,
    pub circle: TestResult,
    pub ellipse: TestResult,
    pub arc: TestResult,
    pub curve: TestResult,
    pub spiral: TestResult,
    pub helix: TestResult,
    pub composite: TestResult,
}

/// Runs the fixed 15-step hierarchy and returns the ordered interpretation
/// list; the caller (typically [`crate::paleo`]) takes the top entry's kind
/// as the classification. Needs both the fixed shape ranks and the `W`/`X`
/// poly-line shortcut thresholds from `PaleoThresholds` (step 3 uses both).
pub fn resolve(
    stroke: &EnrichedStroke,
    results: TesterResults,
    ranks: &ShapeRanks,
    thresh: &crate::config::PaleoThresholds,
) -> Hierarchy {
    let mut h = Hierarchy::new();
    let TesterResults {
        line,
        pline,
        circle,
        ellipse,
        arc,
        curve,
        spiral,
        helix,
        composite,
    } = results;

    if let Some(shape) = line.shape.clone() {
        h.enqueue(ShapeKind::Line, shape);
    }

    if arc.shape.is_some() && arc.fa < pline.fa_segment0() {
        if let Some(shape) = arc.shape.clone() {
            h.enqueue(ShapeKind::Arc, shape);
        }
    }

    if let Some(ref pline_shape) = pline.shape {
        let high_dcr_shortcut =
            stroke.dcr > thresh.w_pline_high_dcr && (stroke.num_corners() as f64) < thresh.x_pline_high_dcr_max_corners;
        if high_dcr_shortcut || pline.all_segments_possible() {
            h.enqueue(ShapeKind::PolyLine, Shape::PolyLine(pline_shape.clone()));
        }
    }

    if !stroke.overtraced && circle.shape.is_some() && circle.fa < pline.fa_segment0() {
        if pline.possible && pline.rank() as i32 <= ranks.circle {
            if let Some(pline_shape) = pline.shape.clone() {
                h.push(ShapeKind::PolyLine, Shape::PolyLine(pline_shape));
            }
        }
        if let Some(shape) = circle.shape.clone() {
            h.enqueue(ShapeKind::Circle, shape);
        }
    }

    if !stroke.overtraced && ellipse.shape.is_some() && ellipse.fa < pline.fa_segment0() {
        if pline.possible && pline.rank() as i32 <= ranks.ellipse {
            if let Some(pline_shape) = pline.shape.clone() {
                h.push(ShapeKind::PolyLine, Shape::PolyLine(pline_shape));
            }
        }
        if let Some(shape) = ellipse.shape.clone() {
            h.enqueue(ShapeKind::Ellipse, shape);
        }
        if let Some(shape) = circle.shape.clone() {
            h.enqueue(ShapeKind::Circle, shape);
        }
    }

    if let Some(shape) = arc.shape.clone() {
        h.enqueue(ShapeKind::Arc, shape);
    }

    if stroke.overtraced {
        if let Some(shape) = spiral.shape.clone() {
            h.enqueue(ShapeKind::Spiral, shape);
        }
    }

    if let Some(shape) = circle.shape.clone() {
        h.enqueue(ShapeKind::Circle, shape);
    }

    if let Some(shape) = ellipse.shape.clone() {
        h.enqueue(ShapeKind::Ellipse, shape);
    }

    if let Some(Shape::Composite(c)) = &composite.shape {
        if ranks.helix < composite_rank(c) as i32 {
            if let Some(shape) = helix.shape.clone() {
                h.enqueue(ShapeKind::Helix, shape);
            }
        }
    }

    if let Some(shape) = curve.shape.clone() {
        h.enqueue(ShapeKind::Curve, shape);
    }

    if let Some(shape) = spiral.shape.clone() {
        h.enqueue(ShapeKind::Spiral, shape);
    }

    if let Some(pline_shape) = pline.shape.clone() {
        h.enqueue(ShapeKind::PolyLine, Shape::PolyLine(pline_shape));
    }

    let top_is_curve_or_pline = h
        .top()
        .map(|(k, _)| matches!(k, ShapeKind::Curve | ShapeKind::PolyLine))
        .unwrap_or(true);
    if h.is_empty() || top_is_curve_or_pline {
        if let Some(Shape::Composite(c)) = composite.shape.clone() {
            if c.is_line() {
                if let Some(pline_shape) = pline.shape.clone() {
                    h.enqueue(ShapeKind::PolyLine, Shape::PolyLine(pline_shape));
                }
            } else {
                let comp_rank = composite_rank(&c) as i32;
                let push_to_front = h
                    .top()
                    .map(|(k, s)| comp_rank < rank_of(*k, s, ranks))
                    .unwrap_or(true);
                if push_to_front {
                    h.push(ShapeKind::Composite, Shape::Composite(c));
                } else {
                    h.enqueue(ShapeKind::Composite, Shape::Composite(c));
                }
            }
        }
    }

    if let Some(pline_shape) = pline.shape {
        h.enqueue(ShapeKind::PolyLine, Shape::PolyLine(pline_shape));
    } else {
        let pts = stroke.points();
        let fallback = crate::shapes::PolyLine {
            pts: vec![pts[0].xy(), pts[pts.len() - 1].xy()],
        };
        h.enqueue(ShapeKind::PolyLine, Shape::PolyLine(fallback));
    }

    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaleoThresholds;
    use crate::preprocess::preprocess;
    use crate::stroke::Stroke;
    use crate::testers::{arc, curve, ellipse, helix, line, spiral};
    use crate::testers::composite::composite_test;

    #[test]
    fn test_straight_line_resolves_to_line_or_pline() {
        let s = Stroke::from_points(&[(0, 0, 0), (100, 0, 10), (200, 0, 20)]);
        let thresh = PaleoThresholds::default();
        let ranks = ShapeRanks::default();
        let enriched = preprocess(&s, &thresh).unwrap();

        let results = TesterResults {
            line: line::line_test(&enriched, &thresh),
            pline: line::pline_test(&enriched, &thresh),
            circle: ellipse::circle_test(&enriched, &thresh),
            ellipse: ellipse::ellipse_test(&enriched, &thresh),
            arc: arc::arc_test(&enriched, &thresh),
            curve: curve::curve_test(&enriched, &thresh),
            spiral: spiral::spiral_test(&enriched, &thresh),
            helix: helix::helix_test(&enriched, &thresh),
            composite: composite_test(&enriched, &thresh),
        };

        let h = resolve(&enriched, results, &ranks, &thresh);
        let top = h.top().expect("hierarchy always resolves to something");
        assert!(matches!(top.0, ShapeKind::Line | ShapeKind::PolyLine));
    }
}
