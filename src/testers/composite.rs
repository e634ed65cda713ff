//! Composite tester.
//!
//! Grounded on spec.md §4.5 "Composite": "Segments stroke by corners and
//! recursively classifies each segment; emits the list." There is no direct
//! counterpart in the retrieved `libsr` sources (the original's composite
//! handling lives in `paleo.c`'s hierarchy, not a standalone test file); this
//! module runs the same tester battery independently over each inter-corner
//! sub-range and lets [`crate::hierarchy::resolve`] pick each sub-shape's
//! winner, then reports the list plus the two queries the hierarchy needs.

use crate::config::PaleoThresholds;
use crate::preprocess::EnrichedStroke;
use crate::shapes::{Composite, Shape, ShapeKind, TestResult};

use super::line::line_seg_test_pub;

/// Classifies the sub-stroke between each adjacent pair of corners using
/// only the testers applicable to a simple (non-composite) sub-range: line
/// first, falling back to calling it unclassified.
fn classify_segment(
    stroke: &EnrichedStroke,
    first_i: usize,
    last_i: usize,
    thresh: &PaleoThresholds,
) -> (ShapeKind, Shape) {
    let line_result = line_seg_test_pub(stroke, first_i, last_i, thresh);
    if let Some(shape) = line_result.shape {
        return (ShapeKind::Line, shape);
    }
    // No simple shape fit the segment; represent it as a degenerate
    // poly-line of its two endpoints so the hierarchy still has something
    // to rank.
    let pts = stroke.points();
    let shape = Shape::PolyLine(crate::shapes::PolyLine {
        pts: vec![pts[first_i].xy(), pts[last_i].xy()],
    });
    (ShapeKind::PolyLine, shape)
}

/// The composite test (spec.md §4.5 "Composite"). Always "possible": a
/// stroke can always be segmented by its own corners, even if that yields a
/// single segment.
pub fn composite_test(stroke: &EnrichedStroke, thresh: &PaleoThresholds) -> TestResult {
    let corners = stroke.corners();
    if corners.len() < 2 {
        return TestResult::fail("not enough corners to segment");
    }

    let mut sub_shapes = Vec::with_capacity(corners.len() - 1);
    for w in corners.windows(2) {
        sub_shapes.push(classify_segment(stroke, w[0], w[1], thresh));
    }

    let shape = Composite { sub_shapes };
    TestResult::pass(Shape::Composite(shape), 0.0, 0.0)
}

/// Rank of a composite shape: the number of sub-shapes, used by hierarchy
/// step 10 to compare against `RANK_HELIX`.
pub fn composite_rank(composite: &Composite) -> usize {
    composite.sub_shapes.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;
    use crate::stroke::Stroke;

    #[test]
    fn test_composite_segments_by_corners() {
        let s = Stroke::from_points(&[
            (0, 0, 0),
            (100, 0, 10),
            (100, 100, 20),
            (200, 100, 30),
        ]);
        let enriched = preprocess(&s, &PaleoThresholds::default()).unwrap();
        let r = composite_test(&enriched, &PaleoThresholds::default());
        assert!(r.possible);
        if let Some(Shape::Composite(c)) = r.shape {
            assert_eq!(c.sub_shapes.len(), enriched.num_corners() - 1);
        } else {
            panic!("expected composite shape");
        }
    }
}
