//! Line segment and poly-line testers.
//!
//! Grounded on `line_seg_test`/`poly_line_test`/`_best_fit_line_seg`/
//! `_projection_to_ideal` in `libsr/src/paleo/line_test.c`.

use crate::config::PaleoThresholds;
use crate::geometry::{dist, quad_area};
use crate::preprocess::EnrichedStroke;
use crate::shapes::{Line, PolyLine, Shape, TestResult};

/// A least-squares-fit line used internally while scoring a sub-range.
struct IdealLine {
    /// `None` marks a (near-)vertical line, stored as `x = vertical_x`.
    slope: Option<f64>,
    y_int: f64,
    vertical_x: f64,
}

fn best_fit_line(stroke: &EnrichedStroke, first_i: usize, last_i: usize) -> IdealLine {
    let pts = stroke.points();
    let num = (last_i - first_i + 1) as f64;
    let (mut sum_x, mut sum_y, mut sum_x2, mut sum_xy) = (0.0, 0.0, 0.0, 0.0);
    for p in &pts[first_i..=last_i] {
        let [x, y] = p.xy();
        sum_x += x;
        sum_y += y;
        sum_x2 += x * x;
        sum_xy += x * y;
    }
    let x_mean = sum_x / num;
    let y_mean = sum_y / num;
    let denom = sum_x2 - sum_x * x_mean;
    if denom.abs() > 1e-7 {
        let slope = (sum_xy - sum_x * y_mean) / denom;
        let y_int = y_mean - slope * x_mean;
        IdealLine {
            slope: Some(slope),
            y_int,
            vertical_x: x_mean,
        }
    } else {
        IdealLine {
            slope: None,
            y_int: 0.0,
            vertical_x: x_mean,
        }
    }
}

fn project(ideal: &IdealLine, p: [f64; 2]) -> [f64; 2] {
    match ideal.slope {
        None => [ideal.vertical_x, p[1]],
        Some(m) => {
            // Projection of p onto the line y = m*x + b: dividend of two dot
            // products, v.s / s.s, where s = <1, m>.
            let px = p[0];
            let py = p[1] - ideal.y_int;
            let t = (px + py * m) / (1.0 + m * m);
            [t, ideal.y_int + t * m]
        }
    }
}

fn distance_to_ideal(ideal: &IdealLine, p: [f64; 2]) -> f64 {
    dist(project(ideal, p), p)
}

/// Fits and scores a straight line over `pts[first_i..=last_i]`, the shared
/// core of both the line-segment test and each poly-line sub-segment test.
fn line_seg_test(
    stroke: &EnrichedStroke,
    first_i: usize,
    last_i: usize,
    thresh: &PaleoThresholds,
) -> TestResult {
    let pts = stroke.points();
    let ideal = best_fit_line(stroke, first_i, last_i);

    let mut px_len = 0.0;
    let mut od2 = 0.0;
    for i in first_i..=last_i {
        let d = distance_to_ideal(&ideal, pts[i].xy());
        od2 += d * d;
        if i > first_i {
            px_len += dist(pts[i - 1].xy(), pts[i].xy());
        }
    }
    if px_len == 0.0 {
        return TestResult::fail("degenerate segment: zero length");
    }
    let lse = od2 / px_len;
    if lse >= thresh.g_line_max_lse {
        return TestResult::fail(format!(
            "line LSE too large: {lse:.4} >= {:.4}",
            thresh.g_line_max_lse
        ));
    }

    let mut fa = 0.0;
    for i in first_i + 1..=last_i {
        let proj_a = project(&ideal, pts[i - 1].xy());
        let proj_b = project(&ideal, pts[i].xy());
        fa += quad_area(proj_b, proj_a, pts[i - 1].xy(), pts[i].xy());
    }
    if fa / px_len >= thresh.h_line_max_fa_ratio {
        return TestResult::fail(format!(
            "feature area too large: {:.4} / {:.4} >= {:.4}",
            fa,
            px_len,
            thresh.h_line_max_fa_ratio
        ));
    }

    let line = Line {
        p0: pts[first_i].xy(),
        p1: pts[last_i].xy(),
    };
    TestResult::pass(Shape::Line(line), fa, lse)
}

/// The line segment test (spec.md §4.5 "Line segment"). Only applicable
/// when the stroke has 2 or 3 corners.
pub fn line_test(stroke: &EnrichedStroke, thresh: &PaleoThresholds) -> TestResult {
    if !(stroke.num_corners() == 2 || stroke.num_corners() == 3) {
        return TestResult::fail("line test requires 2 or 3 corners");
    }
    line_seg_test(stroke, 0, stroke.len() - 1, thresh)
}

/// Public entry point to the shared segment fit, used by
/// [`super::composite`] to classify sub-ranges between arbitrary corner
/// pairs (not just the whole-stroke 2/3-corner case `line_test` covers).
pub fn line_seg_test_pub(
    stroke: &EnrichedStroke,
    first_i: usize,
    last_i: usize,
    thresh: &PaleoThresholds,
) -> TestResult {
    line_seg_test(stroke, first_i, last_i, thresh)
}

/// Poly-line test result: one `TestResult` per adjacent corner pair plus an
/// overall aggregate. Segment 0 is what the hierarchy's step 2 compares
/// the arc feature area against (spec.md §4.6).
#[derive(Debug, Clone)]
pub struct PolyLineResult {
    pub possible: bool,
    pub fail_msg: Option<String>,
    pub segments: Vec<TestResult>,
    pub mean_lse: f64,
    pub shape: Option<PolyLine>,
}

impl PolyLineResult {
    fn fail(msg: impl Into<String>) -> Self {
        Self {
            possible: false,
            fail_msg: Some(msg.into()),
            segments: Vec::new(),
            mean_lse: f64::INFINITY,
            shape: None,
        }
    }

    /// Feature area of the first sub-segment, or `+inf` if no segment
    /// exists (i.e. the precondition failed before any segment test ran).
    pub fn fa_segment0(&self) -> f64 {
        self.segments.first().map(|s| s.fa).unwrap_or(f64::INFINITY)
    }

    /// "Rank" per spec.md §9: number of corners, used by the hierarchy to
    /// compare a poly-line's complexity against circle/ellipse ranks.
    pub fn rank(&self) -> usize {
        self.segments.len() + 1
    }

    /// Whether every sub-segment individually passed its line test.
    pub fn all_segments_possible(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(|s| s.possible)
    }
}

/// The poly-line test (spec.md §4.5 "Poly-line").
pub fn pline_test(stroke: &EnrichedStroke, thresh: &PaleoThresholds) -> PolyLineResult {
    if stroke.dcr < thresh.j_min_dcr {
        return PolyLineResult::fail(format!(
            "stroke DCR too low: {:.2} < {:.2}",
            stroke.dcr, thresh.j_min_dcr
        ));
    }

    let corners = stroke.corners();
    let mut segments = Vec::with_capacity(corners.len() - 1);
    let mut avg_lse = 0.0;
    for w in corners.windows(2) {
        let r = line_seg_test(stroke, w[0], w[1], thresh);
        if !r.possible {
            return PolyLineResult {
                possible: false,
                fail_msg: Some(format!(
                    "sub-segment [{}, {}] failed the line test",
                    w[0], w[1]
                )),
                segments,
                mean_lse: f64::INFINITY,
                shape: None,
            };
        }
        avg_lse += r.lse;
        segments.push(r);
    }
    avg_lse /= segments.len() as f64;

    if avg_lse >= thresh.i_pline_max_lse {
        return PolyLineResult {
            possible: false,
            fail_msg: Some(format!(
                "avg LSE too high: {avg_lse:.6} >= {:.6}",
                thresh.i_pline_max_lse
            )),
            segments,
            mean_lse: avg_lse,
            shape: None,
        };
    }

    let shape = PolyLine {
        pts: corners.iter().map(|&i| stroke.points()[i].xy()).collect(),
    };
    PolyLineResult {
        possible: true,
        fail_msg: None,
        segments,
        mean_lse: avg_lse,
        shape: Some(shape),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;
    use crate::stroke::Stroke;

    #[test]
    fn test_straight_line_passes() {
        let s = Stroke::from_points(&[(0, 0, 0), (100, 0, 10), (200, 0, 20)]);
        let enriched = preprocess(&s, &PaleoThresholds::default()).unwrap();
        let r = line_test(&enriched, &PaleoThresholds::default());
        assert!(r.possible);
        assert!(matches!(r.shape, Some(Shape::Line(_))));
    }

    #[test]
    fn test_polyline_two_corners() {
        let s = Stroke::from_points(&[
            (0, 0, 0),
            (100, 0, 10),
            (100, 100, 20),
            (200, 100, 30),
        ]);
        let enriched = preprocess(&s, &PaleoThresholds::default()).unwrap();
        let r = pline_test(&enriched, &PaleoThresholds::default());
        assert_eq!(enriched.num_corners(), 3);
        assert!(r.shape.is_some() || !r.possible);
    }
}
