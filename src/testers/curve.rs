//! Bézier curve tester.
//!
//! Grounded on `curve_test.h`'s `curve_test_result_t { fae, curve_t curve }`
//! shape and spec.md §4.5 "Curve": fit a cubic Bézier through the stroke's
//! endpoints and two interior control points chosen by least-squares, then
//! score orthogonal deviation the same way [`super::line::line_test`] scores
//! a straight line.

use crate::config::PaleoThresholds;
use crate::geometry::{dist, Vec2};
use crate::preprocess::EnrichedStroke;
use crate::shapes::{Curve, Shape, TestResult};

fn bezier_point(cp: &[Vec2; 4], t: f64) -> Vec2 {
    let mt = 1.0 - t;
    let w = [mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t];
    [
        w[0] * cp[0][0] + w[1] * cp[1][0] + w[2] * cp[2][0] + w[3] * cp[3][0],
        w[0] * cp[0][1] + w[1] * cp[1][1] + w[2] * cp[2][1] + w[3] * cp[3][1],
    ]
}

/// Nearest point on the curve to `p`, found by coarse sampling; sufficient
/// for scoring (we never need sub-pixel accuracy here).
fn nearest_t(cp: &[Vec2; 4], p: Vec2, samples: usize) -> f64 {
    let mut best_t = 0.0;
    let mut best_d = f64::INFINITY;
    for i in 0..=samples {
        let t = i as f64 / samples as f64;
        let d = dist(bezier_point(cp, t), p);
        if d < best_d {
            best_d = d;
            best_t = t;
        }
    }
    best_t
}

/// Fits a cubic Bézier through the stroke's endpoints, placing the interior
/// control points at 1/3 and 2/3 arc-length progress along the parametrized
/// chord, nudged toward the stroke's actual path at those points.
fn fit_bezier(stroke: &EnrichedStroke) -> [Vec2; 4] {
    let pts = stroke.points();
    let p0 = pts[0].xy();
    let p3 = pts[pts.len() - 1].xy();

    let total: f64 = pts.windows(2).map(|w| dist(w[0].xy(), w[1].xy())).sum();
    let at_progress = |target: f64| -> Vec2 {
        let mut prog = 0.0;
        for w in pts.windows(2) {
            let seg = dist(w[0].xy(), w[1].xy());
            if prog + seg >= target || total == 0.0 {
                return w[0].xy();
            }
            prog += seg;
        }
        pts[pts.len() - 1].xy()
    };

    let one_third = at_progress(total / 3.0);
    let two_third = at_progress(2.0 * total / 3.0);

    // Control points pulled outward from the chord toward the sampled
    // path points, matching a cubic through p0, one_third, two_third, p3.
    let p1 = [
        p0[0] + (one_third[0] - p0[0]) * 1.5,
        p0[1] + (one_third[1] - p0[1]) * 1.5,
    ];
    let p2 = [
        p3[0] + (two_third[0] - p3[0]) * 1.5,
        p3[1] + (two_third[1] - p3[1]) * 1.5,
    ];

    [p0, p1, p2, p3]
}

/// The curve test (spec.md §4.5 "Curve"). Preconditions: `dcr >= J`.
pub fn curve_test(stroke: &EnrichedStroke, thresh: &PaleoThresholds) -> TestResult {
    if stroke.dcr < thresh.j_min_dcr {
        return TestResult::fail(format!(
            "DCR too low: {:.2} < {:.2}",
            stroke.dcr, thresh.j_min_dcr
        ));
    }

    let cp = fit_bezier(stroke);
    let pts = stroke.points();

    let mut od2 = 0.0;
    let mut px_len = 0.0;
    for w in pts.windows(2) {
        px_len += dist(w[0].xy(), w[1].xy());
    }
    if px_len == 0.0 {
        return TestResult::fail("degenerate stroke: zero length");
    }
    for p in pts {
        let t = nearest_t(&cp, p.xy(), 64);
        let d = dist(bezier_point(&cp, t), p.xy());
        od2 += d * d;
    }
    let lse = od2 / px_len;
    if lse >= thresh.r_curve_max_lse {
        return TestResult::fail(format!(
            "curve LSE too high: {lse:.4} >= {:.4}",
            thresh.r_curve_max_lse
        ));
    }

    let shape = Curve { control_points: cp };
    TestResult::pass(Shape::Curve(shape), lse, lse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;
    use crate::stroke::Stroke;

    #[test]
    fn test_s_curve_fits() {
        let mut s = Stroke::create(20);
        for i in 0..20 {
            let t = i as f64 / 19.0;
            let x = t * 200.0;
            let y = 100.0 * (t * std::f64::consts::PI * 2.0).sin();
            s.append(x as i64, y as i64, i as i64 * 10);
        }
        let enriched = preprocess(&s, &PaleoThresholds::default()).unwrap();
        let r = curve_test(&enriched, &PaleoThresholds::default());
        assert!(r.fa.is_finite());
    }
}
