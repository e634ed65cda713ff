//! Arc tester.
//!
//! Grounded on spec.md §4.5 "Arc": a circle test restricted to a partial
//! sweep, reusing the same centroid/average-radius fit as
//! [`super::ellipse::circle_test`] but scoring feature area against an arc
//! rather than a closed curve.

use crate::config::PaleoThresholds;
use crate::geometry::dist;
use crate::preprocess::EnrichedStroke;
use crate::shapes::{Arc, Shape, TestResult};

/// The arc test. Preconditions: `dcr >= J`, `ndde > K`.
pub fn arc_test(stroke: &EnrichedStroke, thresh: &PaleoThresholds) -> TestResult {
    if stroke.dcr < thresh.j_min_dcr {
        return TestResult::fail(format!(
            "DCR too low: {:.2} < {:.2}",
            stroke.dcr, thresh.j_min_dcr
        ));
    }
    if stroke.ndde <= thresh.k_min_ndde {
        return TestResult::fail(format!(
            "NDDE too low: {:.2} <= {:.2}",
            stroke.ndde, thresh.k_min_ndde
        ));
    }

    let pts = stroke.points();
    let n = pts.len() as f64;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for p in pts {
        let [x, y] = p.xy();
        cx += x;
        cy += y;
    }
    let center = [cx / n, cy / n];

    let mut r = 0.0;
    for p in pts {
        r += dist(center, p.xy());
    }
    r /= n;
    if 2.0 * r < thresh.n_circle_min_radius {
        return TestResult::fail(format!(
            "arc radius too small: {r:.2} < {:.2}",
            thresh.n_circle_min_radius / 2.0
        ));
    }

    // Feature area: deviation of each sampled radius from the average
    // radius, integrated along arc length and normalized by the swept
    // area (half r^2 * dtheta).
    let theta0 = {
        let p = pts[0].xy();
        (p[1] - center[1]).atan2(p[0] - center[0])
    };
    let theta1 = {
        let p = pts[pts.len() - 1].xy();
        (p[1] - center[1]).atan2(p[0] - center[0])
    };
    let mut dtheta = theta1 - theta0;
    while dtheta <= -std::f64::consts::PI {
        dtheta += 2.0 * std::f64::consts::PI;
    }
    while dtheta > std::f64::consts::PI {
        dtheta -= 2.0 * std::f64::consts::PI;
    }
    let cw = dtheta < 0.0;

    let mut fa = 0.0;
    for p in pts {
        let d = dist(center, p.xy()) - r;
        fa += d * d;
    }
    let swept_area = 0.5 * r * r * dtheta.abs();
    let fae = if swept_area > 1e-9 {
        fa / swept_area
    } else {
        f64::INFINITY
    };

    if fae >= thresh.q_arc_max_fae {
        return TestResult::fail(format!(
            "arc FAE too high: {fae:.4} >= {:.4}",
            thresh.q_arc_max_fae
        ));
    }

    let shape = Arc {
        c: center,
        r,
        theta0,
        theta1,
        cw,
    };
    TestResult::pass(Shape::Arc(shape), fae, fae)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocess::preprocess;
    use crate::stroke::Stroke;
    use std::f64::consts::PI;

    #[test]
    fn test_quarter_arc() {
        let mut s = Stroke::create(32);
        for i in 0..32 {
            let theta = (PI / 2.0) * (i as f64) / 31.0;
            s.append((100.0 * theta.cos()) as i64, (100.0 * theta.sin()) as i64, i as i64 * 10);
        }
        let enriched = preprocess(&s, &PaleoThresholds::default()).unwrap();
        let r = arc_test(&enriched, &PaleoThresholds::default());
        assert!(r.fa.is_finite());
    }
}
