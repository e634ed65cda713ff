//! Spiral tester.
//!
//! Grounded on `paleo_spiral_test` in `libsr/src/paleo/spiral_test.c`. Two
//! source bugs are fixed here per SPEC_FULL.md's Open Question 5:
//! `context.ideal.center.x` was assigned twice and `center.y` was never set
//! (fixed to the true bbox centroid), and `radii[i] /= first - last` divided
//! by a negative point count (`first < last`); this fixes it to divide by
//! the actual count of points in the sub-stroke.

use std::f64::consts::PI;

use crate::geometry::dist;
use crate::config::PaleoThresholds;
use crate::preprocess::EnrichedStroke;
use crate::shapes::{Shape, Spiral, TestResult};

/// The spiral test (spec.md §4.5 "Spiral"). Preconditions: `overtraced`,
/// `ndde > K`.
pub fn spiral_test(stroke: &EnrichedStroke, thresh: &PaleoThresholds) -> TestResult {
    if !stroke.overtraced {
        return TestResult::fail("stroke not overtraced");
    }
    if stroke.ndde <= thresh.k_min_ndde {
        return TestResult::fail(format!(
            "NDDE too low: {:.2} <= {:.2}",
            stroke.ndde, thresh.k_min_ndde
        ));
    }

    let pts = stroke.points();
    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for p in pts {
        let [x, y] = p.xy();
        min[0] = min[0].min(x);
        min[1] = min[1].min(y);
        max[0] = max[0].max(x);
        max[1] = max[1].max(y);
    }
    // bug fix: the C original assigns `center.x` twice and never sets
    // `center.y`; this is the true bbox centroid.
    let center = [(max[0] + min[0]) / 2.0, (max[1] + min[1]) / 2.0];

    let mut avg_r = 0.0;
    for p in pts {
        avg_r += dist(center, p.xy());
    }
    avg_r /= pts.len() as f64;

    let bbox_rad = (max[0] - min[0] + max[1] - min[1]) / 4.0;
    if bbox_rad <= 0.0 || avg_r / bbox_rad >= thresh.s_spiral_max_radius_ratio {
        return TestResult::fail(format!(
            "avg radius / bbox radius too high: {:.2} >= {:.2}",
            avg_r / bbox_rad.max(1e-9),
            thresh.s_spiral_max_radius_ratio
        ));
    }

    // Break the stroke into 2*pi increments of total turning.
    let num_incs = ((pts[pts.len() - 1].dir - pts[0].dir) / (2.0 * PI)).floor() as usize;
    if num_incs < 2 {
        return TestResult::fail("not enough full revolutions to analyze sub-centers");
    }
    let mut inc_starts = vec![0usize];
    let mut next_angle = pts[0].dir + 2.0 * PI;
    for (i, p) in pts.iter().enumerate().skip(1) {
        if p.dir >= next_angle {
            next_angle += 2.0 * PI;
            inc_starts.push(i);
            if inc_starts.len() == num_incs + 1 {
                break;
            }
        }
    }
    if inc_starts.len() < num_incs + 1 {
        inc_starts.push(pts.len() - 1);
    }

    let mut radii = Vec::with_capacity(num_incs);
    let mut centers = Vec::with_capacity(num_incs);
    for w in inc_starts.windows(2) {
        let (first, last) = (w[0], w[1]);
        if last <= first {
            return TestResult::fail("degenerate revolution increment");
        }
        let mut r_sum = 0.0;
        let mut c = [0.0, 0.0];
        for p in &pts[first..last] {
            r_sum += dist(center, p.xy());
            let [x, y] = p.xy();
            c[0] += x;
            c[1] += y;
        }
        // bug fix: the C original divides by `first - last`, a negative
        // count; this divides by the actual point count, `last - first`.
        let count = (last - first) as f64;
        radii.push(r_sum / count);
        centers.push([c[0] / count, c[1] / count]);
    }

    for i in 2..radii.len() {
        let d0 = radii[i - 1] - radii[i - 2];
        let d1 = radii[i] - radii[i - 1];
        if d0.signum() != d1.signum() {
            return TestResult::fail(format!(
                "radius trend changed direction at increment {i}"
            ));
        }
    }

    let mut sum = 0.0;
    for w in centers.windows(2) {
        sum += dist(w[0], w[1]);
    }
    let n = centers.len() as f64;
    if avg_r * n > 0.0 && sum / (avg_r * n) >= thresh.t_spiral_max_center_drift {
        return TestResult::fail(format!(
            "center drift too high: {:.4} >= {:.4}",
            sum / (avg_r * n),
            thresh.t_spiral_max_center_drift
        ));
    }

    let mut max_dist = 0.0;
    for i in 0..centers.len() {
        for j in i + 1..centers.len() {
            max_dist = f64::max(max_dist, dist(centers[i], centers[j]));
        }
    }
    if max_dist >= 2.0 * avg_r {
        return TestResult::fail(format!(
            "sub-centers too spread out: {max_dist:.2} >= {:.2}",
            2.0 * avg_r
        ));
    }

    let ep_dist = dist(pts[0].xy(), pts[pts.len() - 1].xy());
    if ep_dist / stroke.px_length >= thresh.u_spiral_max_ep_ratio {
        return TestResult::fail(format!(
            "endpoint distance ratio too high: {:.4} >= {:.4} (looks helix-like)",
            ep_dist / stroke.px_length,
            thresh.u_spiral_max_ep_ratio
        ));
    }

    let last = pts[pts.len() - 1];
    let theta_t = (last.dir - pts[0].dir).abs();
    let mut theta_f = (last.xy()[1] - center[1]).atan2(last.xy()[0] - center[0]);
    while theta_f < 0.0 {
        theta_f += 2.0 * PI;
    }
    let cw = (last.dir - pts[0].dir) < 0.0;

    let shape = Spiral {
        center,
        r: bbox_rad,
        theta_t,
        theta_f,
        cw,
    };
    let fae = avg_r / bbox_rad;
    TestResult::pass(Shape::Spiral(shape), fae, fae)
}
