//! Helix tester.
//!
//! Grounded on the same `paleo_spiral_test` machinery as
//! [`super::spiral::spiral_test`] (`libsr/src/paleo/spiral_test.c`), per
//! spec.md §4.5 "Helix": "Like spiral, but with ascending endpoint
//! displacement allowed; emits axis + pitch." Reuses the bbox-center,
//! average-radius, and sub-center-drift tests but skips spiral's endpoint
//! distance check (that's precisely the condition distinguishing the two),
//! and derives `pitch` from how far the endpoint drifts per revolution.

use std::f64::consts::PI;

use crate::config::PaleoThresholds;
use crate::geometry::dist;
use crate::preprocess::EnrichedStroke;
use crate::shapes::{Helix, Shape, TestResult};

/// The helix test (spec.md §4.5 "Helix"). Preconditions: `overtraced`,
/// `ndde > K`.
pub fn helix_test(stroke: &EnrichedStroke, thresh: &PaleoThresholds) -> TestResult {
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

    let total_revs = (pts[pts.len() - 1].dir - pts[0].dir) / (2.0 * PI);
    let num_incs = total_revs.abs().floor() as usize;
    if num_incs < 2 {
        return TestResult::fail("not enough full revolutions to analyze sub-centers");
    }

    // Endpoint displacement per revolution, unlike spiral this is *expected*
    // to be nonzero -- it's what distinguishes a helix's axial pitch.
    let ep_dist = dist(pts[0].xy(), pts[pts.len() - 1].xy());
    let pitch = if total_revs.abs() > 1e-9 {
        ep_dist / total_revs.abs()
    } else {
        0.0
    };
    if ep_dist / stroke.px_length < thresh.v_helix_ep_tolerance {
        return TestResult::fail(format!(
            "endpoint displacement too small to be a helix (looks like a spiral): {:.4} < {:.4}",
            ep_dist / stroke.px_length,
            thresh.v_helix_ep_tolerance
        ));
    }

    let last = pts[pts.len() - 1];
    let theta_t = (last.dir - pts[0].dir).abs();
    let mut theta_f = (last.xy()[1] - center[1]).atan2(last.xy()[0] - center[0]);
    while theta_f < 0.0 {
        theta_f += 2.0 * PI;
    }
    let cw = (last.dir - pts[0].dir) < 0.0;

    let shape = Helix {
        center,
        r: bbox_rad,
        theta_t,
        theta_f,
        cw,
        pitch,
    };
    let fae = avg_r / bbox_rad;
    TestResult::pass(Shape::Helix(shape), fae, fae)
}
