//! Turns a raw [`Stroke`] into an enriched stroke carrying the feature
//! graphs every shape tester and the hierarchy consume.
//!
//! Grounded on `_process_stroke` in `libsr/src/paleo/paleo.c`: dedup,
//! per-point direction (`_yu_direction`, unwrapped), speed (`_speed`),
//! curvature (`_yu_curvature`), corners (`_paulson_corners`), `px_length`,
//! `dy_dx`/NDDE, DCR (`_compute_dcr`), and tail trimming (`_break_stroke`).
//! Three source bugs are fixed per the Open Questions in spec.md §9 and
//! SPEC_FULL.md (see the corresponding `// bug fix:` comments below); the
//! corners-as-pointers hazard is replaced with corners-as-indices per the
//! "Manual buffer management -> ownership" design note.

use std::f64::consts::PI;

use crate::config::PaleoThresholds;
use crate::error::RecognizeError;
use crate::geometry::dist;
use crate::stroke::{Point, Stroke};

const K: usize = 3;

/// A stroke point annotated with the feature-graph values computed over the
/// whole (deduplicated, possibly tail-trimmed) stroke.
#[derive(Debug, Clone, Copy)]
pub struct EnrichedPoint {
    pub p: Point,
    /// Yu direction, radians, unwrapped so consecutive differences lie in
    /// `(-pi, pi]`.
    pub dir: f64,
    /// Pixels per unit time.
    pub speed: f64,
    /// Yu curvature with an adaptive window.
    pub curv: f64,
    pub dy_dx: f64,
}

impl EnrichedPoint {
    pub fn xy(&self) -> [f64; 2] {
        self.p.xy()
    }
}

/// A preprocessed stroke: deduplicated points plus the computed feature
/// graphs, corner set, and stroke-level scalars named in spec.md §3.
#[derive(Debug, Clone)]
pub struct EnrichedStroke {
    points: Vec<EnrichedPoint>,
    /// Indices into `points`; `corners[0] == 0`, `corners[last] == points.len() - 1`,
    /// strictly index-increasing.
    corners: Vec<usize>,
    pub px_length: f64,
    pub ndde: f64,
    pub dcr: f64,
    pub tot_revs: f64,
    pub overtraced: bool,
    pub closed: bool,
}

impl EnrichedStroke {
    pub fn points(&self) -> &[EnrichedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn corners(&self) -> &[usize] {
        &self.corners
    }

    pub fn num_corners(&self) -> usize {
        self.corners.len()
    }

    pub fn first(&self) -> &EnrichedPoint {
        &self.points[0]
    }

    pub fn last(&self) -> &EnrichedPoint {
        &self.points[self.points.len() - 1]
    }
}

/// Deduplicate consecutive points sharing a timestamp or `(x, y)`.
///
/// PaleoSketch, pg 3: "If two consecutive points either have the same x and
/// y values or if they have the same time value then the second point is
/// removed." Downstream divisions by `dt`/`dp` must not see a zero.
fn dedup(stroke: &Stroke) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(stroke.len());
    for &p in stroke.points() {
        if let Some(last) = out.last() {
            if last.t == p.t || (last.x == p.x && last.y == p.y) {
                continue;
            }
        }
        out.push(p);
    }
    for (i, p) in out.iter_mut().enumerate() {
        p.index = i;
    }
    out
}

fn yu_direction(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((b[1] - a[1]) / (b[0] - a[0])).atan()
}

fn dy_dx_direction(a: [f64; 2], b: [f64; 2]) -> f64 {
    (b[1] - a[1]) / (b[0] - a[0])
}

/// Curvature at the window's center point, given the `2k+1` points
/// `i-k ..= i+k`. Sums the `2k` wrapped direction differences between
/// consecutive points in the window and divides by the window's path
/// length (SPEC_FULL.md Open Question 3: this fixes `_yu_curvature`'s
/// off-by-one window read in the C original).
fn yu_curvature(window: &[EnrichedPoint]) -> f64 {
    let mut diff_sum = 0.0;
    let mut len = 0.0;
    for pair in window.windows(2) {
        len += dist(pair[0].xy(), pair[1].xy());
        let mut diff = pair[1].dir - pair[0].dir;
        while diff > PI {
            diff -= 2.0 * PI;
        }
        while diff < -PI {
            diff += 2.0 * PI;
        }
        diff_sum += diff;
    }
    if len == 0.0 { 0.0 } else { diff_sum / len }
}

/// Computes direction, speed, curvature and dy/dx graphs over `pts`,
/// returning the enriched points (curvature and dy_dx filled in a second
/// pass once direction is known for the whole stroke).
fn build_points(pts: Vec<Point>) -> Vec<EnrichedPoint> {
    let n = pts.len();
    let mut enriched: Vec<EnrichedPoint> = pts
        .iter()
        .map(|&p| EnrichedPoint {
            p,
            dir: 0.0,
            speed: 0.0,
            curv: 0.0,
            dy_dx: 0.0,
        })
        .collect();

    if n < 2 {
        return enriched;
    }

    // Direction + speed over each segment, unwrapped so the graph stays
    // monotone-friendly for closedness/overtraced detection.
    for i in 0..n - 1 {
        let mut d = yu_direction(pts[i].xy(), pts[i + 1].xy());
        if i > 0 {
            let prev = enriched[i - 1].dir;
            while d - prev > PI {
                d -= 2.0 * PI;
            }
            while d - prev < -PI {
                d += 2.0 * PI;
            }
        }
        enriched[i].dir = d;
        // bug fix: the C original reads `pts[i+i]` (a typo for `i+1`) here.
        let dt = (pts[i + 1].t - pts[i].t).unsigned_abs().max(1) as f64;
        enriched[i].speed = dist(pts[i].xy(), pts[i + 1].xy()) / dt;
    }
    // The last point has no outgoing segment; it inherits the final
    // segment's direction/speed so every point carries a defined value
    // (spec.md §3 requires dir/speed as per-point fields).
    enriched[n - 1].dir = enriched[n - 2].dir;
    enriched[n - 1].speed = enriched[n - 2].speed;

    // Curvature: adaptive half-window k = min(K, i, n-i-1) for interior
    // points.
    for i in 1..n - 1 {
        let k = K.min(i).min(n - i - 1);
        let window = &enriched[i - k..=i + k];
        enriched[i].curv = yu_curvature(window);
    }

    // dy/dx, for NDDE. Mirrors the C original, which also leaves index 0
    // out of the max/min search.
    for i in 1..n {
        enriched[i].dy_dx = dy_dx_direction(pts[i - 1].xy(), pts[i].xy());
    }

    enriched
}

/// Paulson corner detection (spec.md §4.3 step 5): seed with first/last
/// point, then merge close corners and relocate corners to local curvature
/// maxima until a fixed point is reached.
fn paulson_corners(points: &[EnrichedPoint], thresh: &PaleoThresholds) -> Vec<usize> {
    let n = points.len();
    if n < 2 {
        return vec![0];
    }

    let mut corners = vec![0usize];
    let mut last_idx = 0usize;
    for i in 1..n - 1 {
        if dist(points[last_idx].xy(), points[i].xy()) > thresh.y_corner_dist {
            corners.push(i - 1);
            last_idx = i - 1;
        }
    }
    corners.push(n - 1);
    corners.dedup();

    loop {
        let merged = merge_corners(&mut corners, n, thresh);
        let replaced = replace_corners(&mut corners, points, thresh);
        if !merged && !replaced {
            break;
        }
    }
    corners
}

/// One merge pass. Returns whether anything changed.
///
/// Per spec.md §4.3: "for each adjacent corner pair whose index difference
/// <= Z * n_points, merge (remove the second; for interior pairs, replace
/// the first with the point at the averaged index)". The two corner-array
/// endpoints (index 0 and n-1) are never removed, preserving the
/// `corners[0]`/`corners[-1]` invariant.
fn merge_corners(corners: &mut Vec<usize>, n: usize, thresh: &PaleoThresholds) -> bool {
    let mut changed = false;
    let span = thresh.z_corner_merge_pct * n as f64;
    let mut c = 1;
    while c < corners.len() {
        if (corners[c] - corners[c - 1]) as f64 <= span {
            changed = true;
            if c == 1 {
                corners.remove(1);
            } else if c == corners.len() - 1 {
                corners.remove(c - 1);
            } else {
                let avg = (corners[c - 1] + corners[c]) / 2;
                corners[c - 1] = avg;
                corners.remove(c);
            }
        } else {
            c += 1;
        }
    }
    changed
}

/// One replace pass: relocate each *interior* corner to the local curvature
/// maximum within `+-ceil(Z * n_points)` of its current index. The first and
/// last corners are pinned to `0`/`n-1` and never relocated: `build_points`
/// never computes `curv` for those indices (it stays `0.0`), so searching
/// their window would almost always move them onto some interior point with
/// positive curvature, breaking the `corners[0] == 0` / `corners[-1] == n-1`
/// invariant.
fn replace_corners(
    corners: &mut [usize],
    points: &[EnrichedPoint],
    thresh: &PaleoThresholds,
) -> bool {
    let n = points.len();
    let len = corners.len();
    if len < 3 {
        return false;
    }
    let range = (thresh.z_corner_merge_pct * n as f64).ceil() as isize;
    let mut changed = false;
    for idx in 1..len - 1 {
        let corner = corners[idx];
        let center = corner as isize;
        let lo = (center - range).max(0) as usize;
        let hi = ((center + range) as usize).min(n - 1);
        let mut best = corner;
        for i in lo..=hi {
            if points[i].curv > points[best].curv {
                best = i;
            }
        }
        if best != corner {
            corners[idx] = best;
            changed = true;
        }
    }

    if changed {
        // Each corner was relocated independently, so adjacent windows
        // overlapping can make two neighbours cross (or collide). Clamp
        // every interior corner to stay strictly between its neighbours,
        // working inward from both pinned endpoints, to re-establish the
        // strictly-increasing invariant before the next merge pass sees it.
        for idx in 1..len - 1 {
            corners[idx] = corners[idx].max(corners[idx - 1] + 1);
        }
        for idx in (1..len - 1).rev() {
            corners[idx] = corners[idx].min(corners[idx + 1] - 1);
        }
    }

    changed
}

/// Direction-change ratio: ignoring the first and last 5% of path length,
/// `max(|delta dir|) / mean(|delta dir|)`.
fn compute_dcr(points: &[EnrichedPoint], px_length: f64) -> f64 {
    if px_length == 0.0 || points.len() < 2 {
        return 0.0;
    }
    let mut prog = 0.0;
    let mut max_d = 0.0;
    let mut sum_d = 0.0;
    let mut count = 0usize;
    for i in 1..points.len() {
        prog += dist(points[i - 1].xy(), points[i].xy());
        let frac = prog / px_length;
        if frac <= 0.05 || frac >= 0.95 {
            continue;
        }
        let d = (points[i - 1].dir - points[i].dir).abs();
        max_d = f64::max(max_d, d);
        sum_d += d;
        count += 1;
    }
    if count == 0 || sum_d == 0.0 {
        // Every middle-90% direction delta is zero (a straight or
        // near-straight stroke): max_d / mean would be 0.0 / 0.0 = NaN, and
        // NaN compares false against every downstream threshold, silently
        // admitting preconditions it should fail instead.
        0.0
    } else {
        max_d / (sum_d / count as f64)
    }
}

/// Tail trimming (spec.md §4.4 step 6): find the highest-curvature index in
/// the first and last 20% of arc length, and keep only points between them.
fn trim_indices(points: &[EnrichedPoint], px_length: f64) -> (usize, usize) {
    let n = points.len();
    let mut first_i = 0usize;
    let mut last_i = n - 1;
    let mut prog = 0.0;
    for i in 1..n - 1 {
        prog += dist(points[i - 1].xy(), points[i].xy());
        let pct = prog / px_length;
        if pct < 0.20 {
            if points[first_i].curv < points[i].curv {
                first_i = i;
            }
        } else if pct > 0.80 && points[last_i].curv < points[i].curv {
            last_i = i;
        }
    }
    (first_i, last_i)
}

/// Remaps a corner-index list from the pre-trim index space to the
/// post-trim one, dropping corners outside `[first_i, last_i]` and
/// re-adding the new endpoints if they were trimmed away. This is the
/// "corners as indices, not pointers" fix from spec.md §9: trimming
/// reallocates the point buffer, so any stale reference would dangle.
fn remap_corners(corners: &[usize], first_i: usize, last_i: usize) -> Vec<usize> {
    let mut out: Vec<usize> = corners
        .iter()
        .filter(|&&i| i >= first_i && i <= last_i)
        .map(|&i| i - first_i)
        .collect();
    if out.first() != Some(&0) {
        out.insert(0, 0);
    }
    let last = last_i - first_i;
    if out.last() != Some(&last) {
        out.push(last);
    }
    out.dedup();
    out
}

/// Runs the full preprocessing pipeline on a raw stroke.
pub fn preprocess(
    stroke: &Stroke,
    thresh: &PaleoThresholds,
) -> Result<EnrichedStroke, RecognizeError> {
    if stroke.is_empty() {
        return Err(RecognizeError::TooShort(0));
    }

    let deduped = dedup(stroke);
    let mut points = build_points(deduped);
    let mut corners = paulson_corners(&points, thresh);

    let px_length: f64 = points
        .windows(2)
        .map(|w| dist(w[0].xy(), w[1].xy()))
        .sum();

    // dy/dx extremes, ignoring index 0 (never set by the original either).
    let mut max_i = 1usize.min(points.len() - 1);
    let mut min_i = max_i;
    for i in 1..points.len() {
        if points[i].dy_dx > points[max_i].dy_dx {
            max_i = i;
        }
        if points[i].dy_dx < points[min_i].dy_dx {
            min_i = i;
        }
    }
    let (lo, hi) = if max_i < min_i {
        (max_i, min_i)
    } else {
        (min_i, max_i)
    };
    let sub_length: f64 = points[lo.min(hi)..hi.max(lo) + 1]
        .windows(2)
        .map(|w| dist(w[0].xy(), w[1].xy()))
        .sum();
    let ndde = if px_length == 0.0 {
        0.0
    } else {
        sub_length / px_length
    };

    let dcr = compute_dcr(&points, px_length);

    if points.len() as f64 >= thresh.b_min_tail_points && px_length >= thresh.c_min_tail_length {
        let (first_i, last_i) = trim_indices(&points, px_length);
        if first_i < last_i {
            corners = remap_corners(&corners, first_i, last_i);
            points = points[first_i..=last_i].to_vec();
            for (i, p) in points.iter_mut().enumerate() {
                p.p.index = i;
            }
        }
    }

    let tot_revs = (points[points.len() - 1].dir - points[0].dir) / (2.0 * PI);
    let overtraced = tot_revs > thresh.d_overtraced_revs;
    let closed = {
        let ep_ratio = dist(points[0].xy(), points[points.len() - 1].xy()) / px_length;
        ep_ratio < thresh.e_closed_dist_ratio && tot_revs > thresh.f_closed_min_revs
    };

    Ok(EnrichedStroke {
        points,
        corners,
        px_length,
        ndde,
        dcr,
        tot_revs,
        overtraced,
        closed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_stroke() -> Stroke {
        Stroke::from_points(&[(0, 0, 0), (100, 0, 10), (200, 0, 20)])
    }

    #[test]
    fn test_too_short_is_rejected() {
        let s = Stroke::create(0);
        assert!(matches!(
            preprocess(&s, &PaleoThresholds::default()),
            Err(RecognizeError::TooShort(0))
        ));
    }

    #[test]
    fn test_dedup_drops_same_timestamp_and_same_point() {
        let s = Stroke::from_points(&[(0, 0, 0), (0, 0, 5), (10, 0, 5), (10, 0, 10)]);
        let enriched = preprocess(&s, &PaleoThresholds::default()).unwrap();
        for w in enriched.points().windows(2) {
            assert!(!(w[0].p.t == w[1].p.t || (w[0].p.x == w[1].p.x && w[0].p.y == w[1].p.y)));
        }
    }

    #[test]
    fn test_direction_unwrap_stays_in_range() {
        let enriched = preprocess(&line_stroke(), &PaleoThresholds::default()).unwrap();
        for w in enriched.points().windows(2) {
            let d = w[1].dir - w[0].dir;
            assert!(d > -PI && d <= PI + 1e-9);
        }
    }

    #[test]
    fn test_corner_invariants() {
        let s = Stroke::from_points(&[(0, 0, 0), (100, 0, 10), (100, 100, 20), (200, 100, 30)]);
        let enriched = preprocess(&s, &PaleoThresholds::default()).unwrap();
        let c = enriched.corners();
        assert_eq!(*c.first().unwrap(), 0);
        assert_eq!(*c.last().unwrap(), enriched.len() - 1);
        for w in c.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn test_dcr_is_zero_not_nan_for_straight_stroke() {
        let enriched = preprocess(&line_stroke(), &PaleoThresholds::default()).unwrap();
        assert_eq!(enriched.dcr, 0.0);
        assert!(!enriched.dcr.is_nan());
    }

    fn synth_points(curvs: &[f64]) -> Vec<EnrichedPoint> {
        curvs
            .iter()
            .enumerate()
            .map(|(i, &curv)| EnrichedPoint {
                p: Point::new(i as i64 * 10, 0, i as i64, i),
                dir: 0.0,
                speed: 0.0,
                curv,
                dy_dx: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_replace_corners_never_moves_endpoints() {
        // High curvature right next to the pinned endpoints would, without
        // the endpoint skip, pull corners[0]/corners[-1] off 0/(n-1).
        let points = synth_points(&[0.0, 5.0, 0.0, 0.0, 0.0, 0.0, 5.0, 0.0]);
        let thresh = PaleoThresholds::default();
        let mut corners = vec![0usize, 3, points.len() - 1];
        replace_corners(&mut corners, &points, &thresh);
        assert_eq!(corners[0], 0);
        assert_eq!(*corners.last().unwrap(), points.len() - 1);
    }

    #[test]
    fn test_replace_corners_keeps_strictly_increasing_when_windows_overlap() {
        // Two interior corners close enough that their relocation windows
        // overlap and both are pulled toward the same curvature peak.
        let mut curvs = vec![0.0; 20];
        curvs[10] = 9.0;
        let points = synth_points(&curvs);
        let thresh = PaleoThresholds::default();
        let mut corners = vec![0usize, 9, 10, points.len() - 1];
        replace_corners(&mut corners, &points, &thresh);
        for w in corners.windows(2) {
            assert!(w[0] < w[1], "corners not strictly increasing: {corners:?}");
        }
        assert_eq!(corners[0], 0);
        assert_eq!(*corners.last().unwrap(), points.len() - 1);
    }
}
