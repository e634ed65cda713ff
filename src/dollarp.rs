//! The $P point-cloud gesture recognizer (spec.md §4.7), independent of the
//! PaleoSketch geometric recognizer in `paleo.rs`.
//!
//! Grounded on `dollarp.c` in the `libsr` original: `_resample`/`_scale`/
//! `_translate_to_origin` become [`normalize`], `_cloud_dist` becomes
//! [`cloud_distance`], `_greedy_cloud_match` becomes [`greedy_match`], and
//! `dp_context_t`/`dp_add_template`/`dp_recognize`/`dp_set_epsilon` become
//! [`DpContext`]. Two source bugs are fixed per SPEC_FULL.md's Open Question
//! resolutions; see the notes on [`cloud_distance`] and [`greedy_match`].

use crate::config::DpOptions;
use crate::geometry::{Vec2, dist};
use crate::stroke::Stroke;

/// One registered template: a name plus its `N`-point normalized cloud.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub points: Vec<Vec2>,
}

/// Result of [`DpContext::recognize`].
#[derive(Debug, Clone, PartialEq)]
pub struct DpMatch {
    /// `None` when the template library is empty (spec.md §7).
    pub template: Option<String>,
    /// Similarity in `[0, 1]`; higher is a better match.
    pub score: f64,
}

/// Resamples `stroke` to exactly `n` equally spaced points along its path.
///
/// The C original mutates the stroke being walked: it inserts the
/// synthesized point back into the source array and decrements the loop
/// index so the next segment begins there (`stroke_insert_at` + `i--` in
/// `_resample`). Per the "Resampling's mutate-while-iterating" design note
/// (spec.md §9), this is instead a small state machine over
/// `(prev_point, carry_distance)` that consumes the source stroke without
/// mutating it -- mathematically equivalent, since both walk the same
/// sequence of segments and split them at the same arc-length offsets.
fn resample(stroke: &Stroke, n: usize) -> Vec<Vec2> {
    let pts = stroke.points();
    if n == 0 || pts.is_empty() {
        return Vec::new();
    }
    if n == 1 || pts.len() == 1 {
        return vec![pts[0].xy(); n];
    }

    let interval = stroke.path_length() / (n as f64 - 1.0);
    let mut out = Vec::with_capacity(n);
    out.push(pts[0].xy());

    let mut prev = pts[0].xy();
    let mut carry = 0.0;
    let mut i = 1;
    while i < pts.len() && out.len() < n {
        let curr = pts[i].xy();
        let d = dist(prev, curr);
        if d > 0.0 && carry + d >= interval {
            let f = (interval - carry) / d;
            let q = [prev[0] + f * (curr[0] - prev[0]), prev[1] + f * (curr[1] - prev[1])];
            out.push(q);
            carry = 0.0;
            prev = q;
            // Don't advance `i`: the remainder of this segment (q -> curr)
            // may still be longer than the next sample interval.
        } else {
            carry += d;
            prev = curr;
            i += 1;
        }
    }
    // Floating-point drift can leave the walk one point short; pad with the
    // stroke's last point so the caller always gets exactly `n`.
    while out.len() < n {
        out.push(pts[pts.len() - 1].xy());
    }
    out
}

/// Translates `points` by `-min` and divides by `max(width, height)`,
/// mapping the stroke into `[0, 1]^2` while preserving aspect ratio
/// (spec.md §4.7 step 2), then subtracts the centroid (step 3).
fn scale_and_center(points: &mut [Vec2]) {
    let mut min = [f64::INFINITY, f64::INFINITY];
    let mut max = [f64::NEG_INFINITY, f64::NEG_INFINITY];
    for p in points.iter() {
        min[0] = min[0].min(p[0]);
        min[1] = min[1].min(p[1]);
        max[0] = max[0].max(p[0]);
        max[1] = max[1].max(p[1]);
    }
    let span = (max[0] - min[0]).max(max[1] - min[1]);
    let scale = if span.abs() < 1e-12 { 1.0 } else { span };
    for p in points.iter_mut() {
        p[0] = (p[0] - min[0]) / scale;
        p[1] = (p[1] - min[1]) / scale;
    }

    let n = points.len() as f64;
    let mut centroid = [0.0, 0.0];
    for p in points.iter() {
        centroid[0] += p[0];
        centroid[1] += p[1];
    }
    centroid[0] /= n;
    centroid[1] /= n;
    for p in points.iter_mut() {
        p[0] -= centroid[0];
        p[1] -= centroid[1];
    }
}

/// Normalizes `stroke` to exactly `n` resampled, scaled, origin-centered
/// points (spec.md §4.7 "Normalize").
pub fn normalize(stroke: &Stroke, n: usize) -> Vec<Vec2> {
    let mut points = resample(stroke, n);
    scale_and_center(&mut points);
    points
}

/// Minimum-cost greedy alignment between two equal-size point clouds,
/// starting the walk at `start`. Each step matches the cloud-`a` point at
/// the current walk index to its nearest unmatched cloud-`b` point, adding a
/// weighted distance to the running sum.
///
/// SPEC_FULL.md Open Question 1: the C original's weight,
/// `1 - ((i - start + n) % n) / n`, divides two `int`s, so it collapses to
/// (effectively) `1` for every point but the last. This preserves the
/// paper's stated intent -- confidence weights linearly decreasing over
/// `[1/n, 1]` the further a match is from `start` -- by computing the ratio
/// in floating point.
pub fn cloud_distance(a: &[Vec2], b: &[Vec2], start: usize) -> f64 {
    let n = a.len();
    assert_eq!(n, b.len(), "cloud_distance requires equal-size clouds");
    if n == 0 {
        return 0.0;
    }

    let mut matched = vec![false; n];
    let mut sum = 0.0;
    let mut i = start % n;
    loop {
        let mut min = f64::INFINITY;
        let mut best_j = 0usize;
        for (j, &matched_j) in matched.iter().enumerate() {
            if !matched_j {
                let d = dist(a[i], b[j]);
                if d < min {
                    min = d;
                    best_j = j;
                }
            }
        }
        matched[best_j] = true;
        let weight = 1.0 - (((i + n - start) % n) as f64) / (n as f64);
        sum += weight * min;
        i = (i + 1) % n;
        if i == start % n {
            break;
        }
    }
    sum
}

/// Minimum cloud distance between `a` and `b` over every sampled start
/// `{0, step, 2*step, ...} < n` (spec.md §4.7 "Greedy match"), trying both
/// directions at each start since the alignment is not symmetric.
///
/// SPEC_FULL.md Open Question 2: `_greedy_cloud_match` assigns `min` from
/// only the final sampled pair rather than folding every pair into a running
/// minimum -- an apparent bug, since the loop's whole point is to try
/// several starts and keep the best. This accumulates the true minimum
/// across all sampled starts, per the paper's stated intent.
pub fn greedy_match(a: &[Vec2], b: &[Vec2], step: f64) -> f64 {
    let n = a.len();
    assert_eq!(n, b.len(), "greedy_match requires equal-size clouds");
    if n == 0 {
        return 0.0;
    }

    let stride = step.max(1.0);
    let mut min = f64::INFINITY;
    let mut i = 0.0;
    while i < n as f64 {
        let start = i.round() as usize;
        min = min.min(cloud_distance(a, b, start));
        min = min.min(cloud_distance(b, a, start));
        i += stride;
    }
    min
}

/// The $P recognition context: target point count, alignment-start stride,
/// and the template library, mirroring `dp_context_t` in `libsr`.
///
/// Per SPEC_FULL.md's "supplemented features": `step` is stored denormalized
/// from `epsilon` (recomputed by [`DpContext::set_epsilon`] and at
/// construction) rather than derived lazily on every match, matching
/// `dp_context_t`'s layout and letting a caller read the stride a given
/// recognition run will use directly.
pub struct DpContext {
    n: usize,
    epsilon: f64,
    step: f64,
    templates: Vec<Template>,
}

impl DpContext {
    /// `dp_create()`, using the spec's default `N`/`epsilon`.
    pub fn create() -> Self {
        Self::with_options(DpOptions::default())
    }

    /// `dp_create()` with explicit options.
    pub fn with_options(opts: DpOptions) -> Self {
        Self {
            n: opts.n,
            epsilon: opts.epsilon,
            step: opts.step(),
            templates: Vec::new(),
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// `dp_set_epsilon(ctx, eps)`: recomputes `step` immediately.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon;
        self.step = (self.n as f64).powf(1.0 - epsilon);
    }

    /// `dp_add_template(ctx, stroke, name)`: normalizes `stroke` to `N`
    /// points and adds it to the library. The library grows unbounded, with
    /// no eviction (spec.md §3).
    pub fn add_template(&mut self, stroke: &Stroke, name: impl Into<String>) {
        self.templates.push(Template {
            name: name.into(),
            points: normalize(stroke, self.n),
        });
    }

    /// `dp_recognize(ctx, stroke) -> {template*, score}`. Score is
    /// `max((2 - d) / 2, 0)`, clamped to `[0, 1]`; `score == 0` with
    /// `template == None` when the library is empty (spec.md §7).
    pub fn recognize(&self, stroke: &Stroke) -> DpMatch {
        if self.templates.is_empty() {
            return DpMatch {
                template: None,
                score: 0.0,
            };
        }

        let query = normalize(stroke, self.n);
        let mut best_name: Option<&str> = None;
        let mut best_d = f64::INFINITY;
        for tmpl in &self.templates {
            let d = greedy_match(&query, &tmpl.points, self.step);
            if d < best_d {
                best_d = d;
                best_name = Some(&tmpl.name);
            }
        }

        DpMatch {
            template: best_name.map(str::to_string),
            score: ((2.0 - best_d) / 2.0).clamp(0.0, 1.0),
        }
    }
}

impl Default for DpContext {
    fn default() -> Self {
        Self::create()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn circle_stroke(cx: f64, cy: f64, r: f64, n: usize) -> Stroke {
        let mut s = Stroke::create(n);
        for i in 0..n {
            let theta = 2.0 * PI * (i as f64) / (n as f64 - 1.0);
            s.append(
                (cx + r * theta.cos()) as i64,
                (cy + r * theta.sin()) as i64,
                i as i64 * 10,
            );
        }
        s
    }

    fn diagonal_cross_stroke() -> Stroke {
        // Two crossing diagonals, traced as one polyline: a V-then-X shape
        // approximating an "X" gesture traced in a single stroke.
        Stroke::from_points(&[
            (0, 0, 0),
            (50, 50, 10),
            (100, 100, 20),
            (100, 0, 30),
            (50, 50, 40),
            (0, 100, 50),
        ])
    }

    #[test]
    fn test_normalize_point_count_and_bounds() {
        let s = circle_stroke(200.0, 200.0, 100.0, 64);
        let normalized = normalize(&s, 32);
        assert_eq!(normalized.len(), 32);
        for p in &normalized {
            assert!(p[0] >= -0.5 - 1e-6 && p[0] <= 0.5 + 1e-6);
            assert!(p[1] >= -0.5 - 1e-6 && p[1] <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn test_normalize_centroid_at_origin() {
        let s = circle_stroke(200.0, 200.0, 100.0, 64);
        let normalized = normalize(&s, 32);
        let n = normalized.len() as f64;
        let mut c = [0.0, 0.0];
        for p in &normalized {
            c[0] += p[0];
            c[1] += p[1];
        }
        c[0] /= n;
        c[1] /= n;
        assert!(c[0].abs() < 1e-9);
        assert!(c[1].abs() < 1e-9);
    }

    #[test]
    fn test_normalize_idempotent_on_already_normalized_stroke() {
        let s = circle_stroke(200.0, 200.0, 100.0, 64);
        let once = normalize(&s, 32);
        let reloaded = Stroke::from_points(
            &once
                .iter()
                .enumerate()
                .map(|(i, p)| (p[0] as i64 * 1000, p[1] as i64 * 1000, i as i64))
                .collect::<Vec<_>>(),
        );
        let twice = normalize(&reloaded, 32);
        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn test_empty_library_scores_zero() {
        let ctx = DpContext::create();
        let query = circle_stroke(0.0, 0.0, 50.0, 32);
        let m = ctx.recognize(&query);
        assert_eq!(m.template, None);
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn test_noisy_circle_matches_circle_template_over_cross() {
        let mut ctx = DpContext::with_options(DpOptions { n: 32, epsilon: 0.5 });
        ctx.add_template(&diagonal_cross_stroke(), "X");
        ctx.add_template(&circle_stroke(0.0, 0.0, 100.0, 64), "O");

        // A noisy circle: same shape, jittered radius and an off-center
        // placement, to exercise the normalization rather than an exact copy.
        let mut query = Stroke::create(48);
        for i in 0..48 {
            let theta = 2.0 * PI * (i as f64) / 47.0;
            let jitter = if i % 2 == 0 { 3.0 } else { -3.0 };
            query.append(
                (300.0 + (100.0 + jitter) * theta.cos()) as i64,
                (300.0 + (100.0 + jitter) * theta.sin()) as i64,
                i as i64 * 5,
            );
        }

        let m = ctx.recognize(&query);
        assert_eq!(m.template.as_deref(), Some("O"));
        assert!(m.score > 0.5, "expected score > 0.5, got {}", m.score);
    }

    #[test]
    fn test_set_epsilon_recomputes_step() {
        let mut ctx = DpContext::with_options(DpOptions { n: 64, epsilon: 1.0 });
        assert!((ctx.step() - 1.0).abs() < 1e-9);
        ctx.set_epsilon(0.0);
        assert!((ctx.step() - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_cloud_distance_zero_for_identical_clouds() {
        let a = normalize(&circle_stroke(0.0, 0.0, 50.0, 32), 16);
        let d = cloud_distance(&a, &a, 0);
        assert!(d < 1e-9);
    }
}
