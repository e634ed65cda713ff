//! Tunable configuration for both recognizers.
//!
//! Generalizes the teacher's `MatcherOptions` (a `Copy`, serde-derived,
//! `Default`-implementing options struct) to every named threshold in
//! spec.md §6. Each field keeps the one-line comment its constant carries
//! in `libsr/src/paleo/thresh.h`, so call sites read the same way
//! `PALEO_THRESH_E`, `PALEO_THRESH_F`, etc. do in the original.

use serde::{Deserialize, Serialize};

/// Every PaleoSketch threshold from spec.md §6, with the spec's literal
/// defaults. Dimensionless unless noted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaleoThresholds {
    /// A: tail-removal progress split (first/last 20% search window).
    pub a_tail_split: f64,
    /// B: minimum point count before tail removal is attempted.
    pub b_min_tail_points: f64,
    /// C: minimum px_length (px) before tail removal is attempted.
    pub c_min_tail_length: f64,
    /// D: overtraced revolution threshold.
    pub d_overtraced_revs: f64,
    /// E: closedness endpoint-distance / length ratio.
    pub e_closed_dist_ratio: f64,
    /// F: closedness minimum revolutions.
    pub f_closed_min_revs: f64,
    /// G: line-segment straightness (max LSE).
    pub g_line_max_lse: f64,
    /// H: line feature-area / length max ratio.
    pub h_line_max_fa_ratio: f64,
    /// I: poly-line average LSE max.
    pub i_pline_max_lse: f64,
    /// J: minimum DCR for poly-line / arc / curve preconditions.
    pub j_min_dcr: f64,
    /// K: minimum NDDE for ellipse / arc / spiral preconditions.
    pub k_min_ndde: f64,
    /// L: ellipse major-axis length requirement (px).
    pub l_ellipse_min_major: f64,
    /// M: ellipse max feature-area error.
    pub m_ellipse_max_fae: f64,
    /// N: circle/arc radius length requirement (px).
    pub n_circle_min_radius: f64,
    /// O: ellipse/circle tie-breaker.
    pub o_ellipse_circle_tiebreak: f64,
    /// P: circle max feature-area error.
    pub p_circle_max_fae: f64,
    /// Q: arc max feature-area error.
    pub q_arc_max_fae: f64,
    /// R: Bézier curve max LSE.
    pub r_curve_max_lse: f64,
    /// S: spiral avg-radius / bbox-radius max ratio.
    pub s_spiral_max_radius_ratio: f64,
    /// T: spiral sub-center drift max.
    pub t_spiral_max_center_drift: f64,
    /// U: spiral max endpoint-distance / px_length (spiral-vs-helix split).
    pub u_spiral_max_ep_ratio: f64,
    /// V: reserved threshold (helix endpoint displacement tolerance).
    pub v_helix_ep_tolerance: f64,
    /// W: poly-line high-DCR shortcut threshold.
    pub w_pline_high_dcr: f64,
    /// X: poly-line high-DCR shortcut max corner count.
    pub x_pline_high_dcr_max_corners: f64,
    /// Y: corner-detection straight-line distance threshold.
    pub y_corner_dist: f64,
    /// Z: corner merge/replace neighborhood percentage.
    pub z_corner_merge_pct: f64,
}

impl Default for PaleoThresholds {
    fn default() -> Self {
        Self {
            a_tail_split: 0.5,
            b_min_tail_points: 5.0,
            c_min_tail_length: 70.0,
            d_overtraced_revs: 1.31,
            e_closed_dist_ratio: 0.16,
            f_closed_min_revs: 0.75,
            g_line_max_lse: 2.0,
            h_line_max_fa_ratio: 10.25,
            i_pline_max_lse: 0.0036,
            j_min_dcr: 6.0,
            k_min_ndde: 0.8,
            l_ellipse_min_major: 30.0,
            m_ellipse_max_fae: 0.33,
            n_circle_min_radius: 16.0,
            o_ellipse_circle_tiebreak: 0.425,
            p_circle_max_fae: 0.35,
            q_arc_max_fae: 0.4,
            r_curve_max_lse: 0.37,
            s_spiral_max_radius_ratio: 0.9,
            t_spiral_max_center_drift: 0.25,
            u_spiral_max_ep_ratio: 0.2,
            v_helix_ep_tolerance: 0.1,
            w_pline_high_dcr: 9.0,
            x_pline_high_dcr_max_corners: 10.0,
            y_corner_dist: 0.99,
            z_corner_merge_pct: 0.06,
        }
    }
}

/// Fixed shape ranks used for hierarchy tie-breaking (spec.md §4.6, §9).
/// Line and composite compute their own rank instead of using a constant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeRanks {
    pub circle: i32,
    pub ellipse: i32,
    pub arc: i32,
    pub curve: i32,
    pub spiral: i32,
    pub helix: i32,
}

impl Default for ShapeRanks {
    fn default() -> Self {
        Self {
            circle: 1,
            ellipse: 2,
            arc: 3,
            curve: 4,
            spiral: 5,
            helix: 6,
        }
    }
}

/// Options controlling the $P point-cloud recognizer: target point count
/// and the alignment-start sampling density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DpOptions {
    /// Target resampled point count (`N` in spec.md; typical 32 or 64).
    pub n: usize,
    /// Controls the number of alignment starts tried: `step = N^(1-eps)`.
    pub epsilon: f64,
}

impl DpOptions {
    pub const DEFAULT_N: usize = 32;
    pub const DEFAULT_EPSILON: f64 = 0.5;

    /// Recomputed alignment-start stride, `N^(1 - epsilon)`, matching
    /// `dp_set_epsilon`'s denormalized `step` field in `libsr`.
    pub fn step(&self) -> f64 {
        (self.n as f64).powf(1.0 - self.epsilon)
    }
}

impl Default for DpOptions {
    fn default() -> Self {
        Self {
            n: Self::DEFAULT_N,
            epsilon: Self::DEFAULT_EPSILON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_match_spec() {
        let t = PaleoThresholds::default();
        assert_eq!(t.d_overtraced_revs, 1.31);
        assert_eq!(t.z_corner_merge_pct, 0.06);
    }

    #[test]
    fn test_dp_step() {
        let opts = DpOptions {
            n: 64,
            epsilon: 0.5,
        };
        assert!((opts.step() - 8.0).abs() < 1e-9);
    }
}
