//! The PaleoSketch recognition facade (spec.md §2.7, §6): wires
//! preprocessing, the nine shape testers, and the hierarchy resolver
//! together behind a single `recognize(stroke) -> type` call.
//!
//! Grounded on `pal_init`/`pal_deinit`/`pal_recognize`/`pal_last_type`/
//! `pal_last_stroke` in `libsr/src/paleo/paleo.c`. Per the "Process-wide
//! recognizer state → instance" redesign flag (spec.md §9), the single
//! static `paleo` context there becomes an explicit, non-`Copy` struct:
//! `PaleoRecognizer::new` is the constructor, `Drop` is implicit (nothing
//! to release), and nothing here is process-global.

use tracing::debug;

use crate::config::{PaleoThresholds, ShapeRanks};
use crate::error::RecognizeError;
use crate::hierarchy::{self, TesterResults};
use crate::preprocess::{self, EnrichedStroke};
use crate::shapes::{Shape, ShapeKind};
use crate::stroke::Stroke;
use crate::testers::composite::composite_test;
use crate::testers::{arc, curve, ellipse, helix, line, spiral};

/// An instance of the PaleoSketch engine. Not `Send`/`Sync`-restricted by
/// any interior mutability trick, but per spec.md §5 a single instance is
/// not re-entrant: two concurrent `recognize` calls on the same instance
/// would race on `last_type`/`last_stroke`. Callers needing parallel
/// recognition should hold one instance per thread.
pub struct PaleoRecognizer {
    thresholds: PaleoThresholds,
    ranks: ShapeRanks,
    last_type: Option<ShapeKind>,
    last_stroke: Option<EnrichedStroke>,
}

impl PaleoRecognizer {
    /// `pal_init()`: a recognizer with the spec's default thresholds and
    /// shape ranks.
    pub fn new() -> Self {
        Self::with_config(PaleoThresholds::default(), ShapeRanks::default())
    }

    /// As [`Self::new`], but with caller-supplied thresholds/ranks (e.g.
    /// loaded from a config file, per the Ambient Stack's Configuration
    /// section).
    pub fn with_config(thresholds: PaleoThresholds, ranks: ShapeRanks) -> Self {
        Self {
            thresholds,
            ranks,
            last_type: None,
            last_stroke: None,
        }
    }

    /// `pal_recognize(stroke) -> shape_type`: preprocesses the stroke, runs
    /// all nine testers, resolves the hierarchy, and returns the winning
    /// entry's kind. The hierarchy always yields a top entry for a
    /// non-empty stroke (spec.md §6 "Hierarchy defaultness"), so the only
    /// error this can return is preprocessing's `TooShort`.
    pub fn recognize(&mut self, stroke: &Stroke) -> Result<ShapeKind, RecognizeError> {
        let (kind, _shape, enriched) = self.recognize_shape(stroke)?;
        self.last_type = Some(kind);
        self.last_stroke = Some(enriched);
        Ok(kind)
    }

    /// As [`Self::recognize`], but returns the winning `Shape` payload too
    /// (center, radius, control points, ...) instead of only its kind.
    pub fn recognize_with_shape(
        &mut self,
        stroke: &Stroke,
    ) -> Result<(ShapeKind, Shape), RecognizeError> {
        let (kind, shape, enriched) = self.recognize_shape(stroke)?;
        self.last_type = Some(kind);
        self.last_stroke = Some(enriched);
        Ok((kind, shape))
    }

    fn recognize_shape(
        &self,
        stroke: &Stroke,
    ) -> Result<(ShapeKind, Shape, EnrichedStroke), RecognizeError> {
        let enriched = preprocess::preprocess(stroke, &self.thresholds)?;
        debug!(
            num_corners = enriched.num_corners(),
            dcr = enriched.dcr,
            overtraced = enriched.overtraced,
            closed = enriched.closed,
            "preprocessed stroke"
        );

        let results = TesterResults {
            line: line::line_test(&enriched, &self.thresholds),
            pline: line::pline_test(&enriched, &self.thresholds),
            circle: ellipse::circle_test(&enriched, &self.thresholds),
            ellipse: ellipse::ellipse_test(&enriched, &self.thresholds),
            arc: arc::arc_test(&enriched, &self.thresholds),
            curve: curve::curve_test(&enriched, &self.thresholds),
            spiral: spiral::spiral_test(&enriched, &self.thresholds),
            helix: helix::helix_test(&enriched, &self.thresholds),
            composite: composite_test(&enriched, &self.thresholds),
        };

        let hier = hierarchy::resolve(&enriched, results, &self.ranks, &self.thresholds);
        let (kind, shape) = hier
            .into_entries()
            .into_iter()
            .next()
            .expect("hierarchy step 15 guarantees a non-empty interpretation list");
        debug!(?kind, "hierarchy resolved");

        Ok((kind, shape, enriched))
    }

    /// `pal_last_type()`: the kind classified by the most recent
    /// successful [`Self::recognize`] call, or `None` before the first one.
    pub fn last_type(&self) -> Option<ShapeKind> {
        self.last_type
    }

    /// `pal_last_stroke()`: the enriched stroke produced by the most recent
    /// successful [`Self::recognize`] call.
    pub fn last_stroke(&self) -> Option<&EnrichedStroke> {
        self.last_stroke.as_ref()
    }
}

impl Default for PaleoRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

/// `pal_shape_rank(type, shape) -> int` (spec.md §6): exposed standalone so
/// a caller can rank a hypothetical `(kind, shape)` pair without driving a
/// full recognition call, exactly as the C API allows.
pub fn pal_shape_rank(kind: ShapeKind, shape: &Shape, ranks: &ShapeRanks) -> i32 {
    hierarchy::rank_of(kind, shape, ranks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_straight_line() {
        let s = Stroke::from_points(&[(0, 0, 0), (100, 0, 10), (200, 0, 20)]);
        let mut rec = PaleoRecognizer::new();
        let kind = rec.recognize(&s).unwrap();
        assert!(matches!(kind, ShapeKind::Line | ShapeKind::PolyLine));
        assert_eq!(rec.last_type(), Some(kind));
        assert!(rec.last_stroke().is_some());
    }

    #[test]
    fn test_recognize_empty_stroke_errors() {
        let s = Stroke::create(0);
        let mut rec = PaleoRecognizer::new();
        assert!(rec.recognize(&s).is_err());
    }

    #[test]
    fn test_pal_shape_rank_matches_hierarchy_constant() {
        let ranks = ShapeRanks::default();
        let circle = Shape::Circle(crate::shapes::Circle {
            c: [0.0, 0.0],
            r: 10.0,
        });
        assert_eq!(pal_shape_rank(ShapeKind::Circle, &circle, &ranks), ranks.circle);
    }

    #[test]
    fn test_recognizer_default_matches_new() {
        let mut a = PaleoRecognizer::new();
        let mut b = PaleoRecognizer::default();
        let s = Stroke::from_points(&[(0, 0, 0), (50, 0, 5), (100, 0, 10)]);
        assert_eq!(a.recognize(&s).unwrap(), b.recognize(&s).unwrap());
    }
}
