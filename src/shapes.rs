//! Fitted shape records and the common test-result envelope.
//!
//! Grounded on the `line_t`/`circle_t`/`ellipse_t`/`arc_t`/`curve_t`/
//! `spiral_t`/`helix_t` structs scattered across `libsr/src/paleo/*.h`, and
//! on the "Tagged result variants" design note in spec.md §9: the
//! hierarchy's `switch`-and-cast over a `pal_type_e` tag becomes a sum type
//! here.

use crate::geometry::Vec2;

/// A fitted straight line, `p0 -> p1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub p0: Vec2,
    pub p1: Vec2,
}

/// A fitted poly-line through a sequence of corner points.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyLine {
    pub pts: Vec<Vec2>,
}

/// A fitted circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub c: Vec2,
    pub r: f64,
}

/// A fitted ellipse, with both axis endpoints retained for feature-area
/// integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub c: Vec2,
    pub major_a: Vec2,
    pub major_b: Vec2,
    pub minor_a: Vec2,
    pub minor_b: Vec2,
    pub maj: f64,
    pub min: f64,
}

/// A fitted circular arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub c: Vec2,
    pub r: f64,
    pub theta0: f64,
    pub theta1: f64,
    pub cw: bool,
}

/// A fitted cubic Bézier curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    pub control_points: [Vec2; 4],
}

/// A fitted Archimedean spiral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spiral {
    pub center: Vec2,
    pub r: f64,
    pub theta_t: f64,
    pub theta_f: f64,
    /// `true` for clockwise (matches `sign(dir_last - dir_first)`).
    pub cw: bool,
}

/// A fitted helix: a spiral plus an axial pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Helix {
    pub center: Vec2,
    pub r: f64,
    pub theta_t: f64,
    pub theta_f: f64,
    pub cw: bool,
    pub pitch: f64,
}

/// A recursive decomposition of the stroke into sub-shapes, segmented at
/// corners.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub sub_shapes: Vec<(ShapeKind, Shape)>,
}

impl Composite {
    /// `true` when every sub-shape is a line or poly-line.
    pub fn is_line(&self) -> bool {
        self.sub_shapes
            .iter()
            .all(|(k, _)| matches!(k, ShapeKind::Line | ShapeKind::PolyLine))
    }
}

/// The shape-kind tag, used by the hierarchy's add-once bitmask and rank
/// lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    PolyLine,
    Circle,
    Ellipse,
    Arc,
    Curve,
    Spiral,
    Helix,
    Composite,
}

pub const SHAPE_KIND_COUNT: usize = 9;

impl ShapeKind {
    pub fn index(self) -> usize {
        match self {
            ShapeKind::Line => 0,
            ShapeKind::PolyLine => 1,
            ShapeKind::Circle => 2,
            ShapeKind::Ellipse => 3,
            ShapeKind::Arc => 4,
            ShapeKind::Curve => 5,
            ShapeKind::Spiral => 6,
            ShapeKind::Helix => 7,
            ShapeKind::Composite => 8,
        }
    }
}

/// A sum type over every fitted shape record, tagged by `ShapeKind`.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line(Line),
    PolyLine(PolyLine),
    Circle(Circle),
    Ellipse(Ellipse),
    Arc(Arc),
    Curve(Curve),
    Spiral(Spiral),
    Helix(Helix),
    Composite(Composite),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Line(_) => ShapeKind::Line,
            Shape::PolyLine(_) => ShapeKind::PolyLine,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Ellipse(_) => ShapeKind::Ellipse,
            Shape::Arc(_) => ShapeKind::Arc,
            Shape::Curve(_) => ShapeKind::Curve,
            Shape::Spiral(_) => ShapeKind::Spiral,
            Shape::Helix(_) => ShapeKind::Helix,
            Shape::Composite(_) => ShapeKind::Composite,
        }
    }
}

/// Common envelope every shape tester returns (spec.md §3 "Test result").
///
/// A tester that fails sets `possible = false` and `fail_msg`, matching
/// `SET_FAIL`/`context.result->fmsg` in `libsr`'s `test_macros.h` -- this is
/// "no vote," not an error (see `error.rs`).
#[derive(Debug, Clone)]
pub struct TestResult {
    pub possible: bool,
    pub fail_msg: Option<String>,
    /// Feature-area error (meaning is shape-specific: FA, FA/len, or FAE).
    pub fa: f64,
    /// Least-squares error.
    pub lse: f64,
    pub shape: Option<Shape>,
}

impl TestResult {
    pub fn fail(msg: impl Into<String>) -> Self {
        Self {
            possible: false,
            fail_msg: Some(msg.into()),
            fa: f64::INFINITY,
            lse: f64::INFINITY,
            shape: None,
        }
    }

    pub fn pass(shape: Shape, fa: f64, lse: f64) -> Self {
        Self {
            possible: true,
            fail_msg: None,
            fa,
            lse,
            shape: Some(shape),
        }
    }
}
