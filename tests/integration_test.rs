//! End-to-end scenarios (spec.md §8), exercising the public facades rather
//! than internal module APIs.

use std::f64::consts::PI;

use strokeshapes::dollarp::DpContext;
use strokeshapes::paleo::PaleoRecognizer;
use strokeshapes::shapes::{Shape, ShapeKind};
use strokeshapes::stroke::Stroke;

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

fn spiral_stroke(turns: f64, n: usize) -> Stroke {
    let mut s = Stroke::create(n);
    for i in 0..n {
        let t = i as f64 / (n as f64 - 1.0);
        let theta = t * turns * 2.0 * PI;
        let r = 10.0 + t * 90.0;
        s.append(
            (200.0 + r * theta.cos()) as i64,
            (200.0 + r * theta.sin()) as i64,
            i as i64 * 5,
        );
    }
    s
}

/// Scenario 1: `[(0,0,0),(100,0,10),(200,0,20)]` -> LINE.
#[test]
fn test_scenario_straight_line() {
    let s = Stroke::from_points(&[(0, 0, 0), (100, 0, 10), (200, 0, 20)]);
    let mut rec = PaleoRecognizer::new();
    let kind = rec.recognize(&s).unwrap();
    assert_eq!(kind, ShapeKind::Line);
}

/// Scenario 2: two right-angle turns -> POLYLINE with 3 corners.
#[test]
fn test_scenario_polyline_with_three_corners() {
    let s = Stroke::from_points(&[(0, 0, 0), (100, 0, 10), (100, 100, 20), (200, 100, 30)]);
    let mut rec = PaleoRecognizer::new();
    let kind = rec.recognize(&s).unwrap();
    assert_eq!(kind, ShapeKind::PolyLine);
    assert_eq!(rec.last_stroke().unwrap().num_corners(), 3);
}

/// Scenario 3: 64 points on the unit circle scaled to radius 100 about
/// (200,200) -> CIRCLE, fitted r ~= 100, center ~= (200,200).
#[test]
fn test_scenario_circle() {
    let s = circle_stroke(200.0, 200.0, 100.0, 64);
    let mut rec = PaleoRecognizer::new();
    let (kind, shape) = rec.recognize_with_shape(&s).unwrap();
    assert_eq!(kind, ShapeKind::Circle);
    if let Shape::Circle(c) = shape {
        assert!((c.r - 100.0).abs() < 10.0, "r = {}", c.r);
        assert!((c.c[0] - 200.0).abs() < 10.0, "cx = {}", c.c[0]);
        assert!((c.c[1] - 200.0).abs() < 10.0, "cy = {}", c.c[1]);
    } else {
        panic!("expected a circle shape");
    }
}

/// Scenario 4: 64 points on an Archimedean spiral with >= 2 full turns,
/// endpoints far apart -> SPIRAL, `cw` matches the traversal sign.
#[test]
fn test_scenario_spiral() {
    let s = spiral_stroke(3.0, 96);
    let mut rec = PaleoRecognizer::new();
    let (kind, shape) = rec.recognize_with_shape(&s).unwrap();
    assert_eq!(kind, ShapeKind::Spiral);
    if let Shape::Spiral(spiral) = shape {
        let pts = rec.last_stroke().unwrap().points();
        let expected_cw = (pts[pts.len() - 1].dir - pts[0].dir) < 0.0;
        assert_eq!(spiral.cw, expected_cw);
    } else {
        panic!("expected a spiral shape");
    }
}

/// Scenario 5: template library {X: two crossing diagonals, O: circle};
/// query: noisy circle -> returns O with score > 0.5.
#[test]
fn test_scenario_dollarp_matches_noisy_circle_to_circle_template() {
    let mut ctx = DpContext::create();
    ctx.add_template(
        &Stroke::from_points(&[
            (0, 0, 0),
            (50, 50, 10),
            (100, 100, 20),
            (100, 0, 30),
            (50, 50, 40),
            (0, 100, 50),
        ]),
        "X",
    );
    ctx.add_template(&circle_stroke(0.0, 0.0, 100.0, 64), "O");

    let mut query = Stroke::create(48);
    for i in 0..48 {
        let theta = 2.0 * PI * (i as f64) / 47.0;
        let jitter = if i % 2 == 0 { 4.0 } else { -4.0 };
        query.append(
            (300.0 + (100.0 + jitter) * theta.cos()) as i64,
            (300.0 + (100.0 + jitter) * theta.sin()) as i64,
            i as i64 * 5,
        );
    }

    let result = ctx.recognize(&query);
    assert_eq!(result.template.as_deref(), Some("O"));
    assert!(
        result.score > 0.5,
        "expected score > 0.5, got {}",
        result.score
    );
}

/// Scenario 6: empty library -> score = 0.
#[test]
fn test_scenario_dollarp_empty_library_scores_zero() {
    let ctx = DpContext::create();
    let query = circle_stroke(0.0, 0.0, 50.0, 32);
    let result = ctx.recognize(&query);
    assert_eq!(result.template, None);
    assert_eq!(result.score, 0.0);
}

/// Hierarchy defaultness: `recognize` never returns "unknown" for a
/// non-empty stroke, and always produces *some* top entry.
#[test]
fn test_hierarchy_always_resolves_on_noisy_scribble() {
    let s = Stroke::from_points(&[
        (0, 0, 0),
        (37, 12, 5),
        (5, 80, 11),
        (120, 3, 16),
        (60, 60, 22),
        (0, 90, 28),
    ]);
    let mut rec = PaleoRecognizer::new();
    assert!(rec.recognize(&s).is_ok());
}
