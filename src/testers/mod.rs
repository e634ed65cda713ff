//! The nine independent shape testers (spec.md §4.5).
//!
//! Each tester inspects the same [`EnrichedStroke`](crate::preprocess::EnrichedStroke)
//! and returns a [`TestResult`](crate::shapes::TestResult) (or, for
//! poly-line, a [`PolyLineResult`](line::PolyLineResult)) independently of
//! the others; [`crate::hierarchy`] is the only place their outputs are
//! compared against each other.

pub mod arc;
pub mod composite;
pub mod curve;
pub mod ellipse;
pub mod helix;
pub mod line;
pub mod spiral;

// Circle shares its fitting/scoring machinery with ellipse in the original
// (`ellipse_test.h` declares both `ellipse_test` and `circle_test`), so
// `circle_test` lives in `ellipse.rs` rather than its own file.
pub use ellipse::circle_test;
