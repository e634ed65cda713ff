//! Pen-stroke shape recognition: a PaleoSketch-style geometric recognizer
//! and a $P-style point-cloud gesture matcher over the same stroke model.
//!
//! See [`paleo::PaleoRecognizer`] for the geometric engine and
//! [`dollarp::DpContext`] for the point-cloud engine; both consume
//! [`stroke::Stroke`].

pub mod config;
pub mod csv_data;
pub mod data;
pub mod dollarp;
pub mod error;
pub mod geometry;
pub mod hierarchy;
pub mod paleo;
pub mod preprocess;
pub mod shapes;
pub mod stroke;
pub mod testers;

pub use config::{DpOptions, PaleoThresholds, ShapeRanks};
pub use dollarp::{DpContext, DpMatch, Template};
pub use error::{DataError, RecognizeError};
pub use paleo::{pal_shape_rank, PaleoRecognizer};
pub use shapes::{Shape, ShapeKind};
pub use stroke::{Point, Stroke};
