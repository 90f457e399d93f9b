//! CopyTube copies a public YouTube playlist into a new private playlist on the
//! authenticated user's channel, up to [`writer::MAX_COPY_ITEMS`] videos.

pub mod app;
pub mod creator;
pub mod error;
pub mod progress;
pub mod reader;
pub mod validate;
pub mod writer;

pub use app::{CopyConfig, CopySummary, LineSource, RunOutcome, run};
pub use error::CopyError;
pub use reader::PlaylistSnapshot;
pub use validate::{PlaylistReference, Validation, validate};
