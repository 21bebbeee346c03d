//! Client-side analysis session for a dog breed identification service.
//!
//! A [`BarklensSession`] accepts a photo, performs one multipart POST
//! against the remote service, and exposes the outcome as a single
//! [`AnalysisState`]: idle, analyzing, succeeded with a [`BreedReport`],
//! or failed with a user-facing message. Heterogeneous error payloads are
//! normalized through [`extract_api_error`], and overlapping submissions
//! resolve with last-submission-wins semantics.

pub mod config;
pub mod error;
pub mod report;
pub mod session;

pub use config::{ANALYZE_ROUTE, BarklensConfig, DEFAULT_BASE_URL};
pub use error::{AnalyzeError, extract_api_error};
pub use report::{BreedReport, Prediction};
pub use session::{AnalysisState, BarklensSession, PhotoUpload};
