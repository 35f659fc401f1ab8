// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for import and pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while importing curves or running the ring pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] cad_rings_geometry::Error),

    #[error(transparent)]
    Core(#[from] cad_rings_core::Error),

    /// Spline definition the evaluator cannot sample
    #[error("Curve evaluation failed: {0}")]
    CurveEvaluation(String),

    #[error("Report serialization failed: {0}")]
    Report(#[from] serde_json::Error),
}

impl Error {
    pub fn curve(msg: impl Into<String>) -> Self {
        Error::CurveEvaluation(msg.into())
    }
}
