// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during geometry processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Degenerate or non-finite input (zero radius, zero-length line, NaN, ...)
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Operation needs at least one line string
    #[error("Empty geometry: {0}")]
    EmptyGeometry(String),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidGeometry(msg.into())
    }
}
