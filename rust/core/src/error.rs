// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for entity stream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while interpreting the entity stream
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The entity kind has no curve conversion
    #[error("Unsupported entity: {0}")]
    UnsupportedEntity(String),

    /// `$INSUNITS` code with no known length unit
    #[error("Unknown drawing unit code: {0}")]
    UnknownUnitCode(i64),
}
