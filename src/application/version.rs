//! Optimistic version checks shared by the catalog services.

use std::fmt::Display;

use crate::error::{Error, Result};

/// Fail with [`Error::Conflict`] when the caller expected a different
/// version than the one stored.
pub(crate) fn check_version(
    entity: &str,
    id: impl Display,
    expected: Option<i32>,
    actual: i32,
) -> Result<()> {
    match expected {
        Some(expected) if expected != actual => Err(Error::Conflict(format!(
            "{entity} {id} is at version {actual}, expected {expected}"
        ))),
        _ => Ok(()),
    }
}
