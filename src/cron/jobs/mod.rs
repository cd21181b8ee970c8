pub mod export_snapshot;
pub mod refresh_pools;
pub mod refresh_protocol;
pub mod refresh_tokens;

use std::fmt::Display;

use log::warn;

use crate::models::FetchState;

/// Fold a refresh result into a stored value, keeping old data on failure.
pub(crate) fn refresh<T>(slot: &mut FetchState<T>, value: Option<T>) {
    *slot = std::mem::take(slot).refreshed(value);
}

/// `Ok` value, or `None` after logging the error.
pub(crate) fn ok_or_warn<T>(result: anyhow::Result<T>, what: impl Display) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to fetch {}: {:#}", what, e);
            None
        },
    }
}
