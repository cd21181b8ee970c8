use serde::Serialize;

/// Loading/error/data state of a fetched value.
///
/// Replaces a `{ loading, error, data }` triple: a value is either still
/// loading, failed without data, or ready. `Ready` with an empty collection
/// is a legitimate result (e.g. a brand-new pool without history).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "lowercase")]
pub enum FetchState<T> {
    Loading,
    Failed,
    Ready(T),
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        FetchState::Loading
    }
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchState::Failed)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Ready(data) => Some(data),
            _ => None,
        }
    }

    /// State after a refresh attempt.
    ///
    /// A failed refresh keeps previously ready data; only a value that never
    /// loaded becomes `Failed`.
    pub fn refreshed(self, result: Option<T>) -> Self {
        match (result, self) {
            (Some(data), _) => FetchState::Ready(data),
            (None, FetchState::Ready(previous)) => FetchState::Ready(previous),
            (None, _) => FetchState::Failed,
        }
    }
}

impl<T> From<Option<T>> for FetchState<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(data) => FetchState::Ready(data),
            None => FetchState::Failed,
        }
    }
}
