use thiserror::Error;

/// Recoverable errors from [`crate::shortest_graphlike_undetectable_logical_error`]
/// and [`crate::find_undetectable_logical_error`].
#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("error target with {weight} detector symptoms is not graphlike (at most 2 allowed); pass ignore_ungraphlike_errors to skip it instead")]
    UngraphlikeError { weight: usize },

    #[error("no undetectable logical error exists within the explored search space")]
    NoUndetectableLogicalError,
}
