use thiserror::Error;

/// Caller-facing search failures.
///
/// Dead-end branches and action-budget exhaustion are handled inside the
/// search (pruned silently) and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A full search run produced zero plans.
    #[error("no plan found for goal `{goal}`")]
    NoPlanFound { goal: String },

    /// The cancellation signal was observed before any plan was produced.
    #[error("search cancelled before any plan was found")]
    Cancelled,
}
