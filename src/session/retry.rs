//! Per-request retry policy for authorization failures.
//!
//! A request starts `Fresh`. The first 401 moves it to `Retried` and asks for
//! a token refresh followed by one reissue. A 401 on a `Retried` request is
//! final.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryState {
    #[default]
    Fresh,
    Retried,
}

/// What to do after a 401
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    RefreshAndRetry,
    GiveUp,
}

impl RetryState {
    /// Consume one unauthorized response, advancing the state
    pub fn on_unauthorized(&mut self) -> RetryDecision {
        match self {
            RetryState::Fresh => {
                *self = RetryState::Retried;
                RetryDecision::RefreshAndRetry
            }
            RetryState::Retried => RetryDecision::GiveUp,
        }
    }

    pub fn is_retry(&self) -> bool {
        *self == RetryState::Retried
    }
}
