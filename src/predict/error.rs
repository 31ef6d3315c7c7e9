use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("propagation failed at {at}: {message}")]
    Propagation { at: DateTime<Utc>, message: String },
    #[error("pass scan exceeded its time budget of {budget:?} (elapsed {elapsed:?})")]
    TimedOut {
        budget: std::time::Duration,
        elapsed: std::time::Duration,
    },
}
