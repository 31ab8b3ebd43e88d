//! The core's error taxonomy.
//!
//! Only two kinds are representable as `Result`s: a lookup miss is a silent
//! no-op (see [`crate::book::CancelOutcome`] / [`crate::book::ModifyOutcome`])
//! and internal-invariant violations are `debug_assert!`s, not recoverable
//! errors — they crash-stop rather than being laundered through `Result`.

use thiserror::Error;

use crate::ids::OrderId;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    /// `add` was called with an `id` already resting in the book.
    #[error("order id {0} already exists in the book")]
    DuplicateId(OrderId),

    /// `shares`/`new_shares` was not strictly positive. The textual driver
    /// validates before ever calling the core, so in practice this only
    /// fires when a caller bypasses the driver.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

pub type BookResult<T> = Result<T, BookError>;
