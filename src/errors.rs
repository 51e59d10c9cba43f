// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Input rejected before it reaches the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid id '{0}'")]
    InvalidId(String),
    #[error("Amount must not be negative, got {0}")]
    NegativeAmount(String),
    #[error("Amount {0} must be at most 1000000000000 with at most 2 decimals")]
    AmountOutOfRange(String),
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Unknown category '{0}', expected fisse|variabili|svago|risparmi")]
    UnknownCategory(String),
    #[error("Unknown transaction type '{0}', expected income|expense")]
    UnknownKind(String),
    #[error("Day of month {0} out of range 1..=31")]
    DayOutOfRange(u32),
    #[error("Invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}
