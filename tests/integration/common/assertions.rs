//! Assertions over dispatch results.

#![allow(dead_code)]

use ccxt_dispatch::error::{ErrorKind, Result};

/// Asserts that `result` failed with `kind` and returns the error.
#[track_caller]
pub fn assert_error_kind<T: std::fmt::Debug>(
    result: Result<T>,
    kind: ErrorKind,
) -> ccxt_dispatch::Error {
    match result {
        Ok(value) => panic!("expected {kind} error, got Ok({value:?})"),
        Err(err) => {
            assert_eq!(err.kind(), kind, "unexpected error: {err}");
            err
        }
    }
}
