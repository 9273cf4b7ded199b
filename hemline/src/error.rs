//! Error types.

use std::collections::TryReserveError;

/// Errors produced by fallible hemline operations.
///
/// Operations that fail never leave an instance half-modified: either the
/// whole write (possibly truncated to the capacity) is applied, or nothing
/// is.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  /// The memory is not a valid instance, or the request is degenerate (for
  /// example, duplicating an empty string).
  #[error("invalid argument: {0}")]
  InvalidArgument(&'static str),

  /// The instance is read-only.
  #[error("instance is read-only")]
  ReadOnly,

  /// The instance has no used-length counter, so its length cannot change.
  #[error("instance has a fixed length")]
  FixedLength,

  /// A search found nothing.
  #[error("not found")]
  NotFound,

  /// An index, or a start/end pair, lies outside the addressable window.
  #[error("index out of range")]
  OutOfRange,

  /// The allocator could not satisfy a request for backing storage.
  #[error("allocation failed: {0}")]
  Alloc(#[from] TryReserveError),
}

/// A `Result` specialized to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;
