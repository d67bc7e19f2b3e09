//! Error types for the probecache library.
//!
//! ## Key Components
//!
//! - [`CreateError`]: Returned by fallible constructors when the requested
//!   capacity is invalid or slot storage cannot be allocated.
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (debug-only `check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use probecache::error::CreateError;
//! use probecache::policy::probe_lru::ProbeLruCache;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache: Result<ProbeLruCache<String, i32>, CreateError> =
//!     ProbeLruCache::try_new(64);
//! assert!(cache.is_ok());
//!
//! // Zero capacity is caught without panicking
//! let bad = ProbeLruCache::<String, i32>::try_new(0);
//! assert!(matches!(bad, Err(CreateError::ZeroCapacity)));
//! ```

use std::collections::TryReserveError;
use std::fmt;

// ---------------------------------------------------------------------------
// CreateError
// ---------------------------------------------------------------------------

/// Error returned when a cache cannot be constructed.
///
/// Produced by fallible constructors such as
/// [`ProbeLruCache::try_new`](crate::policy::probe_lru::ProbeLruCache::try_new).
/// No partial cache exists after a failed construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// The requested capacity was zero. A cache needs at least one slot, and
    /// at least two to ever hold an entry (one slot always stays free).
    ZeroCapacity,
    /// Slot storage could not be reserved.
    Alloc(TryReserveError),
}

impl fmt::Display for CreateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateError::ZeroCapacity => f.write_str("capacity must be > 0"),
            CreateError::Alloc(err) => write!(f, "failed to allocate slot storage: {err}"),
        }
    }
}

impl std::error::Error for CreateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CreateError::ZeroCapacity => None,
            CreateError::Alloc(err) => Some(err),
        }
    }
}

impl From<TryReserveError> for CreateError {
    fn from(err: TryReserveError) -> Self {
        CreateError::Alloc(err)
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by debug-only `check_invariants` methods on cache types
/// (e.g. [`ProbeLruCache::check_invariants`](crate::policy::probe_lru::ProbeLruCache::check_invariants)).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- CreateError ------------------------------------------------------

    #[test]
    fn create_display_zero_capacity() {
        let err = CreateError::ZeroCapacity;
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn create_debug_includes_variant() {
        let err = CreateError::ZeroCapacity;
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("ZeroCapacity"));
    }

    #[test]
    fn create_clone_and_eq() {
        let a = CreateError::ZeroCapacity;
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn create_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<CreateError>();
    }

    #[test]
    fn create_from_try_reserve() {
        let mut v: Vec<u8> = Vec::new();
        let err = v.try_reserve_exact(usize::MAX).unwrap_err();
        let create: CreateError = err.into();
        assert!(matches!(create, CreateError::Alloc(_)));
        assert!(create.to_string().contains("slot storage"));
    }

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("recency length mismatch");
        assert_eq!(err.to_string(), "recency length mismatch");
    }

    #[test]
    fn invariant_debug_includes_message() {
        let err = InvariantError::new("unreachable slot");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("unreachable slot"));
    }

    #[test]
    fn invariant_message_accessor() {
        let err = InvariantError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }
}
