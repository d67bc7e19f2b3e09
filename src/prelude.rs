pub use crate::ds::{IntrusiveList, SlotArena, SlotId};
pub use crate::error::{CreateError, InvariantError};
pub use crate::policy::probe_lru::{DefaultHashBuilder, ProbeLruCache};
pub use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

#[cfg(feature = "metrics")]
pub use crate::metrics::ProbeLruMetricsSnapshot;
