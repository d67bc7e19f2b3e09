pub mod probe_lru;

pub use probe_lru::{DefaultHashBuilder, ProbeLruCache};
