// Service exports
pub mod cache;

pub use cache::{CacheStats, SolutionCache};
