pub mod store;

pub use store::{MemoryRateLimitStore, RateLimitStore, RateLimitStoreError, RedisRateLimitStore};
