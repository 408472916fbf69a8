pub mod layered;
pub mod local_tier;
pub mod null_cache;
pub mod redis_cache;
pub mod scan_cache;
pub mod service;

pub use layered::TieredCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use scan_cache::{NullScanCache, RedisScanCache, ScanCache};
pub use service::{CacheError, CacheResult, LinkCache};
