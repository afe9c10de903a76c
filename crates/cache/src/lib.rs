pub mod error;
pub mod redis_cache;
pub mod session;

pub use error::{CacheError, Result};
pub use redis_cache::{session_cache_key, Cache, CacheConfig};
pub use session::{MemorySessionStore, SessionRecord, SessionStore};
