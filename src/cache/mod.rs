//! Tiered cache: L1 exact match, L2 durable key/value, L3 approximate
//! semantic match.

pub mod key;
pub mod l1;
pub mod l2;
pub mod l3;

pub use key::{cache_key, cosine_similarity};
pub use l1::{ExactCache, ExactCacheHandle};
pub use l2::{KVCache, KvCacheError, RedisCache};
#[cfg(any(test, feature = "mock"))]
pub use l2::MockKVCache;
pub use l3::{SemanticCache, SemanticCacheHandle};
