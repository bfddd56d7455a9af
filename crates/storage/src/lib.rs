mod recipes;
mod seed;

pub mod cache;
pub mod error;
pub mod store;

pub use cache::{Cache, KVCache, lru::LocalCache, redis::RedisCache};
pub use recipes::RECIPES_CACHE_KEY;
pub use seed::parse_seed;
pub use store::{RecipeStore, Store, memory::MemoryStore, postgres::PgStore};

/// Recipe store with the list cache layered on top.
///
/// The store is authoritative; the cache only ever holds a serialized
/// snapshot of the full list and is dropped on every successful write.
#[derive(Clone)]
pub struct Storage<S = Store, C = Cache> {
    store: S,
    cache: C,
}

impl<S: RecipeStore, C: KVCache> Storage<S, C> {
    pub fn new(store: S, cache: C) -> Self {
        Self { store, cache }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }
}
