//! Per-path tessellation cache: avoids re-triangulating
//! and re-stroking paths whose geometry did not change since the previous
//! frame, keyed by [`crate::render_path::RenderPath::id`].
//!
//! An `lru::LruCache` wrapping a plain position-only triangle list, since
//! tessellation is produced by [`crate::triangulate`].

use crate::geometry::Vec2;
use lru::LruCache;
use std::num::NonZeroUsize;

/// A cached triangle list: flat, position-only, `len() % 3 == 0`.
pub type CachedMesh = Vec<Vec2>;

pub struct Cache {
    tessellation_cache: LruCache<u64, CachedMesh>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache {
    pub fn new() -> Self {
        Self { tessellation_cache: LruCache::new(NonZeroUsize::new(4096).unwrap()) }
    }

    pub fn get(&mut self, cache_key: u64) -> Option<&CachedMesh> {
        self.tessellation_cache.get(&cache_key)
    }

    pub fn insert(&mut self, cache_key: u64, mesh: CachedMesh) {
        self.tessellation_cache.put(cache_key, mesh);
    }

    pub fn invalidate(&mut self, cache_key: u64) {
        self.tessellation_cache.pop(&cache_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_get_round_trips() {
        let mut cache = Cache::new();
        let mesh = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        cache.insert(7, mesh.clone());
        assert_eq!(cache.get(7), Some(&mesh));
    }

    #[test]
    fn invalidate_removes_entry() {
        let mut cache = Cache::new();
        cache.insert(1, vec![]);
        cache.invalidate(1);
        assert!(cache.get(1).is_none());
    }
}
