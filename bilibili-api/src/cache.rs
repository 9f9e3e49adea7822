//! Time-bounded cache with single-flight refresh, backed by [`moka`].
//!
//! Each key is in one of three states:
//!
//! - **empty**: nothing cached, or the cached value outlived the TTL
//! - **fresh**: a value stored less than `ttl` ago; returned without I/O
//! - **pending**: one caller is fetching; everyone else blocks on it
//!
//! A failed fetch leaves the key empty and hands the same error to every
//! caller that waited on it. Values are shared as [`Arc`] and never mutated;
//! a refresh replaces the whole value.
//!
//! Entries are stored under `(key, generation)`. [`TtlCache::invalidate_all`]
//! bumps the generation, so a fetch that was already in flight stores its
//! result under a generation nobody reads any more; later callers fetch again.

use crate::error::{BiliError, Result};
use moka::sync::Cache;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Cache of `V` per key `K`, refreshed at most once per TTL window.
pub struct TtlCache<K, V> {
    entries: Cache<(K, u64), Arc<V>>,
    generation: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder().time_to_live(ttl).build(),
            generation: AtomicU64::new(0),
        }
    }

    /// Return the fresh value for `key`, or run `fetch` to produce one.
    ///
    /// Concurrent callers for the same key share a single `fetch` call and
    /// receive the same value or a clone of the same error. `fetch` runs on
    /// the calling thread.
    pub fn get_or_fetch<F>(&self, key: &K, fetch: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        let generation = self.generation.load(Ordering::Acquire);
        let slot = (key.clone(), generation);

        let value = self
            .entries
            .try_get_with(slot.clone(), || {
                log::debug!("cache miss: fetching {key:?}");
                fetch().map(Arc::new)
            })
            .map_err(|e: Arc<BiliError>| {
                log::warn!("cache fetch for {key:?} failed: {e}");
                Arc::unwrap_or_clone(e)
            })?;

        // Invalidated mid-fetch: the result belongs to this call only.
        if self.generation.load(Ordering::Acquire) != generation {
            log::debug!("cache: discarding {key:?} fetched before invalidation");
            self.entries.invalidate(&slot);
        }
        Ok(value)
    }

    /// Drop every cached value, including results of fetches still in flight.
    pub fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn fresh_value_is_served_without_fetch() {
        let cache = TtlCache::new(HOUR);
        let calls = AtomicUsize::new(0);
        let fetch = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        };
        assert_eq!(*cache.get_or_fetch(&"k", fetch).unwrap(), 42);
        assert_eq!(*cache.get_or_fetch(&"k", fetch).unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn expired_value_triggers_one_refetch() {
        let cache = TtlCache::new(Duration::from_millis(200));
        let calls = AtomicUsize::new(0);
        let fetch = || Ok(calls.fetch_add(1, Ordering::SeqCst));
        assert_eq!(*cache.get_or_fetch(&"k", fetch).unwrap(), 0);
        thread::sleep(Duration::from_millis(300));
        assert_eq!(*cache.get_or_fetch(&"k", fetch).unwrap(), 1);
        assert_eq!(*cache.get_or_fetch(&"k", fetch).unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn keys_are_independent() {
        let cache = TtlCache::new(HOUR);
        assert_eq!(*cache.get_or_fetch(&1, || Ok("a")).unwrap(), "a");
        assert_eq!(*cache.get_or_fetch(&2, || Ok("b")).unwrap(), "b");
        assert_eq!(*cache.get_or_fetch(&1, || Ok("z")).unwrap(), "a");
    }

    #[test]
    fn failure_is_not_cached() {
        let cache: TtlCache<&str, u32> = TtlCache::new(HOUR);
        let err = cache
            .get_or_fetch(&"k", || Err(BiliError::Status(502)))
            .unwrap_err();
        assert!(matches!(err, BiliError::Status(502)));
        assert_eq!(*cache.get_or_fetch(&"k", || Ok(7)).unwrap(), 7);
    }

    #[test]
    fn invalidate_forces_refetch() {
        let cache = TtlCache::new(HOUR);
        cache.get_or_fetch(&"k", || Ok(1)).unwrap();
        cache.invalidate_all();
        assert_eq!(*cache.get_or_fetch(&"k", || Ok(2)).unwrap(), 2);
        assert_eq!(*cache.get_or_fetch(&"k", || Ok(3)).unwrap(), 2);
    }

    #[test]
    fn invalidate_during_fetch_discards_its_result() {
        let cache = TtlCache::new(HOUR);

        let (early, late) = thread::scope(|scope| {
            let slow = scope.spawn(|| {
                cache
                    .get_or_fetch(&"nav", || {
                        thread::sleep(Duration::from_millis(300));
                        Ok("anonymous")
                    })
                    .unwrap()
            });
            thread::sleep(Duration::from_millis(100));
            cache.invalidate_all();
            let late = cache.get_or_fetch(&"nav", || Ok("logged-in")).unwrap();
            (slow.join().unwrap(), late)
        });

        assert_eq!(*early, "anonymous");
        assert_eq!(*late, "logged-in");
        let after = cache.get_or_fetch(&"nav", || Ok("refetched")).unwrap();
        assert_eq!(*after, "logged-in");
    }

    #[test]
    fn concurrent_callers_share_one_fetch() {
        const N: usize = 16;
        let cache = TtlCache::new(HOUR);
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(N);

        let results: Vec<Arc<String>> = thread::scope(|scope| {
            let handles: Vec<_> = (0..N)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache
                            .get_or_fetch(&"nav", || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                thread::sleep(Duration::from_millis(100));
                                Ok("metadata".to_owned())
                            })
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|v| Arc::ptr_eq(v, &results[0])));
    }

    #[test]
    fn concurrent_callers_share_one_error() {
        const N: usize = 8;
        let cache: TtlCache<&str, u32> = TtlCache::new(HOUR);
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(N);

        let errors: Vec<BiliError> = thread::scope(|scope| {
            let handles: Vec<_> = (0..N)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache
                            .get_or_fetch(&"nav", || {
                                calls.fetch_add(1, Ordering::SeqCst);
                                thread::sleep(Duration::from_millis(100));
                                Err(BiliError::Api {
                                    code: -412,
                                    message: "请求被拦截".into(),
                                })
                            })
                            .unwrap_err()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, BiliError::Api { code: -412, .. }))
        );
    }

    #[test]
    fn panicking_fetch_releases_key() {
        let cache: TtlCache<&str, u32> = TtlCache::new(HOUR);
        let panicked = thread::scope(|scope| {
            scope
                .spawn(|| cache.get_or_fetch(&"k", || panic!("boom")))
                .join()
                .is_err()
        });
        assert!(panicked);
        assert_eq!(*cache.get_or_fetch(&"k", || Ok(3)).unwrap(), 3);
    }
}
