use futures::Future;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::pin::Pin;
use std::time::{Duration, SystemTime};

/// Source of truth queried on cache misses. Resolving to `None` is a
/// valid answer (unknown key) and is cached like any other value.
pub trait ValueResolver {
    type Key: Clone;
    type Value: Clone;
    type Error;

    fn resolve<'a>(
        &self,
        key: &Self::Key,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Self::Value>, Self::Error>> + 'a>>;
}

pub struct AutoResolveCache<R>
where
    R: ValueResolver,
    <R as ValueResolver>::Key: Eq + Hash + std::fmt::Debug,
{
    inner: TtlCache<<R as ValueResolver>::Key, Option<<R as ValueResolver>::Value>>,
    resolver: R,
}

impl<R> AutoResolveCache<R>
where
    R: ValueResolver,
    <R as ValueResolver>::Key: Eq + Hash + std::fmt::Debug,
    <R as ValueResolver>::Error: std::fmt::Debug,
{
    pub fn new(ttl: Duration, capacity: usize, resolver: R) -> Self {
        Self {
            inner: TtlCache::new(ttl, capacity),
            resolver,
        }
    }

    /// Resolver failures are logged and reported as a miss, not cached.
    pub async fn get_or_resolve(
        &mut self,
        key: &<R as ValueResolver>::Key,
    ) -> Option<<R as ValueResolver>::Value> {
        match self.inner.get(key) {
            Some(hit) => hit,
            None => match self.resolver.resolve(key).await {
                Ok(v) => {
                    self.inner.insert(key.clone(), v.clone());
                    v
                }
                Err(e) => {
                    log::error!("Error resolving key '{:?}': {:?}", key, e);
                    None
                }
            },
        }
    }
}

impl<R> Default for AutoResolveCache<R>
where
    R: ValueResolver + Default,
    <R as ValueResolver>::Key: Eq + Hash + std::fmt::Debug,
    <R as ValueResolver>::Error: std::fmt::Debug,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(2), 1024, R::default())
    }
}

/// Bounded map with per-entry expiry. Insertion order doubles as the
/// eviction order.
pub struct TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    map: HashMap<K, (SystemTime, V)>,
    order: VecDeque<(SystemTime, K)>,
    ttl: Duration,
    capacity: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            map: HashMap::new(),
            order: VecDeque::new(),
            ttl,
            capacity,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.map
            .get(key)
            .and_then(|entry| (entry.0 + self.ttl >= SystemTime::now()).then(|| entry.1.clone()))
    }

    pub fn insert(&mut self, key: K, value: V) {
        while self.map.len() >= self.capacity {
            match self.order.pop_front() {
                Some((time, old_key)) => {
                    // A re-inserted key leaves a stale entry in the queue,
                    // drop from the map only when the timestamps agree.
                    if self.map.get(&old_key).map(|e| e.0) == Some(time) {
                        self.map.remove(&old_key);
                    }
                }
                None => break,
            }
        }

        let now = SystemTime::now();
        self.order.push_back((now, key.clone()));
        self.map.insert(key, (now, value));
    }
}
