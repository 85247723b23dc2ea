//! Server-state cache keyed by logical resource path.
//!
//! One `ServerCache` belongs to one session credential. Entries are created
//! on first read and replaced wholesale by a background refetch whenever a
//! matching key is invalidated. A key that is already refetching ignores
//! further invalidations until the refetch lands, so repeated invalidation
//! within one staleness window costs a single backend call. A first read
//! that an invalidation overtakes fetches again rather than caching data the
//! mutation already replaced.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use fitcoach_adapters::{AdapterError, BackendApi, Envelope};
use parking_lot::Mutex;
use tokio::sync::{broadcast, Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::auth::{SessionCredential, SESSION_TTL};

const EVENT_CAPACITY: usize = 64;
/// Fetches a first read may spend chasing invalidations before giving up on caching.
const MAX_LOAD_ATTEMPTS: usize = 3;
const MAX_SESSIONS: usize = 10_000;

pub fn normalize_key(key: &str) -> String {
    key.trim_matches('/').to_string()
}

/// Selects the cache keys an invalidation applies to.
#[derive(Clone)]
pub enum KeyMatcher {
    Exact(String),
    Prefix(String),
    Predicate(Arc<dyn Fn(&str) -> bool + Send + Sync>),
}

impl KeyMatcher {
    pub fn exact(key: &str) -> Self {
        Self::Exact(normalize_key(key))
    }

    pub fn prefix(prefix: &str) -> Self {
        Self::Prefix(normalize_key(prefix))
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Matches `path` itself, every resource below it and every ancestor collection.
    pub fn related(path: &str) -> Self {
        let path = normalize_key(path);
        Self::predicate(move |key| {
            key == path
                || key.strip_prefix(path.as_str()).is_some_and(|rest| rest.starts_with('/'))
                || path.strip_prefix(key).is_some_and(|rest| rest.starts_with('/'))
        })
    }

    pub fn matches(&self, key: &str) -> bool {
        match self {
            KeyMatcher::Exact(exact) => key == exact,
            KeyMatcher::Prefix(prefix) => key.starts_with(prefix.as_str()),
            KeyMatcher::Predicate(f) => f(key),
        }
    }
}

impl From<&str> for KeyMatcher {
    fn from(key: &str) -> Self {
        Self::exact(key)
    }
}

impl fmt::Debug for KeyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMatcher::Exact(key) => f.debug_tuple("Exact").field(key).finish(),
            KeyMatcher::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            KeyMatcher::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub envelope: Arc<Envelope>,
    pub fetched_at: Instant,
}

impl CacheEntry {
    fn new(key: String, envelope: Envelope) -> Self {
        Self {
            key,
            envelope: Arc::new(envelope),
            fetched_at: Instant::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Refreshed(String),
    RefreshFailed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Settled,
    Refetching,
}

struct Slot {
    entry: CacheEntry,
    freshness: Freshness,
}

/// Settled entries plus a generation counter per key whose first read is
/// still in flight. Both live under one lock so an invalidation cannot slip
/// between a load's generation check and its insert.
#[derive(Default)]
struct Table {
    slots: HashMap<String, Slot>,
    loads: HashMap<String, u64>,
}

pub struct ServerCache {
    backend: Arc<dyn BackendApi>,
    credential: Option<SessionCredential>,
    table: Mutex<Table>,
    loading: AsyncMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
    events: broadcast::Sender<CacheEvent>,
}

impl ServerCache {
    pub fn new(backend: Arc<dyn BackendApi>, credential: Option<SessionCredential>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            backend,
            credential,
            table: Mutex::new(Table::default()),
            loading: AsyncMutex::new(HashMap::new()),
            events,
        }
    }

    pub fn backend(&self) -> &Arc<dyn BackendApi> {
        &self.backend
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_ref().map(SessionCredential::as_str)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    pub fn peek(&self, key: &str) -> Option<CacheEntry> {
        self.table
            .lock()
            .slots
            .get(&normalize_key(key))
            .map(|slot| slot.entry.clone())
    }

    pub fn is_refetching(&self, key: &str) -> bool {
        self.table
            .lock()
            .slots
            .get(&normalize_key(key))
            .is_some_and(|slot| slot.freshness == Freshness::Refetching)
    }

    pub fn len(&self) -> usize {
        self.table.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of per-key load locks currently held or awaited.
    pub async fn pending_loads(&self) -> usize {
        self.loading.lock().await.len()
    }

    async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut loading = self.loading.lock().await;
            Arc::clone(
                loading
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Drops the key's load lock once no other reader is queued on it.
    async fn release(&self, key: &str, guard: OwnedMutexGuard<()>) {
        let mut loading = self.loading.lock().await;
        drop(guard);

        if loading.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            loading.remove(key);
        }
    }

    /// Returns the cached entry for `key`, fetching it on first use.
    ///
    /// Only successful envelopes are stored; a logical failure is handed back
    /// to the caller and the next read asks the backend again.
    pub async fn get(&self, key: &str) -> Result<CacheEntry, AdapterError> {
        let key = normalize_key(key);
        if let Some(entry) = self.peek(&key) {
            return Ok(entry);
        }

        let guard = self.acquire(&key).await;
        let result = self.load(&key).await;
        self.release(&key, guard).await;

        result
    }

    async fn load(&self, key: &str) -> Result<CacheEntry, AdapterError> {
        if let Some(entry) = self.peek(key) {
            return Ok(entry);
        }

        let mut attempt = 1;
        loop {
            let generation = *self.table.lock().loads.entry(key.to_string()).or_insert(0);

            let envelope = match self.backend.fetch(key, self.credential()).await {
                Ok(envelope) => envelope,
                Err(e) => {
                    self.table.lock().loads.remove(key);
                    return Err(e);
                }
            };
            let entry = CacheEntry::new(key.to_string(), envelope);

            let mut table = self.table.lock();
            let invalidated = table.loads.get(key).is_some_and(|current| *current != generation);

            if invalidated && attempt < MAX_LOAD_ATTEMPTS {
                debug!("Read of {key} was invalidated in flight, fetching again");
                attempt += 1;
                continue;
            }

            table.loads.remove(key);
            if invalidated {
                warn!("Read of {key} kept being invalidated, returning it uncached");
            } else if entry.envelope.is_success() {
                table.slots.insert(
                    key.to_string(),
                    Slot {
                        entry: entry.clone(),
                        freshness: Freshness::Settled,
                    },
                );
            }

            return Ok(entry);
        }
    }

    /// Marks every matching entry stale and schedules one background refetch
    /// per key. First reads still in flight for a matching key are told to
    /// fetch again instead of storing what they receive.
    ///
    /// Returns how many keys will be fetched again because of this call.
    pub fn invalidate(self: &Arc<Self>, matcher: &KeyMatcher) -> usize {
        let (keys, interrupted) = {
            let mut table = self.table.lock();
            let keys: Vec<String> = table
                .slots
                .iter_mut()
                .filter(|(key, slot)| slot.freshness == Freshness::Settled && matcher.matches(key))
                .map(|(key, slot)| {
                    slot.freshness = Freshness::Refetching;
                    key.clone()
                })
                .collect();

            let mut interrupted = 0;
            for (key, generation) in table.loads.iter_mut() {
                if matcher.matches(key) {
                    *generation += 1;
                    interrupted += 1;
                }
            }

            (keys, interrupted)
        };

        debug!(
            "Invalidating {matcher:?}: {} refetch(es) scheduled, {interrupted} read(s) in flight",
            keys.len()
        );

        for key in &keys {
            tokio::spawn(refetch(Arc::downgrade(self), key.clone()));
        }

        keys.len() + interrupted
    }

    fn complete_refetch(&self, key: String, result: Result<Envelope, AdapterError>) {
        let event = {
            let mut table = self.table.lock();
            let Some(slot) = table.slots.get_mut(&key) else {
                return;
            };
            slot.freshness = Freshness::Settled;

            match result {
                Ok(envelope) if envelope.is_success() => {
                    slot.entry = CacheEntry::new(key.clone(), envelope);
                    CacheEvent::Refreshed(key)
                }
                Ok(envelope) => {
                    warn!("Refetch of {key} failed: {}", envelope.message);
                    CacheEvent::RefreshFailed(key)
                }
                Err(e) => {
                    warn!("Refetch of {key} failed: {e}");
                    CacheEvent::RefreshFailed(key)
                }
            }
        };

        // Nobody listening is fine.
        let _ = self.events.send(event);
    }
}

async fn refetch(cache: Weak<ServerCache>, key: String) {
    let Some((backend, credential)) = cache
        .upgrade()
        .map(|cache| (Arc::clone(&cache.backend), cache.credential.clone()))
    else {
        return;
    };

    let result = backend
        .fetch(&key, credential.as_ref().map(SessionCredential::as_str))
        .await;

    match cache.upgrade() {
        Some(cache) => cache.complete_refetch(key, result),
        None => debug!("Discarding refetch of {key}: session cache was dropped"),
    }
}

struct Session {
    cache: Arc<ServerCache>,
    last_used: Instant,
}

/// Session-scoped caches, one per credential.
///
/// A cache is only kept once the backend accepted a request made with its
/// credential, see [`retain`](Self::retain). Kept caches are evicted after
/// sitting idle for the session lifetime, and the least recently used one
/// gives way when the map is full.
pub struct SessionCaches {
    backend: Arc<dyn BackendApi>,
    idle_ttl: Duration,
    capacity: usize,
    sessions: Mutex<HashMap<SessionCredential, Session>>,
}

impl SessionCaches {
    pub fn new(backend: Arc<dyn BackendApi>) -> Self {
        Self::with_limits(backend, SESSION_TTL, MAX_SESSIONS)
    }

    pub fn with_limits(backend: Arc<dyn BackendApi>, idle_ttl: Duration, capacity: usize) -> Self {
        Self {
            backend,
            idle_ttl,
            capacity: capacity.max(1),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the kept cache for `credential`, or a fresh one that is not
    /// kept until [`retain`](Self::retain) is called for it.
    pub fn for_credential(&self, credential: &SessionCredential) -> Arc<ServerCache> {
        let mut sessions = self.sessions.lock();
        self.evict_idle(&mut sessions);

        match sessions.get_mut(credential) {
            Some(session) => {
                session.last_used = Instant::now();
                Arc::clone(&session.cache)
            }
            None => Arc::new(ServerCache::new(
                Arc::clone(&self.backend),
                Some(credential.clone()),
            )),
        }
    }

    /// Keeps `cache` for `credential` after the backend accepted a request
    /// made with it. A cache already kept for the credential wins.
    pub fn retain(&self, credential: &SessionCredential, cache: &Arc<ServerCache>) {
        let mut sessions = self.sessions.lock();
        self.evict_idle(&mut sessions);

        if let Some(session) = sessions.get_mut(credential) {
            session.last_used = Instant::now();
            return;
        }

        if sessions.len() >= self.capacity {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_used)
                .map(|(credential, _)| credential.clone());
            if let Some(oldest) = oldest {
                debug!("Session cache limit reached, evicting the least recently used");
                sessions.remove(&oldest);
            }
        }

        sessions.insert(
            credential.clone(),
            Session {
                cache: Arc::clone(cache),
                last_used: Instant::now(),
            },
        );
    }

    fn evict_idle(&self, sessions: &mut HashMap<SessionCredential, Session>) {
        let before = sessions.len();
        sessions.retain(|_, session| session.last_used.elapsed() < self.idle_ttl);

        if sessions.len() < before {
            debug!("Evicted {} idle session cache(s)", before - sessions.len());
        }
    }

    pub fn remove(&self, credential: &SessionCredential) -> bool {
        self.sessions.lock().remove(credential).is_some()
    }

    pub fn contains(&self, credential: &SessionCredential) -> bool {
        self.sessions.lock().contains_key(credential)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
