// ============================================================================
// Host Storage - key-value backends and the per-invocation write overlay
// ============================================================================
//
// Keys are `namespace || bincode(key)`, values are `bincode(value)`.
// `host/` holds the host's own bookkeeping and is never exposed to contracts.
// Every invocation reads through an overlay of its own pending writes; the
// overlay is handed back to the backend as one batch only when the call
// succeeds.
//
// ============================================================================

use super::HostError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

/// Pending writes of one invocation. `None` marks a removal.
pub type WriteSet = BTreeMap<Vec<u8>, Option<Vec<u8>>>;

/// Key space partitions inside a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    Contract,
    Token,
    Host,
}

impl Namespace {
    fn prefix(&self) -> &'static [u8] {
        match self {
            Namespace::Contract => b"contract/",
            Namespace::Token => b"token/",
            Namespace::Host => b"host/",
        }
    }

    pub fn encode_key<K: Serialize>(&self, key: &K) -> Result<Vec<u8>, HostError> {
        let mut bytes = self.prefix().to_vec();
        bytes.extend(bincode::serialize(key)?);
        Ok(bytes)
    }
}

// ============================================================================
// BACKENDS
// ============================================================================

pub trait Backend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError>;

    /// Apply all writes at once. Either every write lands or none does.
    fn commit(&mut self, writes: WriteSet) -> Result<(), HostError>;

    fn flush(&self) -> Result<(), HostError> {
        Ok(())
    }
}

/// Volatile backend, used by tests and by nodes without a data directory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        Ok(self.entries.get(key).cloned())
    }

    fn commit(&mut self, writes: WriteSet) -> Result<(), HostError> {
        for (key, value) in writes {
            match value {
                Some(bytes) => {
                    self.entries.insert(key, bytes);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Durable backend on top of sled
#[derive(Debug, Clone)]
pub struct SledBackend {
    db: sled::Db,
}

impl SledBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, HostError> {
        Ok(Self { db: sled::open(path)? })
    }

    /// Database deleted on drop
    pub fn temporary() -> Result<Self, HostError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }
}

impl Backend for SledBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        Ok(self.db.get(key)?.map(|value| value.to_vec()))
    }

    fn commit(&mut self, writes: WriteSet) -> Result<(), HostError> {
        let mut batch = sled::Batch::default();
        for (key, value) in writes {
            match value {
                Some(bytes) => batch.insert(key, bytes),
                None => batch.remove(key),
            }
        }
        self.db.apply_batch(batch)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), HostError> {
        self.db.flush()?;
        Ok(())
    }
}

// ============================================================================
// OVERLAY
// ============================================================================

/// Read-your-writes view of a backend for a single invocation
pub struct Overlay<'a> {
    backend: &'a dyn Backend,
    writes: RefCell<WriteSet>,
}

impl<'a> Overlay<'a> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            writes: RefCell::new(WriteSet::new()),
        }
    }

    fn read(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        if let Some(pending) = self.writes.borrow().get(key) {
            return Ok(pending.clone());
        }
        self.backend.get(key)
    }

    fn write(&self, key: Vec<u8>, value: Option<Vec<u8>>) {
        self.writes.borrow_mut().insert(key, value);
    }

    pub fn scope(&self, namespace: Namespace) -> Storage<'_, 'a> {
        Storage { overlay: self, namespace }
    }

    pub fn into_writes(self) -> WriteSet {
        self.writes.into_inner()
    }
}

/// Typed access to one namespace of an overlay
pub struct Storage<'o, 'a> {
    overlay: &'o Overlay<'a>,
    namespace: Namespace,
}

impl<'o, 'a> Storage<'o, 'a> {
    pub fn has<K: Serialize>(&self, key: &K) -> Result<bool, HostError> {
        let raw = self.namespace.encode_key(key)?;
        Ok(self.overlay.read(&raw)?.is_some())
    }

    pub fn get<K: Serialize, V: DeserializeOwned>(&self, key: &K) -> Result<Option<V>, HostError> {
        let raw = self.namespace.encode_key(key)?;
        match self.overlay.read(&raw)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set<K: Serialize, V: Serialize>(&self, key: &K, value: &V) -> Result<(), HostError> {
        let raw = self.namespace.encode_key(key)?;
        self.overlay.write(raw, Some(bincode::serialize(value)?));
        Ok(())
    }

    pub fn remove<K: Serialize>(&self, key: &K) -> Result<(), HostError> {
        let raw = self.namespace.encode_key(key)?;
        self.overlay.write(raw, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_reads_its_own_writes() {
        let backend = MemoryBackend::new();
        let overlay = Overlay::new(&backend);
        let store = overlay.scope(Namespace::Contract);

        store.set(&"count", &5u64).unwrap();
        assert_eq!(store.get::<_, u64>(&"count").unwrap(), Some(5));
        assert!(backend.is_empty());
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let backend = MemoryBackend::new();
        let overlay = Overlay::new(&backend);

        overlay.scope(Namespace::Contract).set(&"key", &1i128).unwrap();
        assert!(!overlay.scope(Namespace::Token).has(&"key").unwrap());
        assert!(!overlay.scope(Namespace::Host).has(&"key").unwrap());
    }

    #[test]
    fn test_commit_applies_removals() {
        let mut backend = MemoryBackend::new();

        let writes = {
            let overlay = Overlay::new(&backend);
            overlay.scope(Namespace::Token).set(&"a", &10i128).unwrap();
            overlay.scope(Namespace::Token).set(&"b", &20i128).unwrap();
            overlay.into_writes()
        };
        backend.commit(writes).unwrap();
        assert_eq!(backend.len(), 2);

        let writes = {
            let overlay = Overlay::new(&backend);
            overlay.scope(Namespace::Token).remove(&"a").unwrap();
            assert!(!overlay.scope(Namespace::Token).has(&"a").unwrap());
            overlay.into_writes()
        };
        backend.commit(writes).unwrap();
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn test_dropped_overlay_leaves_backend_untouched() {
        let backend = MemoryBackend::new();
        {
            let overlay = Overlay::new(&backend);
            overlay.scope(Namespace::Contract).set(&"x", &1u8).unwrap();
        }
        assert!(backend.is_empty());
    }

    #[test]
    fn test_sled_backend_commit() {
        let mut backend = SledBackend::temporary().unwrap();
        let writes = {
            let overlay = Overlay::new(&backend);
            overlay.scope(Namespace::Contract).set(&("market", 0u64), &"question".to_string()).unwrap();
            overlay.into_writes()
        };
        backend.commit(writes).unwrap();

        let overlay = Overlay::new(&backend);
        let stored: Option<String> = overlay.scope(Namespace::Contract).get(&("market", 0u64)).unwrap();
        assert_eq!(stored.as_deref(), Some("question"));
    }
}
