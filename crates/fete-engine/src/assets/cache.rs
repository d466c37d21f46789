use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, RwLock};

/// A loaded, playable audio asset: validated media bytes behind an `Arc`.
///
/// Cloning is cheap and never copies the bytes. Each playback takes a fresh
/// `reader()`, so concurrent plays of the same asset don't interfere.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    key: Arc<str>,
    bytes: Arc<[u8]>,
}

impl AudioBuffer {
    pub fn new(key: &str, bytes: Vec<u8>) -> Self {
        Self {
            key: Arc::from(key),
            bytes: Arc::from(bytes.into_boxed_slice()),
        }
    }

    /// The asset key this buffer was loaded under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Size of the media data in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// A fresh seekable reader over the shared bytes, one per playback.
    pub fn reader(&self) -> Cursor<Arc<[u8]>> {
        Cursor::new(Arc::clone(&self.bytes))
    }
}

/// Process-wide mapping from asset key to its loaded buffer.
///
/// The preloader is the only writer; playback reads. Entries are never
/// removed during a session. Shared by `Arc`, constructed once at the
/// application root.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: RwLock<HashMap<String, AudioBuffer>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a loaded buffer under its key.
    pub fn insert(&self, buffer: AudioBuffer) {
        let key = buffer.key().to_string();
        self.entries.write().expect("cache lock poisoned").insert(key, buffer);
    }

    /// Look up a buffer by key. A miss means the asset never loaded.
    pub fn get(&self, key: &str) -> Option<AudioBuffer> {
        self.entries.read().expect("cache lock poisoned").get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().expect("cache lock poisoned").contains_key(key)
    }

    /// Number of cached assets.
    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All cached keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .read()
            .expect("cache lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Any one cached buffer, used by the gesture-gate warmup probe.
    pub fn any(&self) -> Option<AudioBuffer> {
        self.entries
            .read()
            .expect("cache lock poisoned")
            .values()
            .next()
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn insert_and_get() {
        let cache = AssetCache::new();
        cache.insert(AudioBuffer::new("click", vec![1, 2, 3]));

        let buffer = cache.get("click").unwrap();
        assert_eq!(buffer.key(), "click");
        assert_eq!(buffer.len(), 3);
        assert!(cache.contains("click"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn miss_returns_none() {
        let cache = AssetCache::new();
        assert!(cache.get("nonexistent").is_none());
        assert!(cache.any().is_none());
    }

    #[test]
    fn readers_are_independent() {
        let buffer = AudioBuffer::new("click", vec![10, 20, 30]);
        let mut a = buffer.reader();
        let mut b = buffer.reader();

        let mut first = [0u8; 1];
        a.read_exact(&mut first).unwrap();
        assert_eq!(first, [10]);

        // The second reader still starts at the beginning.
        let mut all = Vec::new();
        b.read_to_end(&mut all).unwrap();
        assert_eq!(all, vec![10, 20, 30]);
    }
}
