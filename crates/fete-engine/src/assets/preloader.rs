use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::assets::cache::{AssetCache, AudioBuffer};
use crate::assets::catalog::AssetCatalog;

/// Aggregate preload progress, observable while loading runs.
///
/// `loaded_count` counts settled attempts, not successes, and only ever
/// increases; `is_complete` flips to true exactly once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadProgress {
    pub loaded_count: usize,
    pub total_count: usize,
    /// Key of the most recently settled asset, empty once finished.
    pub current_key: String,
    pub is_complete: bool,
    pub has_error: bool,
}

impl LoadProgress {
    /// Completion fraction in [0.0, 1.0] for progress bars.
    pub fn fraction(&self) -> f32 {
        if self.total_count == 0 {
            1.0
        } else {
            self.loaded_count as f32 / self.total_count as f32
        }
    }
}

/// Best-effort cache warmer.
///
/// Loads every catalog entry concurrently, racing each against a fixed
/// per-asset timeout. A bad or missing asset never blocks the rest: the
/// attempt is counted, `has_error` is set, and the key simply stays absent
/// from the cache. No retries: one failure per asset is terminal for the
/// session.
pub struct Preloader {
    catalog: Arc<AssetCatalog>,
    cache: Arc<AssetCache>,
    asset_root: PathBuf,
    asset_timeout: Duration,
    started: AtomicBool,
    progress_tx: watch::Sender<LoadProgress>,
}

impl Preloader {
    pub fn new(
        catalog: Arc<AssetCatalog>,
        cache: Arc<AssetCache>,
        asset_root: PathBuf,
        asset_timeout: Duration,
    ) -> Self {
        let (progress_tx, _) = watch::channel(LoadProgress {
            total_count: catalog.len(),
            ..LoadProgress::default()
        });
        Self {
            catalog,
            cache,
            asset_root,
            asset_timeout,
            started: AtomicBool::new(false),
            progress_tx,
        }
    }

    /// Subscribe to incremental progress updates.
    pub fn progress(&self) -> watch::Receiver<LoadProgress> {
        self.progress_tx.subscribe()
    }

    /// The latest progress value.
    pub fn snapshot(&self) -> LoadProgress {
        self.progress_tx.borrow().clone()
    }

    /// Load everything. Runs at most once per session: a second call while
    /// or after the first is ignored, so progress is never double-counted.
    pub async fn run(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("preload already started, ignoring");
            return;
        }

        let total = self.catalog.len();
        info!("preloading {total} audio assets");

        let mut tasks = JoinSet::new();
        for desc in self.catalog.iter().cloned() {
            let path = self.asset_root.join(&desc.path);
            let timeout = self.asset_timeout;
            tasks.spawn(async move {
                let loaded = match tokio::time::timeout(timeout, load_asset(&desc.key, &path)).await
                {
                    Ok(Ok(buffer)) => Some(buffer),
                    Ok(Err(e)) => {
                        warn!("failed to load {}: {e}", desc.key);
                        None
                    }
                    Err(_) => {
                        warn!(
                            "timed out loading {} after {}ms",
                            desc.key,
                            timeout.as_millis()
                        );
                        None
                    }
                };
                (desc.key, loaded)
            });
        }

        // Wait-for-all join: every per-asset attempt settles before
        // completion, failures included.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((key, Some(buffer))) => {
                    debug!("loaded {key} ({} bytes)", buffer.len());
                    self.cache.insert(buffer);
                    self.progress_tx.send_modify(|p| {
                        p.loaded_count += 1;
                        p.current_key = key;
                    });
                }
                Ok((key, None)) => {
                    self.progress_tx.send_modify(|p| {
                        p.loaded_count += 1;
                        p.current_key = key;
                        p.has_error = true;
                    });
                }
                Err(e) => {
                    warn!("preload task failed: {e}");
                    self.progress_tx.send_modify(|p| {
                        p.loaded_count += 1;
                        p.has_error = true;
                    });
                }
            }
        }

        self.progress_tx.send_modify(|p| {
            p.is_complete = true;
            p.current_key.clear();
        });
        let done = self.snapshot();
        info!(
            "preload complete: {}/{} cached{}",
            self.cache.len(),
            done.total_count,
            if done.has_error { ", some assets unavailable" } else { "" }
        );
    }
}

/// Read and decode-validate one asset. The decode check is the "ready to
/// play" signal: bytes that rodio cannot open are treated as a load error.
async fn load_asset(key: &str, path: &Path) -> std::io::Result<AudioBuffer> {
    let bytes = tokio::fs::read(path).await?;
    let buffer = AudioBuffer::new(key, bytes);
    validate(&buffer)?;
    Ok(buffer)
}

#[cfg(feature = "rodio-output")]
fn validate(buffer: &AudioBuffer) -> std::io::Result<()> {
    rodio::Decoder::new(buffer.reader())
        .map(|_| ())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
}

#[cfg(not(feature = "rodio-output"))]
fn validate(_buffer: &AudioBuffer) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::catalog::AssetCatalog;

    /// Minimal valid mono 16-bit WAV so the decode check passes.
    fn wav_bytes() -> Vec<u8> {
        let samples: [i16; 8] = [0, 1000, 2000, 1000, 0, -1000, -2000, -1000];
        let sample_rate: u32 = 22050;
        let data_size = (samples.len() * 2) as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&sample_rate.to_le_bytes());
        buf.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        buf.extend_from_slice(&2u16.to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for s in samples {
            buf.extend_from_slice(&s.to_le_bytes());
        }
        buf
    }

    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fete-preload-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn catalog_of(entries: &[(&str, &str)]) -> Arc<AssetCatalog> {
        let json = serde_json::to_string(
            &entries
                .iter()
                .map(|(key, path)| {
                    serde_json::json!({ "key": key, "path": path, "class": "sound" })
                })
                .collect::<Vec<_>>(),
        )
        .unwrap();
        Arc::new(AssetCatalog::from_json(&json).unwrap())
    }

    #[tokio::test]
    async fn tolerates_missing_and_bad_assets() {
        let dir = fixture_dir("mixed");
        std::fs::write(dir.join("one.wav"), wav_bytes()).unwrap();
        // "two" has no file at all; "three" is valid; "four" is garbage.
        std::fs::write(dir.join("three.wav"), wav_bytes()).unwrap();
        std::fs::write(dir.join("four.wav"), b"not audio at all").unwrap();

        let catalog = catalog_of(&[
            ("one", "one.wav"),
            ("two", "two.wav"),
            ("three", "three.wav"),
            ("four", "four.wav"),
        ]);
        let cache = Arc::new(AssetCache::new());
        let preloader = Preloader::new(
            Arc::clone(&catalog),
            Arc::clone(&cache),
            dir.clone(),
            Duration::from_secs(5),
        );

        preloader.run().await;

        let progress = preloader.snapshot();
        assert_eq!(progress.loaded_count, 4);
        assert_eq!(progress.total_count, 4);
        assert!(progress.is_complete);
        assert!(progress.has_error);
        assert_eq!(progress.current_key, "");

        assert!(cache.contains("one"));
        assert!(cache.contains("three"));
        assert!(!cache.contains("two"));
        if cfg!(feature = "rodio-output") {
            assert!(!cache.contains("four"));
        }

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn all_good_assets_load_cleanly() {
        let dir = fixture_dir("clean");
        std::fs::write(dir.join("a.wav"), wav_bytes()).unwrap();
        std::fs::write(dir.join("b.wav"), wav_bytes()).unwrap();

        let catalog = catalog_of(&[("a", "a.wav"), ("b", "b.wav")]);
        let cache = Arc::new(AssetCache::new());
        let preloader = Preloader::new(
            catalog,
            Arc::clone(&cache),
            dir.clone(),
            Duration::from_secs(5),
        );

        preloader.run().await;

        let progress = preloader.snapshot();
        assert_eq!(progress.loaded_count, 2);
        assert!(progress.is_complete);
        assert!(!progress.has_error);
        assert_eq!(cache.len(), 2);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn second_run_is_ignored() {
        let dir = fixture_dir("guard");
        std::fs::write(dir.join("a.wav"), wav_bytes()).unwrap();

        let catalog = catalog_of(&[("a", "a.wav")]);
        let cache = Arc::new(AssetCache::new());
        let preloader = Preloader::new(
            catalog,
            Arc::clone(&cache),
            dir.clone(),
            Duration::from_secs(5),
        );

        preloader.run().await;
        preloader.run().await;

        // No double-counted progress from the second invocation.
        let progress = preloader.snapshot();
        assert_eq!(progress.loaded_count, 1);
        assert_eq!(progress.total_count, 1);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn progress_updates_are_observable() {
        let dir = fixture_dir("watch");
        std::fs::write(dir.join("a.wav"), wav_bytes()).unwrap();

        let catalog = catalog_of(&[("a", "a.wav")]);
        let cache = Arc::new(AssetCache::new());
        let preloader =
            Preloader::new(catalog, cache, dir.clone(), Duration::from_secs(5));

        let mut rx = preloader.progress();
        assert_eq!(rx.borrow().total_count, 1);
        assert!(!rx.borrow().is_complete);

        preloader.run().await;

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_complete);

        std::fs::remove_dir_all(dir).ok();
    }
}
