//! Animal sound loading with candidate fallbacks
//!
//! Each animal id maps to six candidate files, tried strictly in order:
//! the plain name, then the Arabic and English recordings, each as MP3 and
//! then OGG. The first one that downloads and decodes is cached. When none
//! do, a short synthesized tone is cached in its place, so resolving an id
//! always produces something playable.

use crate::decode::{decode_bytes, extension_of};
use crate::fetch::{fetcher_for, join_location, AssetFetcher};
use crate::retry::first_success;
use crate::{AudioError, EngineConfig, Result, SoundBuffer, SoundRecipe, Waveform};
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Tone cached for an animal whose recordings could not be loaded
pub const FALLBACK_TONE: SoundRecipe = SoundRecipe::Tone {
    frequency: 600.0,
    duration: 0.35,
    waveform: Waveform::Sine,
};

const LANGUAGE_SUFFIXES: [&str; 3] = ["", "-ar", "-en"];
const FORMATS: [&str; 2] = ["mp3", "ogg"];

/// Relative paths tried for an animal id, in order
pub fn candidate_paths(id: &str) -> Vec<String> {
    LANGUAGE_SUFFIXES
        .iter()
        .flat_map(|suffix| {
            FORMATS
                .iter()
                .map(move |ext| format!("animals/{}{}.{}", id, suffix, ext))
        })
        .collect()
}

type Slot = Arc<OnceCell<Arc<SoundBuffer>>>;

/// Resolves animal ids to buffers and caches the results
///
/// Entries are never evicted or replaced once filled. Concurrent requests
/// for the same id share one load.
pub struct AnimalSoundLoader {
    fetcher: Arc<dyn AssetFetcher>,
    base: String,
    sample_rate: u32,
    fetch_timeout: Option<Duration>,
    slots: Mutex<HashMap<String, Slot>>,
}

impl AnimalSoundLoader {
    pub fn new(fetcher: Arc<dyn AssetFetcher>, base: impl Into<String>, sample_rate: u32) -> Self {
        AnimalSoundLoader {
            fetcher,
            base: base.into(),
            sample_rate,
            fetch_timeout: None,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Loader for the configured asset base
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            fetcher_for(&config.asset_base),
            config.asset_base.clone(),
            config.sample_rate,
        )
        .with_timeout(config.fetch_timeout())
    }

    /// Bound each candidate (fetch and decode) by `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Full locations tried for `id`, in order
    pub fn candidate_urls(&self, id: &str) -> Vec<String> {
        candidate_paths(id)
            .iter()
            .map(|path| join_location(&self.base, path))
            .collect()
    }

    /// Cached buffer for `id`, without loading
    pub fn get(&self, id: &str) -> Option<Arc<SoundBuffer>> {
        self.slots
            .lock()
            .get(id)
            .and_then(|slot| slot.get().cloned())
    }

    pub fn is_cached(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Ids with a cached buffer, sorted
    pub fn cached_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .slots
            .lock()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// The buffer for `id`, loading it on first use
    ///
    /// Only fails if even the fallback tone cannot be synthesized; a failed
    /// load leaves the id uncached so a later call tries again.
    pub async fn resolve(&self, id: &str) -> Result<Arc<SoundBuffer>> {
        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(slots.entry(id.to_string()).or_default())
        };

        slot.get_or_try_init(|| self.load(id)).await.cloned()
    }

    /// Load every id not yet cached, concurrently
    ///
    /// Duplicate ids are loaded once. Returns how many ids were loaded.
    pub async fn preload<I, S>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let pending: Vec<String> = ids
            .into_iter()
            .map(|id| id.as_ref().to_string())
            .filter(|id| seen.insert(id.clone()))
            .filter(|id| !self.is_cached(id))
            .collect();

        if pending.is_empty() {
            return 0;
        }

        info!(count = pending.len(), "Preloading animal sounds");
        let results = join_all(pending.iter().map(|id| self.resolve(id))).await;

        let mut loaded = 0;
        for (id, result) in pending.iter().zip(results) {
            match result {
                Ok(_) => loaded += 1,
                Err(e) => warn!(animal = %id, error = %e, "Failed to preload animal sound"),
            }
        }
        loaded
    }

    /// The fallback tone at this loader's sample rate
    pub fn fallback_tone(&self) -> Result<SoundBuffer> {
        Ok(FALLBACK_TONE.render(self.sample_rate)?)
    }

    async fn load(&self, id: &str) -> Result<Arc<SoundBuffer>> {
        let urls = self.candidate_urls(id);

        match first_success(urls.iter().map(|url| move || self.attempt(url))).await {
            Ok(buffer) => {
                debug!(animal = id, samples = buffer.len(), "Loaded animal sound");
                Ok(Arc::new(buffer))
            }
            Err(errors) => {
                warn!(
                    animal = id,
                    attempts = errors.len(),
                    "No animal sound could be loaded, using fallback tone"
                );
                Ok(Arc::new(self.fallback_tone()?))
            }
        }
    }

    /// Fetch and decode one candidate
    async fn attempt(&self, url: &str) -> Result<SoundBuffer> {
        let result = match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetch_and_decode(url))
                .await
                .unwrap_or_else(|_| Err(AudioError::Timeout(url.to_string()))),
            None => self.fetch_and_decode(url).await,
        };

        if let Err(e) = &result {
            debug!(url, error = %e, "Animal sound candidate failed");
        }
        result
    }

    async fn fetch_and_decode(&self, url: &str) -> Result<SoundBuffer> {
        let bytes = self.fetcher.fetch(url).await?;
        decode_bytes(bytes, extension_of(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{animal_wav, Reply, ScriptedFetcher};

    const BASE: &str = "https://sounds.test";

    fn loader(fetcher: &Arc<ScriptedFetcher>) -> AnimalSoundLoader {
        AnimalSoundLoader::new(fetcher.clone(), BASE, 44_100)
    }

    #[test]
    fn test_candidate_order() {
        assert_eq!(
            candidate_paths("cat"),
            vec![
                "animals/cat.mp3",
                "animals/cat.ogg",
                "animals/cat-ar.mp3",
                "animals/cat-ar.ogg",
                "animals/cat-en.mp3",
                "animals/cat-en.ogg",
            ]
        );

        let fetcher = Arc::new(ScriptedFetcher::new());
        let urls = loader(&fetcher).candidate_urls("dog");
        assert_eq!(urls[0], "https://sounds.test/animals/dog.mp3");
        assert_eq!(urls.len(), 6);
    }

    #[tokio::test]
    async fn test_first_candidate_wins() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .with("https://sounds.test/animals/cat.mp3", Reply::Bytes(animal_wav(300.0)))
                .with("https://sounds.test/animals/cat.ogg", Reply::Bytes(animal_wav(900.0))),
        );
        let loader = loader(&fetcher);

        let buffer = loader.resolve("cat").await.unwrap();
        assert_eq!(buffer.sample_rate(), 22_050);
        assert_eq!(fetcher.attempts(), vec!["https://sounds.test/animals/cat.mp3"]);
    }

    #[tokio::test]
    async fn test_stops_after_third_candidate() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .with("https://sounds.test/animals/owl.ogg", Reply::Bytes(b"corrupt".to_vec()))
                .with("https://sounds.test/animals/owl-ar.mp3", Reply::Bytes(animal_wav(500.0)))
                .with("https://sounds.test/animals/owl-en.mp3", Reply::Bytes(animal_wav(700.0))),
        );
        let loader = loader(&fetcher);

        loader.resolve("owl").await.unwrap();
        assert_eq!(
            fetcher.attempts(),
            vec![
                "https://sounds.test/animals/owl.mp3",
                "https://sounds.test/animals/owl.ogg",
                "https://sounds.test/animals/owl-ar.mp3",
            ]
        );
    }

    #[tokio::test]
    async fn test_fallback_when_everything_fails() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let loader = loader(&fetcher);

        let buffer = loader.resolve("unicorn").await.unwrap();
        assert!(!buffer.is_empty());
        assert_eq!(*buffer, FALLBACK_TONE.render(44_100).unwrap());
        assert_eq!(fetcher.attempt_count(), 6);
        assert!(loader.is_cached("unicorn"));

        // The fallback is cached like any other sound
        let again = loader.resolve("unicorn").await.unwrap();
        assert!(Arc::ptr_eq(&buffer, &again));
        assert_eq!(fetcher.attempt_count(), 6);
    }

    #[tokio::test]
    async fn test_preload_is_idempotent() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .with("https://sounds.test/animals/cow.mp3", Reply::Bytes(animal_wav(150.0))),
        );
        let loader = loader(&fetcher);

        assert_eq!(loader.preload(["cow"]).await, 1);
        assert_eq!(loader.preload(["cow"]).await, 0);
        assert_eq!(fetcher.attempt_count(), 1);
    }

    #[tokio::test]
    async fn test_preload_dedups_and_skips_cached() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .with("https://sounds.test/animals/cat.mp3", Reply::Bytes(animal_wav(300.0)))
                .with("https://sounds.test/animals/dog.mp3", Reply::Bytes(animal_wav(200.0))),
        );
        let loader = loader(&fetcher);
        loader.resolve("cat").await.unwrap();

        let loaded = loader.preload(vec!["dog", "cat", "dog", "dog"]).await;
        assert_eq!(loaded, 1);
        assert_eq!(fetcher.attempt_count(), 2);
        assert_eq!(loader.cached_ids(), vec!["cat", "dog"]);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_load() {
        let fetcher = Arc::new(ScriptedFetcher::new().with(
            "https://sounds.test/animals/hen.mp3",
            Reply::Delayed(Duration::from_millis(20), animal_wav(800.0)),
        ));
        let loader = loader(&fetcher);

        let (a, b) = tokio::join!(loader.resolve("hen"), loader.resolve("hen"));
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(fetcher.attempt_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_candidate_times_out() {
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .with(
                    "https://sounds.test/animals/sloth.mp3",
                    Reply::Delayed(Duration::from_secs(60), animal_wav(100.0)),
                )
                .with("https://sounds.test/animals/sloth.ogg", Reply::Bytes(animal_wav(400.0))),
        );
        let loader = loader(&fetcher).with_timeout(Some(Duration::from_secs(2)));

        let buffer = loader.resolve("sloth").await.unwrap();
        assert_eq!(buffer.sample_rate(), 22_050);
        assert_eq!(fetcher.attempt_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_timeout_waits_for_slow_candidate() {
        let fetcher = Arc::new(ScriptedFetcher::new().with(
            "https://sounds.test/animals/sloth.mp3",
            Reply::Delayed(Duration::from_secs(60), animal_wav(100.0)),
        ));
        let loader = loader(&fetcher);

        let buffer = loader.resolve("sloth").await.unwrap();
        assert_eq!(buffer.sample_rate(), 22_050);
        assert_eq!(fetcher.attempt_count(), 1);
    }

    #[test]
    fn test_get_does_not_load() {
        let fetcher = Arc::new(ScriptedFetcher::new());
        let loader = loader(&fetcher);
        assert!(loader.get("cat").is_none());
        assert!(loader.cached_ids().is_empty());
        assert_eq!(fetcher.attempt_count(), 0);
    }
}
