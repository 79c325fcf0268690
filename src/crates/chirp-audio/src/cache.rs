//! Name-keyed store of ready-to-play buffers

use crate::{SoundBuffer, SoundRecipe};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

/// Buffers generated once at startup and read-only afterwards
#[derive(Debug, Clone, Default)]
pub struct SoundCache {
    sounds: HashMap<String, Arc<SoundBuffer>>,
}

impl SoundCache {
    /// Run each generator and keep the buffers that succeed
    ///
    /// A failing generator is logged and skipped; the rest still load.
    /// If a name appears twice the first buffer is kept.
    pub fn preload<I, K, F, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<String>,
        F: FnOnce() -> Result<SoundBuffer, E>,
        E: Display,
    {
        let mut sounds = HashMap::new();

        for (name, generate) in entries {
            let name = name.into();
            if sounds.contains_key(&name) {
                warn!(sound = %name, "Duplicate sound name, keeping the first");
                continue;
            }
            match generate() {
                Ok(buffer) => {
                    debug!(sound = %name, samples = buffer.len(), "Cached sound");
                    sounds.insert(name, Arc::new(buffer));
                }
                Err(e) => warn!(sound = %name, error = %e, "Failed to generate sound, skipping"),
            }
        }

        SoundCache { sounds }
    }

    /// Render every recipe at `sample_rate`
    pub fn from_recipes<'a, I>(sample_rate: u32, recipes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a SoundRecipe)>,
    {
        Self::preload(
            recipes
                .into_iter()
                .map(|(name, recipe)| (name, move || recipe.render(sample_rate))),
        )
    }

    pub fn get(&self, name: &str) -> Option<Arc<SoundBuffer>> {
        self.sounds.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sounds.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }

    /// Cached names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sounds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
