//! The built-in sound effect catalog
//!
//! Every effect is a fixed recipe plus a preset volume. Playing one is
//! just a cache lookup by its key.

use crate::{SoundRecipe, Waveform};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// C major pitches used across the catalog
const G4: f64 = 392.0;
const C5: f64 = 523.25;
const E5: f64 = 659.25;
const G5: f64 = 783.99;
const A5: f64 = 880.0;
const B5: f64 = 987.77;
const C6: f64 = 1046.5;
const D6: f64 = 1174.66;
const E6: f64 = 1318.51;
const G6: f64 = 1567.98;

/// A named UI sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Click,
    Pop,
    Success,
    Failure,
    Correct,
    Wrong,
    LevelComplete,
    Reward,
    Star,
    StoryPage,
    StoryComplete,
    Celebration,
    Whoosh,
}

impl Effect {
    pub const ALL: [Effect; 13] = [
        Effect::Click,
        Effect::Pop,
        Effect::Success,
        Effect::Failure,
        Effect::Correct,
        Effect::Wrong,
        Effect::LevelComplete,
        Effect::Reward,
        Effect::Star,
        Effect::StoryPage,
        Effect::StoryComplete,
        Effect::Celebration,
        Effect::Whoosh,
    ];

    /// Cache key
    pub fn key(self) -> &'static str {
        match self {
            Effect::Click => "click",
            Effect::Pop => "pop",
            Effect::Success => "success",
            Effect::Failure => "failure",
            Effect::Correct => "correct",
            Effect::Wrong => "wrong",
            Effect::LevelComplete => "level_complete",
            Effect::Reward => "reward",
            Effect::Star => "star",
            Effect::StoryPage => "story_page",
            Effect::StoryComplete => "story_complete",
            Effect::Celebration => "celebration",
            Effect::Whoosh => "whoosh",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|effect| effect.key() == key)
    }

    /// How the effect is synthesized
    pub fn recipe(self) -> SoundRecipe {
        match self {
            Effect::Click => SoundRecipe::tone(800.0, 0.1, Waveform::Sine),
            Effect::Pop => SoundRecipe::tone(1200.0, 0.08, Waveform::Triangle),
            Effect::Success => SoundRecipe::melody(&[C5, E5, G5], 0.15),
            Effect::Failure => SoundRecipe::tone(200.0, 0.4, Waveform::Sawtooth),
            Effect::Correct => SoundRecipe::melody(&[E5, A5], 0.12),
            Effect::Wrong => SoundRecipe::tone(150.0, 0.3, Waveform::Square),
            Effect::LevelComplete => SoundRecipe::melody(&[C5, E5, G5, C6], 0.15),
            Effect::Reward => SoundRecipe::melody(&[G5, B5, D6, G6], 0.1),
            Effect::Star => SoundRecipe::tone(G6, 0.2, Waveform::Triangle),
            Effect::StoryPage => SoundRecipe::tone(440.0, 0.15, Waveform::Triangle),
            Effect::StoryComplete => SoundRecipe::melody(&[G4, C5, E5, G5, C6], 0.2),
            Effect::Celebration => SoundRecipe::melody(&[C5, E5, G5, C6, G5, C6, E6], 0.12),
            Effect::Whoosh => SoundRecipe::tone(300.0, 0.25, Waveform::Sawtooth),
        }
    }

    /// Preset volume scale applied on top of the master volume
    pub fn volume(self) -> f32 {
        match self {
            Effect::Click | Effect::Pop => 0.5,
            Effect::StoryPage | Effect::Whoosh => 0.4,
            Effect::Wrong => 0.5,
            Effect::Failure | Effect::Star => 0.6,
            Effect::Success | Effect::Correct | Effect::Reward | Effect::StoryComplete => 0.8,
            Effect::LevelComplete => 0.9,
            Effect::Celebration => 1.0,
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Effect::from_key(&key).ok_or_else(|| {
            let known: Vec<&str> = Effect::ALL.iter().map(|e| e.key()).collect();
            format!("Unknown effect '{}'. Known effects: {}", s, known.join(", "))
        })
    }
}

/// Built-in recipes with configured overrides applied on top
pub fn catalog(overrides: &BTreeMap<String, SoundRecipe>) -> BTreeMap<String, SoundRecipe> {
    let mut recipes: BTreeMap<String, SoundRecipe> = Effect::ALL
        .iter()
        .map(|effect| (effect.key().to_string(), effect.recipe()))
        .collect();
    for (name, recipe) in overrides {
        recipes.insert(name.clone(), recipe.clone());
    }
    recipes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_round_trip() {
        for effect in Effect::ALL {
            assert_eq!(Effect::from_key(effect.key()), Some(effect));
        }
        assert_eq!(Effect::from_key("nope"), None);
    }

    #[test]
    fn test_parse_is_forgiving() {
        assert_eq!("Level-Complete".parse::<Effect>(), Ok(Effect::LevelComplete));
        assert_eq!(" click ".parse::<Effect>(), Ok(Effect::Click));
        let err = "boom".parse::<Effect>().unwrap_err();
        assert!(err.contains("celebration"));
    }

    #[test]
    fn test_all_recipes_render() {
        for effect in Effect::ALL {
            let buffer = effect.recipe().render(22_050);
            assert!(buffer.is_ok(), "{} failed to render", effect);
            assert!((0.0..=1.0).contains(&effect.volume()));
        }
    }

    #[test]
    fn test_catalog_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "click".to_string(),
            SoundRecipe::tone(1000.0, 0.05, Waveform::Square),
        );
        overrides.insert("moo".to_string(), SoundRecipe::tone(120.0, 0.5, Waveform::Sawtooth));

        let recipes = catalog(&overrides);
        assert_eq!(recipes.len(), Effect::ALL.len() + 1);
        assert_eq!(recipes["click"], SoundRecipe::tone(1000.0, 0.05, Waveform::Square));
        assert_eq!(recipes["success"], Effect::Success.recipe());
        assert!(recipes.contains_key("moo"));
    }
}
