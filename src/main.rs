//! chirp - play and render the app's procedural sounds from a terminal

use anyhow::{bail, Context, Result};
use chirp_audio::effects::catalog;
use chirp_audio::{
    AudioEngine, Effect, EngineConfig, SilentBackend, Waveform, THEME_NOTES, THEME_NOTE_DURATION,
};
use chirp_synth::{sequence_with_waveform, synthesize, write_wav};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "chirp")]
#[command(about = "Procedural sound effects and music")]
#[command(version)]
struct Cli {
    /// JSON engine configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Master volume (0.0 to 1.0)
    #[arg(long, global = true)]
    volume: Option<f32>,

    /// Start with sound disabled
    #[arg(long, global = true)]
    mute: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in effects
    List,

    /// Play effects in order
    Play {
        #[arg(required = true)]
        effects: Vec<Effect>,
    },

    /// Render a single tone to a WAV file
    Tone {
        /// Frequency in Hz
        frequency: f64,

        /// Length in seconds
        seconds: f64,

        #[arg(short, long, default_value = "sine")]
        waveform: Waveform,

        /// Output WAV file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Render a phrase of equal-length notes to a WAV file
    Melody {
        /// Note frequencies in Hz
        #[arg(required = true)]
        notes: Vec<f64>,

        /// Seconds per note
        #[arg(short, long, default_value_t = 0.15)]
        note_duration: f64,

        #[arg(short, long, default_value = "sine")]
        waveform: Waveform,

        /// Output WAV file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Play the background theme
    Music {
        /// How long to keep playing
        #[arg(short, long)]
        seconds: Option<f64>,

        /// Play the theme once instead of looping
        #[arg(long)]
        once: bool,
    },

    /// Write the background theme to a WAV file
    ExportMusic { out: PathBuf },

    /// Load and play animal sounds
    Animals {
        #[arg(required = true)]
        ids: Vec<String>,

        /// Language hint, also used to speak the names
        #[arg(short, long, default_value = "en")]
        lang: String,
    },
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(volume) = cli.volume {
        config = config.with_master_volume(volume);
    }
    if cli.mute {
        config = config.with_sound_enabled(false);
    }
    Ok(config)
}

fn open_engine(config: EngineConfig) -> Result<AudioEngine> {
    let engine = AudioEngine::with_default_backend(config)?;
    if !engine.ensure_ready() {
        warn!("No audio output, continuing without sound");
    }
    Ok(engine)
}

async fn pause_for(seconds: f64) {
    tokio::time::sleep(Duration::from_secs_f64(seconds.max(0.0))).await;
}

fn check_length(seconds: f64) -> Result<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("Length must be a positive number of seconds, got {}", seconds);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::List => {
            for (name, recipe) in catalog(&config.effects) {
                let volume = Effect::from_key(&name).map_or(1.0, Effect::volume);
                println!("{:<16} {:>4.2}  {}", name, volume, recipe);
            }
        }

        Commands::Play { effects } => {
            let engine = open_engine(config)?;
            for effect in effects {
                info!(effect = %effect, "Playing");
                engine.play_effect(effect);
                let length = engine
                    .effects()
                    .get(effect.key())
                    .map_or(0.0, |buffer| buffer.duration());
                pause_for(length + 0.1).await;
            }
            engine.dispose();
        }

        Commands::Tone {
            frequency,
            seconds,
            waveform,
            out,
        } => {
            check_length(seconds)?;
            let buffer = synthesize(config.sample_rate, frequency, seconds, waveform)?;
            write_wav(&out, &buffer)?;
            println!("Wrote {} ({} samples)", out.display(), buffer.len());
        }

        Commands::Melody {
            notes,
            note_duration,
            waveform,
            out,
        } => {
            check_length(note_duration)?;
            let buffer = sequence_with_waveform(config.sample_rate, &notes, note_duration, waveform)?;
            write_wav(&out, &buffer)?;
            println!("Wrote {} ({} notes, {:.2}s)", out.display(), notes.len(), buffer.duration());
        }

        Commands::Music { seconds, once } => {
            let theme_length = THEME_NOTES.len() as f64 * THEME_NOTE_DURATION;
            let seconds = seconds.unwrap_or(theme_length);
            check_length(seconds)?;

            let engine = open_engine(config)?;
            engine.play_background_music(!once);
            pause_for(seconds).await;
            engine.stop_background_music();
            engine.dispose();
        }

        Commands::ExportMusic { out } => {
            let backend = Arc::new(SilentBackend::new(config.sample_rate));
            let engine = AudioEngine::new(config, backend)?;
            engine.export_background_music(&out)?;
            println!("Wrote {}", out.display());
        }

        Commands::Animals { ids, lang } => {
            let engine = open_engine(config)?;
            let loaded = engine.preload_animal_sounds(&ids).await;
            info!(loaded, requested = ids.len(), "Animal sounds ready");

            for id in &ids {
                engine.speak_animal_name(id, &lang);
                engine.play_animal_sound(id, Some(lang.as_str())).await;
                let length = engine
                    .animals()
                    .get(id)
                    .map_or(0.0, |buffer| buffer.duration());
                pause_for(length + 0.2).await;
            }
            engine.dispose();
        }
    }

    Ok(())
}
