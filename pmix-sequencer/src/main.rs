//! pmix - offline playlist mix driver
//!
//! Reads already-fetched source playlists and audio features from a JSON
//! file, sequences them, and writes the publish plan (playlist draft with
//! upload batches) as JSON. No network access.
//!
//! **Usage:**
//! ```bash
//! pmix --input sources.json [--mode flex] [--curve wave] [--max-tracks 60] [--seed 7]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use pmix_common::config::{ConfigResolver, TomlConfig, CONFIG_ENV_VAR};
use pmix_common::models::MixInput;
use pmix_common::publish::{PlaylistDraft, UPLOAD_BATCH_SIZE};
use pmix_common::{CurveProfile, MixMode, MixOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::{info, warn};

/// Merge several playlists into one curve-following mix
#[derive(Parser, Debug)]
#[clap(name = "pmix")]
#[clap(about = "Sequence source playlists into one smooth, balanced mix")]
struct Args {
    /// JSON file with source lists and audio features
    #[clap(long, short, value_name = "FILE")]
    input: PathBuf,

    /// TOML configuration file
    #[clap(long, value_name = "FILE", env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Selection policy: strict (round-robin) or flex (global greedy)
    #[clap(long, value_parser = parse_mode)]
    mode: Option<MixMode>,

    /// Energy/valence curve: steady, build, cooldown or wave
    #[clap(long, value_parser = parse_curve)]
    curve: Option<CurveProfile>,

    /// Output length cap
    #[clap(long)]
    max_tracks: Option<usize>,

    /// Seed for the pool shuffle (random when omitted)
    #[clap(long)]
    seed: Option<u64>,

    /// Keep tracks that appear in more than one source
    #[clap(long)]
    keep_duplicates: bool,

    /// Do not penalize the same artist back-to-back
    #[clap(long)]
    allow_same_artist: bool,

    /// Do not penalize duration jumps
    #[clap(long)]
    ignore_duration: bool,

    /// Name of the playlist to publish
    #[clap(long)]
    name: Option<String>,

    /// Write the plan here instead of stdout
    #[clap(long, short, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn parse_mode(s: &str) -> std::result::Result<MixMode, String> {
    MixMode::parse(s).ok_or_else(|| format!("unknown mode '{}' (expected strict or flex)", s))
}

fn parse_curve(s: &str) -> std::result::Result<CurveProfile, String> {
    CurveProfile::parse(s).ok_or_else(|| {
        format!(
            "unknown curve '{}' (expected steady, build, cooldown or wave)",
            s
        )
    })
}

impl Args {
    /// Config file options with command-line overrides applied
    fn mix_options(&self, config: &TomlConfig) -> MixOptions {
        let base = &config.mix;
        MixOptions {
            mode: self.mode.unwrap_or(base.mode),
            curve: self.curve.unwrap_or(base.curve),
            remove_duplicates: base.remove_duplicates && !self.keep_duplicates,
            avoid_same_artist: base.avoid_same_artist && !self.allow_same_artist,
            prefer_similar_duration: base.prefer_similar_duration && !self.ignore_duration,
            max_tracks: self.max_tracks.unwrap_or(base.max_tracks),
            playlist_name: self.name.clone().or_else(|| base.playlist_name.clone()),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Config first: it carries the default log level
    let (config, config_source) = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("Starting pmix v{}", env!("CARGO_PKG_VERSION"));
    match &config_source {
        Some(path) => info!("Configuration: {}", path.display()),
        None => warn!("No config file found, using built-in defaults"),
    }

    let input = MixInput::from_json_file(&args.input)
        .with_context(|| format!("Failed to read input {}", args.input.display()))?;
    info!(
        "Loaded {} source lists, {} tracks, {} audio-feature records",
        input.sources.len(),
        input.sources.iter().map(|s| s.tracks.len()).sum::<usize>(),
        input.audio_features.len()
    );

    let options = args.mix_options(&config);
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(
        "Mixing: mode={} curve={} max_tracks={} dedup={} seed={}",
        options.mode,
        options.curve.as_str(),
        options.max_tracks,
        options.remove_duplicates,
        seed
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let outcome = pmix_sequencer::mix(
        &input,
        &options,
        &config.weights,
        &config.windows,
        &mut rng,
    )?;

    if outcome.len() < options.max_tracks {
        info!(
            "Sources ran out: {} tracks instead of {}",
            outcome.len(),
            options.max_tracks
        );
    }

    let draft = PlaylistDraft::new(
        options.playlist_name.as_deref(),
        options.mode,
        options.curve,
        outcome.uris(),
    );
    info!(
        "Playlist '{}': {} tracks in {} upload batches of up to {}",
        draft.name,
        draft.len(),
        draft.upload_batches().count(),
        UPLOAD_BATCH_SIZE
    );

    let json = serde_json::to_string_pretty(&draft)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Plan written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
