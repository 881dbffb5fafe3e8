use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use meditation_player_core::{
    parse_entries, AssetResolver, EffectRegistry, HapticOutput, MeditationPlayer,
    MeditationSource, NullHapticOutput, PlaybackScheduler, PlayerConfig, PlayerError, Size,
    SystemClock,
};
use tracing_subscriber::EnvFilter;

mod fetch;
mod outputs;
mod session;

use fetch::CatalogSource;
use outputs::{LoggingAudioOutput, LoggingHapticOutput};

fn main() -> meditation_player_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PlayerConfig::from_path(path)?,
        None => PlayerConfig::default(),
    };

    match cli.command {
        Commands::Inspect { catalog } => run_inspect(&config, catalog.as_deref()),
        Commands::Play {
            catalog,
            id,
            base_url,
            no_haptics,
        } => run_play(config, catalog.as_deref(), id.as_deref(), base_url, no_haptics),
    }
}

fn run_inspect(config: &PlayerConfig, catalog: Option<&str>) -> meditation_player_core::Result<()> {
    let source = CatalogSource::locate(catalog, &config.api)?;
    tracing::info!(%source, "inspecting meditation catalog");

    let payload = source.fetch_catalog()?;
    for record in meditation_player_core::parse_catalog(&payload) {
        println!(
            "{}  {}  {}ms  [{}]",
            record.id,
            record.title,
            record.duration_ms,
            record.status.display_name()
        );

        let events = parse_entries(&record.timeline_entries);
        if events.is_empty() {
            println!("    (no timeline events)");
        }
        for event in events {
            println!(
                "    {:>7}ms  {:<8} {}",
                event.at_ms(),
                event.kind_label(),
                event.target_label()
            );
        }
    }
    Ok(())
}

fn run_play(
    config: PlayerConfig,
    catalog: Option<&str>,
    id: Option<&str>,
    base_url: Option<String>,
    no_haptics: bool,
) -> meditation_player_core::Result<()> {
    let source = CatalogSource::locate(catalog, &config.api)?;
    let resolver = match base_url.or_else(|| config.api.base_url.clone()) {
        Some(base) => AssetResolver::from_base_url(&base)?,
        None => source.default_resolver()?,
    };
    tracing::info!(%source, base = ?resolver.base().map(|url| url.as_str()), "starting player");

    let haptics: Box<dyn HapticOutput> = if no_haptics {
        Box::new(NullHapticOutput)
    } else {
        Box::new(LoggingHapticOutput)
    };
    let scheduler = PlaybackScheduler::new(
        &config.playback,
        Box::new(SystemClock::new()),
        EffectRegistry::builtin(),
    )
    .with_resolver(resolver)
    .with_audio(Box::new(LoggingAudioOutput))
    .with_haptics(haptics)
    .with_surface(Size::new(config.surface.width, config.surface.height));

    let mut player = MeditationPlayer::new(scheduler);
    player.load_meditations(&source);
    if let Some(message) = player.snapshot().error_message {
        return Err(PlayerError::msg(message));
    }

    if let Some(id) = id {
        if !player.meditations().iter().any(|record| record.id == id) {
            return Err(PlayerError::msg(format!("no meditation with id `{id}`")));
        }
        player.select_meditation(id);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let frame_interval = Duration::from_millis(config.playback.frame_interval_ms.max(1));
    runtime.block_on(session::run(&mut player, frame_interval))?;

    let snapshot = player.snapshot();
    tracing::info!(
        current_ms = snapshot.current_ms,
        error = snapshot.error_message.as_deref(),
        "playback ended"
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Timeline player for guided meditations", long_about = None)]
struct Cli {
    /// Optional JSON configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the meditations of a catalog together with their parsed timelines.
    Inspect {
        /// Catalog JSON file or http(s) URL. Defaults to the configured API.
        catalog: Option<String>,
    },
    /// Play one meditation's timeline in real time.
    Play {
        /// Catalog JSON file or http(s) URL. Defaults to the configured API.
        catalog: Option<String>,
        /// Meditation to play; the first one in the catalog otherwise.
        #[arg(short, long)]
        id: Option<String>,
        /// Base URL for relative media references.
        #[arg(long)]
        base_url: Option<String>,
        /// Behave like a device without a haptic engine.
        #[arg(long)]
        no_haptics: bool,
    },
}
