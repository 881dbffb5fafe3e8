//! Core library for the Meditation Player application.
//!
//! A meditation carries a timeline of cues (audio clips, haptic patterns and
//! visual effects). This crate parses that timeline and plays it back against
//! a clock: the [`PlaybackScheduler`] fires each cue at its offset, keeps a
//! progress cursor and drives the audio, haptic and visual side effects. All
//! I/O (fetching media, decoding, drawing) is left to the host, which talks
//! to the engine through the traits in [`audio`], [`haptics`] and [`player`].

pub mod assets;
pub mod audio;
pub mod config;
pub mod error;
pub mod haptics;
pub mod playback;
pub mod player;
pub mod record;
pub mod render;
pub mod scene;
pub mod timeline;

pub use assets::AssetResolver;
pub use audio::{
    ActivePlayer, AudioOutput, MediaCompletion, MediaKind, MediaRequest, NullAudioOutput,
    SessionToken, SilentPlayer,
};
pub use config::{ApiConfig, PlaybackConfig, PlayerConfig, SurfaceConfig};
pub use error::{PlayerError, Result};
pub use haptics::{HapticEvent, HapticEventKind, HapticOutput, HapticPattern, NullHapticOutput};
pub use playback::{
    Clock, ManualClock, PlaybackScheduler, PlaybackSnapshot, SystemClock, TriggerLog,
};
pub use player::{MeditationPlayer, MeditationSource, MeditationSummary, PlayerSnapshot};
pub use record::{parse_catalog, GenerationStatus, MeditationRecord};
pub use render::{Node, NodeId, RenderGraph, Shape, Size};
pub use scene::{EffectController, EffectFactory, EffectRegistry, RunningEffect, VisualEffectId};
pub use timeline::{extract_playback_events, parse_entries, PlaybackEvent};
