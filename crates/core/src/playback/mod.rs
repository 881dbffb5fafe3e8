//! Session orchestration: fires timeline events against a clock and drives
//! audio, haptic and visual dispatch.
//!
//! The scheduler performs no I/O. Hosts call [`PlaybackScheduler::advance`]
//! whenever [`PlaybackScheduler::until_next_wake`] elapses, perform the fetches
//! returned by [`PlaybackScheduler::take_media_requests`] and hand the results
//! back through [`PlaybackScheduler::complete_media`].

use std::time::Duration;

use serde::Serialize;

use crate::{
    assets::AssetResolver,
    audio::{
        AudioOutput, MediaCompletion, MediaKind, MediaRequest, NullAudioOutput, PlayerSet,
        SessionToken,
    },
    config::PlaybackConfig,
    haptics::{HapticOutput, HapticPattern, NullHapticOutput},
    record::MeditationRecord,
    render::{RenderGraph, Size},
    scene::{EffectController, EffectRegistry, VisualEffectId},
    timeline::{parse_entries, PlaybackEvent},
    PlayerError,
};

mod clock;
mod triggers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use triggers::{TriggerLog, DEFAULT_TRIGGER_CAPACITY};

/// Observable state of the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub current_ms: u64,
    pub recent_triggers: Vec<String>,
    pub active_effect: Option<VisualEffectId>,
    pub error_message: Option<String>,
}

/// Timers of the running session: one per event plus the terminal timer at
/// `duration_ms`.
#[derive(Debug)]
struct ActiveTimeline {
    started_at: u64,
    duration_ms: u64,
    events: Vec<PlaybackEvent>,
    next_event: usize,
}

enum Due {
    Event(PlaybackEvent),
    Complete,
}

impl ActiveTimeline {
    /// Events at or before the duration fire ahead of the terminal timer;
    /// later ones never fire.
    fn pending_event(&self) -> Option<&PlaybackEvent> {
        self.events
            .get(self.next_event)
            .filter(|event| event.at_ms() <= self.duration_ms)
    }

    fn next_deadline(&self) -> u64 {
        self.pending_event()
            .map_or(self.duration_ms, PlaybackEvent::at_ms)
    }

    fn pop_due(&mut self, elapsed: u64) -> Option<Due> {
        if let Some(event) = self.pending_event() {
            if event.at_ms() > elapsed {
                return None;
            }
            let event = event.clone();
            self.next_event += 1;
            return Some(Due::Event(event));
        }

        (elapsed >= self.duration_ms).then_some(Due::Complete)
    }
}

pub struct PlaybackScheduler {
    clock: Box<dyn Clock>,
    resolver: AssetResolver,
    effects: EffectController,
    audio: Box<dyn AudioOutput>,
    haptics: Box<dyn HapticOutput>,
    audio_players: PlayerSet,
    haptic_players: PlayerSet,
    triggers: TriggerLog,
    surface: Size,
    progress_interval_ms: u64,
    session: SessionToken,
    timeline: Option<ActiveTimeline>,
    pending_media: Vec<MediaRequest>,
    current_ms: u64,
    error_message: Option<String>,
}

impl PlaybackScheduler {
    pub fn new(config: &PlaybackConfig, clock: Box<dyn Clock>, registry: EffectRegistry) -> Self {
        Self {
            clock,
            resolver: AssetResolver::default(),
            effects: EffectController::new(registry),
            audio: Box::new(NullAudioOutput),
            haptics: Box::new(NullHapticOutput),
            audio_players: PlayerSet::default(),
            haptic_players: PlayerSet::default(),
            triggers: TriggerLog::new(config.trigger_log_capacity),
            surface: Size::default(),
            progress_interval_ms: config.progress_interval_ms.max(1),
            session: SessionToken::default(),
            timeline: None,
            pending_media: Vec::new(),
            current_ms: 0,
            error_message: None,
        }
    }

    pub fn with_resolver(mut self, resolver: AssetResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_audio(mut self, audio: Box<dyn AudioOutput>) -> Self {
        self.audio = audio;
        self
    }

    pub fn with_haptics(mut self, haptics: Box<dyn HapticOutput>) -> Self {
        self.haptics = haptics;
        self
    }

    pub fn with_surface(mut self, surface: Size) -> Self {
        self.surface = surface;
        self
    }

    /// Starts a new session for `record`, implicitly stopping the previous one
    /// without resetting the displayed position.
    pub fn play(&mut self, record: &MeditationRecord) -> SessionToken {
        self.cancel_session();
        self.triggers.clear();
        self.error_message = None;

        let events = parse_entries(&record.timeline_entries);
        tracing::info!(
            meditation = %record.id,
            events = events.len(),
            duration_ms = record.duration_ms,
            session = self.session.value(),
            "starting playback"
        );

        self.timeline = Some(ActiveTimeline {
            started_at: self.clock.now_ms(),
            duration_ms: record.duration_ms,
            events,
            next_event: 0,
        });
        self.session
    }

    /// Cancels every pending timer, releases active players and clears the
    /// visual effect. Safe to call repeatedly.
    pub fn stop(&mut self, reset_elapsed: bool) {
        self.cancel_session();
        if reset_elapsed {
            self.current_ms = 0;
        }
    }

    /// Fires every timer that is due and refreshes the progress cursor.
    pub fn advance(&mut self) {
        let now = self.clock.now_ms();

        while let Some(timeline) = self.timeline.as_mut() {
            let elapsed = now.saturating_sub(timeline.started_at);
            match timeline.pop_due(elapsed) {
                Some(Due::Event(event)) => self.dispatch(event),
                Some(Due::Complete) => {
                    let duration_ms = timeline.duration_ms;
                    tracing::info!(duration_ms, "meditation finished");
                    self.cancel_session();
                    self.current_ms = duration_ms;
                }
                None => {
                    self.current_ms = elapsed;
                    break;
                }
            }
        }
    }

    /// Time until the next event, the terminal timer or the next progress
    /// tick, whichever comes first. `None` while idle.
    pub fn until_next_wake(&self) -> Option<Duration> {
        let timeline = self.timeline.as_ref()?;
        let elapsed = self.clock.now_ms().saturating_sub(timeline.started_at);
        let next_tick = elapsed + self.progress_interval_ms;
        let wake = timeline.next_deadline().min(next_tick);
        Some(Duration::from_millis(wake.saturating_sub(elapsed)))
    }

    /// Drains fetches issued by fired `wav` and `ahap` events.
    pub fn take_media_requests(&mut self) -> Vec<MediaRequest> {
        std::mem::take(&mut self.pending_media)
    }

    /// Applies a finished fetch. Completions from an earlier session are
    /// dropped so a late download cannot resurrect stopped playback.
    pub fn complete_media(&mut self, completion: MediaCompletion) {
        let MediaCompletion { request, result } = completion;
        if request.session != self.session {
            tracing::debug!(
                session = request.session.value(),
                file = %request.file,
                "discarding stale media completion"
            );
            return;
        }

        let started = result.and_then(|bytes| match request.kind {
            MediaKind::Audio => self.audio.start(&request.file, bytes),
            MediaKind::Haptic => {
                let pattern = HapticPattern::from_ahap(&bytes)?;
                self.haptics.start(&pattern)
            }
        });

        match started {
            Ok(player) => {
                tracing::debug!(file = %request.file, kind = request.kind.label(), "player started");
                match request.kind {
                    MediaKind::Audio => self.audio_players.push(player),
                    MediaKind::Haptic => self.haptic_players.push(player),
                }
            }
            Err(err) => self.report_media_failure(request.kind, request.at_ms, &request.file, &err),
        }
    }

    /// Per-frame tick from the host render loop.
    pub fn render_frame(&mut self, delta_ms: f64) {
        self.effects.update(delta_ms.max(0.0));
    }

    pub fn resize(&mut self, surface: Size) {
        self.surface = surface;
        self.effects.resize(surface);
    }

    pub fn clear_triggers(&mut self) {
        self.triggers.clear();
    }

    /// Drops the surfaced error without touching the session.
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn is_playing(&self) -> bool {
        self.timeline.is_some()
    }

    pub fn current_ms(&self) -> u64 {
        self.current_ms
    }

    pub fn session(&self) -> SessionToken {
        self.session
    }

    pub fn triggers(&self) -> &TriggerLog {
        &self.triggers
    }

    pub fn active_effect(&self) -> Option<VisualEffectId> {
        self.effects.active()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn graph(&self) -> &RenderGraph {
        self.effects.graph()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            is_playing: self.is_playing(),
            current_ms: self.current_ms,
            recent_triggers: self.triggers.to_vec(),
            active_effect: self.active_effect(),
            error_message: self.error_message.clone(),
        }
    }

    fn cancel_session(&mut self) {
        let was_playing = self.timeline.take().is_some();
        self.session = self.session.next();
        self.pending_media.clear();
        self.audio_players.stop_all();
        self.haptic_players.stop_all();
        self.effects.clear();

        if was_playing {
            self.haptics.shutdown();
            tracing::debug!(current_ms = self.current_ms, "playback session cancelled");
        }
    }

    fn dispatch(&mut self, event: PlaybackEvent) {
        tracing::info!(
            at_ms = event.at_ms(),
            kind = event.kind_label(),
            target = event.target_label(),
            "timeline event fired"
        );

        if let PlaybackEvent::Effect { at_ms, effect_id } = &event {
            let Some(effect) = VisualEffectId::parse(effect_id) else {
                self.abort_unresolved_effect(*at_ms, effect_id);
                return;
            };
            self.effects.switch_to(effect, self.surface);
        }

        self.triggers.push(event.trigger_description());

        match event {
            PlaybackEvent::Wav { at_ms, file } => self.request_media(MediaKind::Audio, at_ms, file),
            PlaybackEvent::Ahap {
                at_ms,
                file: Some(file),
            } => {
                if self.haptics.is_supported() {
                    self.request_media(MediaKind::Haptic, at_ms, file);
                } else {
                    let err = PlayerError::HapticsUnavailable;
                    self.report_media_failure(MediaKind::Haptic, at_ms, &file, &err);
                }
            }
            PlaybackEvent::Ahap { at_ms, file: None } => {
                let err = PlayerError::MissingPatternFile;
                tracing::warn!(at_ms, "{err}");
                self.triggers.push(format!("[{at_ms}ms] ahap error: missing file"));
                self.error_message = Some(err.to_string());
            }
            PlaybackEvent::Effect { .. } | PlaybackEvent::Unknown { .. } => {}
        }
    }

    fn request_media(&mut self, kind: MediaKind, at_ms: u64, file: String) {
        match self.resolver.resolve(&file) {
            Ok(url) => self.pending_media.push(MediaRequest {
                session: self.session,
                kind,
                at_ms,
                file,
                url,
            }),
            Err(err) => self.report_media_failure(kind, at_ms, &file, &err),
        }
    }

    fn report_media_failure(&mut self, kind: MediaKind, at_ms: u64, file: &str, err: &PlayerError) {
        tracing::warn!(at_ms, file, kind = kind.label(), "media playback failed: {err}");
        self.triggers
            .push(format!("[{at_ms}ms] {} error: {file}", kind.label()));
        self.error_message = Some(match kind {
            MediaKind::Audio => format!("Audio playback failed: {err}"),
            MediaKind::Haptic => format!("Haptic playback failed: {err}"),
        });
    }

    /// An effect id outside the closed set ends the session, pinning the
    /// cursor to the offending event.
    fn abort_unresolved_effect(&mut self, at_ms: u64, effect_id: &str) {
        let err = PlayerError::UnresolvedEffect(effect_id.to_string());
        tracing::warn!(at_ms, effect_id, "{err}");

        self.triggers
            .push(format!("[{at_ms}ms] effect error: {effect_id}"));
        self.error_message = Some(err.to_string());
        self.current_ms = at_ms;
        self.cancel_session();
    }
}

impl Drop for PlaybackScheduler {
    fn drop(&mut self) {
        self.stop(false);
    }
}

impl std::fmt::Debug for PlaybackScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackScheduler")
            .field("session", &self.session)
            .field("is_playing", &self.is_playing())
            .field("current_ms", &self.current_ms)
            .field("effects", &self.effects)
            .field("audio_players", &self.audio_players)
            .field("haptic_players", &self.haptic_players)
            .field("pending_media", &self.pending_media.len())
            .finish()
    }
}
