use serde::Serialize;
use serde_json::Value;

use crate::{
    playback::PlaybackScheduler,
    record::{parse_catalog, MeditationRecord},
    scene::VisualEffectId,
    timeline::{parse_entries, PlaybackEvent},
    Result,
};

/// Supplies the raw meditation catalog (a JSON array of records).
pub trait MeditationSource {
    fn fetch_catalog(&self) -> Result<Value>;
}

/// Everything a front end renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub meditations: Vec<MeditationSummary>,
    pub is_loading_meditations: bool,
    pub selected_meditation_id: Option<String>,
    pub is_playing: bool,
    pub current_ms: u64,
    pub recent_triggers: Vec<String>,
    pub active_effect_id: Option<VisualEffectId>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeditationSummary {
    pub id: String,
    pub title: String,
    pub duration_ms: u64,
}

/// The meditation library screen: the catalog, the selection and the
/// scheduler playing it.
#[derive(Debug)]
pub struct MeditationPlayer {
    meditations: Vec<MeditationRecord>,
    is_loading: bool,
    selected_id: Option<String>,
    load_error: Option<String>,
    scheduler: PlaybackScheduler,
}

impl MeditationPlayer {
    pub fn new(scheduler: PlaybackScheduler) -> Self {
        Self {
            meditations: Vec::new(),
            is_loading: false,
            selected_id: None,
            load_error: None,
            scheduler,
        }
    }

    /// Marks a catalog load as in flight and clears any surfaced error.
    /// Returns `false` when a load already is in flight.
    pub fn begin_loading(&mut self) -> bool {
        if self.is_loading {
            return false;
        }
        self.is_loading = true;
        self.load_error = None;
        self.scheduler.clear_error();
        true
    }

    pub fn finish_loading(&mut self, result: Result<Vec<MeditationRecord>>) {
        self.is_loading = false;
        match result {
            Ok(meditations) => {
                tracing::info!(count = meditations.len(), "meditations loaded");
                if self.selected_id.is_none() {
                    self.selected_id = meditations.first().map(|record| record.id.clone());
                }
                self.meditations = meditations;
            }
            Err(err) => {
                tracing::warn!("loading meditations failed: {err}");
                self.load_error = Some(format!("Failed to load meditations: {err}"));
            }
        }
    }

    /// Fetches and parses the catalog from `source`. Does nothing while a
    /// previous load is still in flight.
    pub fn load_meditations(&mut self, source: &dyn MeditationSource) {
        if !self.begin_loading() {
            return;
        }
        let result = source
            .fetch_catalog()
            .map(|payload| parse_catalog(&payload));
        self.finish_loading(result);
    }

    /// Switches the active record. Always stops with reset so no timer of the
    /// previous session can fire against the new selection.
    pub fn select_meditation(&mut self, id: &str) {
        self.scheduler.stop(true);
        self.scheduler.clear_triggers();
        self.selected_id = Some(id.to_string());
    }

    /// Plays the selected meditation from the start. Returns `false` when
    /// nothing is selected.
    pub fn play(&mut self) -> bool {
        let Some(record) = self.selected_meditation().cloned() else {
            return false;
        };

        self.scheduler.stop(true);
        self.load_error = None;
        self.scheduler.play(&record);
        true
    }

    pub fn stop(&mut self, reset_elapsed: bool) {
        self.scheduler.stop(reset_elapsed);
    }

    pub fn meditations(&self) -> &[MeditationRecord] {
        &self.meditations
    }

    pub fn selected_meditation(&self) -> Option<&MeditationRecord> {
        let id = self.selected_id.as_deref()?;
        self.meditations.iter().find(|record| record.id == id)
    }

    pub fn selected_timeline(&self) -> Vec<PlaybackEvent> {
        self.selected_meditation()
            .map(|record| parse_entries(&record.timeline_entries))
            .unwrap_or_default()
    }

    /// Playback progress of the selection in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let Some(record) = self.selected_meditation() else {
            return 0.0;
        };
        let denominator = record.duration_ms.max(1) as f64;
        (self.scheduler.current_ms() as f64 / denominator).min(1.0)
    }

    pub fn scheduler(&self) -> &PlaybackScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut PlaybackScheduler {
        &mut self.scheduler
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let playback = self.scheduler.snapshot();
        PlayerSnapshot {
            meditations: self
                .meditations
                .iter()
                .map(|record| MeditationSummary {
                    id: record.id.clone(),
                    title: record.title.clone(),
                    duration_ms: record.duration_ms,
                })
                .collect(),
            is_loading_meditations: self.is_loading,
            selected_meditation_id: self.selected_id.clone(),
            is_playing: playback.is_playing,
            current_ms: playback.current_ms,
            recent_triggers: playback.recent_triggers,
            active_effect_id: playback.active_effect,
            error_message: playback.error_message.or_else(|| self.load_error.clone()),
        }
    }
}
