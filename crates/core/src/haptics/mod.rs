//! AHAP haptic patterns and the haptic output capability.

use serde::Deserialize;

use crate::{audio::ActivePlayer, PlayerError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HapticEventKind {
    Transient,
    Continuous { duration: f64 },
}

/// One tactile event, timed in seconds from the start of the pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct HapticEvent {
    pub time: f64,
    pub kind: HapticEventKind,
    pub intensity: f32,
    pub sharpness: f32,
}

/// Compiled haptic pattern ready to hand to a [`HapticOutput`].
#[derive(Debug, Clone, PartialEq)]
pub struct HapticPattern {
    pub events: Vec<HapticEvent>,
}

impl HapticPattern {
    /// Parses an Apple Haptic and Audio Pattern (AHAP) document.
    ///
    /// Audio events and parameter curves are skipped. A payload without any
    /// haptic event is rejected.
    pub fn from_ahap(payload: &[u8]) -> Result<Self> {
        let document: AhapDocument = serde_json::from_slice(payload)
            .map_err(|err| PlayerError::UnsupportedPattern(err.to_string()))?;

        let mut events: Vec<_> = document
            .pattern
            .into_iter()
            .filter_map(|entry| entry.event)
            .filter_map(AhapEvent::compile)
            .collect();
        if events.is_empty() {
            return Err(PlayerError::UnsupportedPattern(
                "pattern has no haptic events".to_string(),
            ));
        }

        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self { events })
    }

    /// Seconds until the last event has finished.
    pub fn duration(&self) -> f64 {
        self.events
            .iter()
            .map(|event| match event.kind {
                HapticEventKind::Transient => event.time,
                HapticEventKind::Continuous { duration } => event.time + duration,
            })
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AhapDocument {
    pattern: Vec<AhapEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AhapEntry {
    #[serde(default)]
    event: Option<AhapEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AhapEvent {
    #[serde(default)]
    time: f64,
    event_type: String,
    #[serde(default)]
    event_duration: Option<f64>,
    #[serde(default)]
    event_parameters: Vec<AhapParameter>,
}

#[derive(Debug, Deserialize)]
struct AhapParameter {
    #[serde(rename = "ParameterID")]
    id: String,
    #[serde(rename = "ParameterValue")]
    value: f32,
}

impl AhapEvent {
    fn compile(self) -> Option<HapticEvent> {
        let kind = match self.event_type.as_str() {
            "HapticTransient" => HapticEventKind::Transient,
            "HapticContinuous" => HapticEventKind::Continuous {
                duration: self.event_duration.unwrap_or(0.0).max(0.0),
            },
            _ => return None,
        };

        let parameter = |id: &str, default: f32| {
            self.event_parameters
                .iter()
                .find(|parameter| parameter.id == id)
                .map_or(default, |parameter| parameter.value.clamp(0.0, 1.0))
        };

        Some(HapticEvent {
            time: self.time.max(0.0),
            kind,
            intensity: parameter("HapticIntensity", 1.0),
            sharpness: parameter("HapticSharpness", 0.5),
        })
    }
}

/// Platform haptic engine.
pub trait HapticOutput {
    /// Whether the device can play haptics at all.
    fn is_supported(&self) -> bool;

    fn start(&mut self, pattern: &HapticPattern) -> Result<Box<dyn ActivePlayer>>;

    /// Stops the underlying engine once the session's players are released.
    fn shutdown(&mut self) {}
}

/// Haptic output for hosts without a haptic engine.
#[derive(Debug, Default)]
pub struct NullHapticOutput;

impl HapticOutput for NullHapticOutput {
    fn is_supported(&self) -> bool {
        false
    }

    fn start(&mut self, _pattern: &HapticPattern) -> Result<Box<dyn ActivePlayer>> {
        Err(PlayerError::HapticsUnavailable)
    }
}
