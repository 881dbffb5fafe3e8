use serde::Serialize;
use serde_json::Value;

/// A timeline cue normalised from a raw entry.
///
/// `Wav` and `Effect` only exist when their payload field is present;
/// otherwise the entry degrades to `Unknown` and keeps its raw fields for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlaybackEvent {
    Wav {
        at_ms: u64,
        file: String,
    },
    Effect {
        at_ms: u64,
        effect_id: String,
    },
    Ahap {
        at_ms: u64,
        file: Option<String>,
    },
    Unknown {
        at_ms: u64,
        raw_kind: String,
        file: Option<String>,
        effect_id: Option<String>,
    },
}

impl PlaybackEvent {
    pub fn at_ms(&self) -> u64 {
        match self {
            Self::Wav { at_ms, .. }
            | Self::Effect { at_ms, .. }
            | Self::Ahap { at_ms, .. }
            | Self::Unknown { at_ms, .. } => *at_ms,
        }
    }

    /// Kind shown to users; unknown events show their raw kind.
    pub fn kind_label(&self) -> &str {
        match self {
            Self::Wav { .. } => "wav",
            Self::Effect { .. } => "effect",
            Self::Ahap { .. } => "ahap",
            Self::Unknown { raw_kind, .. } => raw_kind,
        }
    }

    pub fn target_label(&self) -> &str {
        match self {
            Self::Wav { file, .. } => file,
            Self::Effect { effect_id, .. } => effect_id,
            Self::Ahap { file, .. } => file.as_deref().unwrap_or("trigger"),
            Self::Unknown {
                file, effect_id, ..
            } => file
                .as_deref()
                .or(effect_id.as_deref())
                .unwrap_or("trigger"),
        }
    }

    /// Line appended to the trigger log when the event fires.
    pub fn trigger_description(&self) -> String {
        match self {
            Self::Wav { at_ms, file } => format!("[{at_ms}ms] wav: {file}"),
            Self::Effect { at_ms, effect_id } => format!("[{at_ms}ms] effect: {effect_id}"),
            Self::Ahap {
                at_ms,
                file: Some(file),
            } => format!("[{at_ms}ms] ahap: {file}"),
            Self::Ahap { at_ms, file: None } => format!("[{at_ms}ms] ahap"),
            Self::Unknown {
                at_ms, raw_kind, ..
            } => format!("[{at_ms}ms] {raw_kind}"),
        }
    }
}

/// Normalises raw timeline entries into events sorted by `at_ms`.
///
/// Anything that is not an array yields no events. Malformed entries never
/// fail the parse; they degrade to [`PlaybackEvent::Unknown`].
pub fn extract_playback_events(timeline: &Value) -> Vec<PlaybackEvent> {
    match timeline.as_array() {
        Some(entries) => parse_entries(entries),
        None => Vec::new(),
    }
}

pub fn parse_entries(entries: &[Value]) -> Vec<PlaybackEvent> {
    let mut events: Vec<_> = entries.iter().map(classify).collect();
    events.sort_by_key(PlaybackEvent::at_ms);
    events
}

fn classify(entry: &Value) -> PlaybackEvent {
    let at_ms = parse_at_ms(entry.get("atMs"));
    let raw_kind = entry
        .get("kind")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let file = non_empty_str(entry.get("file"));
    let effect_id = non_empty_str(entry.get("effectId"));

    match (raw_kind.as_str(), file, effect_id) {
        ("wav", Some(file), _) => PlaybackEvent::Wav { at_ms, file },
        ("effect", _, Some(effect_id)) => PlaybackEvent::Effect { at_ms, effect_id },
        ("ahap", file, _) => PlaybackEvent::Ahap { at_ms, file },
        (raw_kind, file, effect_id) => PlaybackEvent::Unknown {
            at_ms,
            raw_kind: raw_kind.to_string(),
            file,
            effect_id,
        },
    }
}

fn parse_at_ms(value: Option<&Value>) -> u64 {
    match value.and_then(Value::as_f64) {
        Some(ms) if ms.is_finite() && ms > 0.0 => ms.trunc() as u64,
        _ => 0,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
