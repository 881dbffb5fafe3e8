use serde::{Deserialize, Serialize};
use serde_json::Value;

const FALLBACK_TITLE: &str = "Metta Meditation";

/// Backend generation state of a meditation's assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Ready,
    Failed,
    Unknown,
}

impl GenerationStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "ready" => Self::Ready,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
            Self::Unknown => "Unknown",
        }
    }
}

/// A meditation as delivered by the backend. Immutable once fetched; the raw
/// timeline entries are parsed lazily per play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeditationRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub script: String,
    pub status: GenerationStatus,
    pub duration_ms: u64,
    pub timeline_entries: Vec<Value>,
}

impl MeditationRecord {
    /// Builds a record from one catalog item, or `None` when `id`, `title` or
    /// a numeric `durationMs` is missing. Fractional durations truncate and
    /// negative ones clamp to zero.
    pub fn from_json(value: &Value) -> Option<Self> {
        let id = value.get("id")?.as_str()?;
        let title = value.get("title")?.as_str()?;
        let duration = value.get("durationMs")?;
        let duration_ms = match duration.as_u64() {
            Some(ms) => ms,
            None => {
                let ms = duration.as_f64().filter(|ms| ms.is_finite())?;
                ms.max(0.0).trunc() as u64
            }
        };

        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Some(Self {
            id: id.to_string(),
            title: title.to_string(),
            description: text("description"),
            script: text("script"),
            status: GenerationStatus::parse(&text("status")),
            duration_ms,
            timeline_entries: value
                .get("timeline")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
        })
    }

    /// Short title built from the first words of the description.
    pub fn short_display_title(&self) -> String {
        let preview = self
            .description
            .split_whitespace()
            .take(3)
            .collect::<Vec<_>>()
            .join(" ");
        if preview.is_empty() {
            FALLBACK_TITLE.to_string()
        } else {
            format!("{FALLBACK_TITLE} - {preview}...")
        }
    }
}

/// Parses a catalog payload, silently dropping malformed records.
pub fn parse_catalog(payload: &Value) -> Vec<MeditationRecord> {
    let Some(items) = payload.as_array() else {
        tracing::debug!("meditation catalog is not an array");
        return Vec::new();
    };

    let records: Vec<_> = items.iter().filter_map(MeditationRecord::from_json).collect();
    if records.len() != items.len() {
        tracing::debug!(
            parsed = records.len(),
            total = items.len(),
            "dropped malformed meditation records"
        );
    }
    records
}
