use meditation_player_core::{
    ActivePlayer, AudioOutput, HapticOutput, HapticPattern, Result, SilentPlayer,
};

/// Stands in for a sound device: every clip is accepted and logged.
#[derive(Debug, Default)]
pub struct LoggingAudioOutput;

impl AudioOutput for LoggingAudioOutput {
    fn start(&mut self, file: &str, bytes: Vec<u8>) -> Result<Box<dyn ActivePlayer>> {
        tracing::info!(file, bytes = bytes.len(), "audio clip started");
        Ok(Box::new(SilentPlayer::default()))
    }
}

/// Stands in for a haptic engine.
#[derive(Debug, Default)]
pub struct LoggingHapticOutput;

impl HapticOutput for LoggingHapticOutput {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&mut self, pattern: &HapticPattern) -> Result<Box<dyn ActivePlayer>> {
        tracing::info!(
            events = pattern.events.len(),
            duration_s = pattern.duration(),
            "haptic pattern started"
        );
        Ok(Box::new(SilentPlayer::default()))
    }

    fn shutdown(&mut self) {
        tracing::debug!("haptic engine stopped");
    }
}
