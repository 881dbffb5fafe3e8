use url::Url;

use crate::Result;

/// Identifies one play session. Asynchronous completions carry the token of
/// the session that issued them and are discarded when it no longer matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionToken(u64);

impl SessionToken {
    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Haptic,
}

impl MediaKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Audio => "wav",
            Self::Haptic => "ahap",
        }
    }
}

/// A fetch the host should perform on behalf of a fired timeline event.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRequest {
    pub session: SessionToken,
    pub kind: MediaKind,
    pub at_ms: u64,
    pub file: String,
    pub url: Url,
}

/// Outcome of a [`MediaRequest`], handed back to the scheduler.
#[derive(Debug)]
pub struct MediaCompletion {
    pub request: MediaRequest,
    pub result: Result<Vec<u8>>,
}

impl MediaCompletion {
    pub fn new(request: MediaRequest, result: Result<Vec<u8>>) -> Self {
        Self { request, result }
    }
}

/// Handle to something audible or tactile that is currently playing.
pub trait ActivePlayer {
    fn is_playing(&self) -> bool;
    fn stop(&mut self);
}

/// Platform audio playback. Decoding is the implementation's business; the
/// engine only hands over fetched bytes.
pub trait AudioOutput {
    fn start(&mut self, file: &str, bytes: Vec<u8>) -> Result<Box<dyn ActivePlayer>>;
}

/// Audio output that accepts every clip and plays nothing.
#[derive(Debug, Default)]
pub struct NullAudioOutput;

impl AudioOutput for NullAudioOutput {
    fn start(&mut self, file: &str, bytes: Vec<u8>) -> Result<Box<dyn ActivePlayer>> {
        tracing::debug!(file, bytes = bytes.len(), "discarding audio clip");
        Ok(Box::new(SilentPlayer { playing: false }))
    }
}

/// Player that is already finished; used by outputs that play nothing.
#[derive(Debug, Default)]
pub struct SilentPlayer {
    playing: bool,
}

impl ActivePlayer for SilentPlayer {
    fn is_playing(&self) -> bool {
        self.playing
    }

    fn stop(&mut self) {
        self.playing = false;
    }
}

/// Active players of one kind for the running session.
#[derive(Default)]
pub struct PlayerSet {
    players: Vec<Box<dyn ActivePlayer>>,
}

impl PlayerSet {
    /// Adds `player`, dropping the ones that have finished on their own.
    pub fn push(&mut self, player: Box<dyn ActivePlayer>) {
        self.players.retain(|active| active.is_playing());
        self.players.push(player);
    }

    /// Stops and releases every player.
    pub fn stop_all(&mut self) {
        for mut player in self.players.drain(..) {
            player.stop();
        }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl std::fmt::Debug for PlayerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSet")
            .field("players", &self.players.len())
            .finish()
    }
}
