use std::time::{Duration, Instant};

use meditation_player_core::{MeditationPlayer, PlayerError, Result};
use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};

use crate::fetch::spawn_fetch;

/// Drives the selected meditation until it completes, an error stops it or
/// the user presses Ctrl-C.
pub async fn run(player: &mut MeditationPlayer, frame_interval: Duration) -> Result<()> {
    if !player.play() {
        return Err(PlayerError::msg("no meditation selected"));
    }

    let (completions_tx, mut completions) = mpsc::unbounded_channel();
    let mut frames = time::interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();
    let mut shown_effect = None;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let scheduler = player.scheduler_mut();
        scheduler.advance();
        for request in scheduler.take_media_requests() {
            tracing::debug!(file = %request.file, url = %request.url, "fetching media");
            spawn_fetch(request, completions_tx.clone());
        }

        let effect = scheduler.active_effect();
        if effect != shown_effect {
            match effect {
                Some(id) => tracing::info!(
                    effect = id.display_name(),
                    nodes = scheduler.graph().len(),
                    "visual effect changed"
                ),
                None => tracing::debug!("visual effect cleared"),
            }
            shown_effect = effect;
        }

        let Some(wait) = scheduler.until_next_wake() else {
            break;
        };

        tokio::select! {
            _ = time::sleep(wait) => {}
            Some(completion) = completions.recv() => {
                scheduler.complete_media(completion);
            }
            _ = frames.tick() => {
                let now = Instant::now();
                let delta = now.duration_since(last_frame);
                last_frame = now;
                scheduler.render_frame(delta.as_secs_f64() * 1000.0);
            }
            result = &mut ctrl_c => {
                if let Err(err) = result {
                    tracing::warn!("listening for Ctrl-C failed: {err}");
                }
                tracing::info!("interrupted");
                scheduler.stop(false);
                break;
            }
        }
    }

    Ok(())
}
