//! Pose sequence playback against a simulated video clock.
//!
//! Drives a [`PosePlayer`] the way a video element would: `LoadedData`,
//! `Play`, then a `TimeUpdate` per tick until the clock passes the last
//! frame. A line is printed whenever the active frame changes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use hoopform_client::source::{DefaultPoseSource, SequenceLocator};
use hoopform_core::overlay::OverlayGeometry;
use hoopform_core::pose::FrameSize;
use hoopform_player::{PlayerSnapshot, PlayerStatus, PosePlayer};
use tokio_util::sync::CancellationToken;

use crate::commands::App;

pub struct ReplayOptions {
    pub locator: SequenceLocator,
    pub speed: f64,
    pub tick_rate: u32,
    pub render: FrameSize,
}

pub async fn replay(app: &App, options: ReplayOptions) -> anyhow::Result<()> {
    if !(options.speed.is_finite() && options.speed > 0.0) {
        bail!("--speed must be a positive number");
    }
    if options.tick_rate == 0 {
        bail!("--tick-rate must be at least 1");
    }

    let source = Arc::new(DefaultPoseSource::new(Arc::new(app.api.clone())));
    let cancel = CancellationToken::new();
    let (player, task) = PosePlayer::spawn(source, app.config.video_base.clone(), cancel.clone());

    player.load(Some(options.locator.clone())).await?;
    player.snapshot().await?;
    let loaded = player
        .wait_for(|s| matches!(s.status, PlayerStatus::Ready | PlayerStatus::Error))
        .await?;
    if let Some(error) = loaded.error {
        cancel.cancel();
        bail!("Cannot replay {}: {error}", options.locator);
    }

    println!(
        "Replaying {} ({} frames, {:.2}s){}",
        options.locator,
        loaded.frame_count,
        loaded.duration,
        loaded
            .video_url
            .as_deref()
            .map(|u| format!(", video {u}"))
            .unwrap_or_default()
    );

    let tick = Duration::from_secs_f64(1.0 / f64::from(options.tick_rate));
    let step = tick.as_secs_f64() * options.speed;
    let mut interval = tokio::time::interval(tick);
    let mut clock = 0.0;

    player.loaded_data().await?;
    player.play(clock).await?;
    let mut last = player.snapshot().await?;
    print_frame(&last, clock, options.render);

    while clock < loaded.duration {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("Interrupted at {clock:.2}s");
                break;
            }
            _ = interval.tick() => {}
        }
        clock += step;
        player.time_update(clock).await?;

        let current = player.snapshot().await?;
        if current.active_index != last.active_index {
            print_frame(&current, clock, options.render);
        }
        last = current;
    }

    player.pause().await?;
    cancel.cancel();
    task.await?;
    Ok(())
}

fn print_frame(snapshot: &PlayerSnapshot, clock: f64, render: FrameSize) {
    let overlay = snapshot
        .source_size
        .map(|source| OverlayGeometry::build(&snapshot.keypoints, source, render))
        .unwrap_or_default();
    let metrics = snapshot
        .metrics
        .iter()
        .map(|(k, v)| format!("{k}={v:.2}"))
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "[{clock:>6.2}s] frame {:>4}/{}  joints {:>2}  bones {:>2}  {metrics}",
        snapshot.active_index + 1,
        snapshot.frame_count,
        overlay.markers.len(),
        overlay.segments.len(),
    );
}
