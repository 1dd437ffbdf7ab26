//! Boot one page and report the resulting state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use folio_adapters::infrastructure::SiteConfig;
use folio_domain::{AppEvent, GestureKind, VideoState};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::composition::{build_site, HeroVideo, Site};

/// How long to wait for the hero video after the simulated interaction.
const PLAYBACK_GRACE: Duration = Duration::from_secs(2);

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = SiteConfig::from_env()?;

    let default_filter = if config.debug { "folio=debug" } else { "folio=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(page = %config.page_url, root = ?config.site_root, "Starting Folio");

    let Site {
        bus,
        state,
        document,
        error_handler,
        initializer,
        video,
    } = build_site(&config)?;

    let cancel = CancellationToken::new();
    let hero = video.map(|video| {
        let HeroVideo {
            controller,
            element,
            mut events,
        } = video;
        let pump = Arc::clone(&controller);
        let token = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = events.recv() => match event {
                        Some(event) => pump.handle_event(event),
                        None => break,
                    },
                }
            }
        });
        (controller, element)
    });

    document.mark_ready();
    let boot = initializer.initialize().await;

    if let Some((controller, element)) = &hero {
        if boot.is_ok() && !controller.is_playing() && controller.state() != VideoState::Uninitialized {
            tracing::info!("Simulating first user interaction");
            element.activate();
            bus.publish(AppEvent::UserGesture {
                kind: GestureKind::Click,
            });
            let mut states = controller.subscribe();
            let playing = tokio::time::timeout(
                PLAYBACK_GRACE,
                states.wait_for(|s| *s == VideoState::Playing),
            )
            .await
            .map(|seen| seen.is_ok())
            .unwrap_or(false);
            if !playing {
                tracing::warn!(state = %controller.state(), "Hero video is not playing");
            }
        }
    }

    let snapshot = serde_json::json!({
        "state": state.snapshot(),
        "video": hero.as_ref().map(|(controller, _)| serde_json::json!({
            "state": controller.state(),
            "metrics": controller.metrics(),
        })),
        "errors": error_handler.records().len(),
        "lifecycle": initializer.registry().lifecycle().stats(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("Failed to render state snapshot")?
    );

    initializer.shutdown();
    cancel.cancel();

    let report = boot?;
    tracing::info!(
        modules = report.order.len(),
        failed = report.failed.len(),
        "Folio finished"
    );
    Ok(())
}
