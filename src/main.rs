//! Crown Home Demo
//!
//! Runs one home through a short session: ticks, an offline gap, a save and
//! a reload, then checks that the reloaded snapshot encodes identically.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crown_home::{
    EngineConfig, GameContent, GlobalId, Home, Player, TICK_SECONDS, VERSION,
    content::{CLASS_CHARACTER, CLASS_SPELL},
    core::hash::{short_hex, snapshot_digest},
    game::{HomeEvent, Spell},
    network::{HomeSession, SessionConfig},
    storage::SnapshotStore,
};

/// Offline gap simulated between the two sessions.
const OFFLINE_SECONDS: i32 = 6 * 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = EngineConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Crown Home v{}", VERSION);
    info!("Tick: {:?} ({} game second per tick)", config.tick_interval, TICK_SECONDS);

    let content = match &config.content_path {
        Some(path) => GameContent::from_path(path)
            .with_context(|| format!("loading content from {}", path.display()))?,
        None => GameContent::bundled().context("loading bundled content")?,
    };
    let content = Arc::new(content);

    demo_offline_catch_up(&content)?;
    demo_session(&config, content).await
}

/// Drive a home directly: a few ticks, a long gap, then a codec check.
fn demo_offline_catch_up(content: &GameContent) -> anyhow::Result<()> {
    info!("=== Offline Catch-Up ===");

    let mut home = Home::new(0, 1, content);
    let mut player = Player::new(0, 1, content);

    for index in 0..4 {
        home.add_spell(Spell::new(GlobalId::new(CLASS_CHARACTER, index)));
    }
    home.add_spell(Spell::new(GlobalId::new(CLASS_SPELL, 0)));
    home.loading_finished(content, &mut player);

    for _ in 0..5 {
        let result = home.tick(content, &mut player, Utc::now());
        log_events(&result.events);
    }

    player.add_stars(content.globals().crown_chest_crown_count);
    let result = home.tick(content, &mut player, Utc::now());
    log_events(&result.events);

    info!("Fast-forwarding {} seconds", OFFLINE_SECONDS);
    let result = home.fast_forward(OFFLINE_SECONDS, content, &mut player);
    log_events(&result.events);
    info!(
        "Free chests: {}, chests in slots: {}, crown chest: {}",
        home.free_chest_count,
        home.chest_count(),
        home.star_chest.is_some()
    );

    let bytes = home.to_bytes();
    let decoded = Home::from_bytes(&bytes).context("decoding own snapshot")?;
    let digest = snapshot_digest(&bytes);
    let replay_digest = snapshot_digest(&decoded.to_bytes());

    info!("Snapshot: {} bytes, digest {}", bytes.len(), hex::encode(digest));
    if digest != replay_digest {
        bail!("snapshot digests differ after round trip");
    }
    info!("CODEC VERIFIED: checksum {}", home.checksum());
    Ok(())
}

/// Run the same home as a session actor backed by the snapshot store.
async fn demo_session(config: &EngineConfig, content: Arc<GameContent>) -> anyhow::Result<()> {
    info!("=== Session ===");

    let store = SnapshotStore::open(&config.snapshot_dir)
        .await
        .with_context(|| format!("opening snapshot dir {}", config.snapshot_dir.display()))?;

    let home = store.load_or_create(0, 2, &content).await?;
    let player = Player::new(0, 2, &content);
    let (outbound_tx, mut outbound_rx) = mpsc::channel(8);

    let (handle, task) = HomeSession::new(home, player, Arc::clone(&content))
        .with_config(SessionConfig::from(config))
        .with_store(store.clone())
        .with_outbound(outbound_tx)
        .spawn();

    let mut events = handle.subscribe_events();
    let events_task = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("Event: {}", event.kind());
        }
    });

    handle.send_own_home_data().await?;
    if let Some(message) = outbound_rx.recv().await {
        info!(
            "Own home data queued for {:?}: {} byte payload",
            message.node,
            message.frame.payload.len()
        );
    }

    for _ in 0..3 {
        handle.tick().await?;
    }
    tokio::time::sleep(config.tick_interval.min(Duration::from_secs(2))).await;

    if let Some(digest) = handle.save().await? {
        info!("Saved home {}: {}", handle.home_id(), short_hex(&digest));
    }

    handle.shutdown().await?;
    let home = task.await.context("session task panicked")??;
    events_task.abort();

    match store.load(home.home_id()).await? {
        Some(reloaded) if reloaded == home => info!("PERSISTENCE VERIFIED"),
        Some(_) => warn!("Reloaded snapshot differs from the final home"),
        None => warn!("No snapshot written"),
    }
    Ok(())
}

fn log_events(events: &[HomeEvent]) {
    for event in events {
        info!("Event: {}", event.kind());
    }
}
