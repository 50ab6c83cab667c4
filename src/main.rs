//! Tilt Maze
//!
//! Headless session: loads the configured catalogue, feeds a scripted tilt
//! sequence through the sampler and logs what the session does.
//!
//! Usage: `tilt-maze [config.json]`

use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tilt_maze::{
    Config, GameEngine, VERSION,
    game::input::TiltSample,
    persistence::{JsonFileRecords, MemoryRecords},
    session::{channel, Displays, SessionRunner, SolveRecorder, TiltSampler, TracingHaptics},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Tilt Maze v{}", VERSION);

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading config from {}", path))?,
        None => Config::default(),
    };

    let catalogue = config.load_catalogue().context("loading map catalogue")?;
    config.validate(&catalogue)?;
    info!(
        "Catalogue: {} maps, fingerprint {}",
        catalogue.len(),
        hex::encode(&catalogue.fingerprint()[..8])
    );

    let recorder: Box<dyn SolveRecorder> = match &config.records_path {
        Some(path) => Box::new(
            JsonFileRecords::open(path)
                .with_context(|| format!("opening records at {}", path.display()))?,
        ),
        None => Box::new(MemoryRecords::new()),
    };

    let mut engine = GameEngine::new(catalogue);
    engine.load_map(config.start_map);

    let (sender, receiver) = channel();
    let runner = SessionRunner::new(
        engine,
        config.clone(),
        Box::new(TracingHaptics),
        Displays::tracing(),
        recorder,
        &sender,
        receiver,
    );
    let session = tokio::spawn(runner.run());

    // Sampler runs on its own thread and only posts commands
    let mut sampler = TiltSampler::new(sender.clone(), config.tilt_threshold);
    let script = demo_script();
    tokio::task::spawn_blocking(move || {
        for sample in script {
            sampler.on_sample(sample)?;
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok::<_, tilt_maze::session::DispatchError>(())
    })
    .await
    .context("sampler thread panicked")??;

    let snapshot = sender.snapshot().await?;
    info!("Snapshot: {}", snapshot.to_json()?);
    info!("Snapshot hash: {}", hex::encode(snapshot.state_hash()));

    // Round trip through the binary codec and back into the session
    let decoded = tilt_maze::StateSnapshot::from_bytes(&snapshot.to_bytes()?)?;
    sender.post(tilt_maze::session::Message::Restart)?;
    sender.restore(Some(decoded)).await?;

    sender.shutdown()?;
    drop(sender);

    let engine = session.await.context("session task panicked")?;
    info!("=== Session Results ===");
    info!("Map: {} ({})", engine.current_map(), engine.map_name());
    info!("Steps: {}, goals left: {}", engine.step_count(), engine.goal_count());
    info!("Final State Hash: {}", hex::encode(engine.compute_hash()));

    Ok(())
}

/// Sweep through every direction a few times, levelling out between tilts.
fn demo_script() -> Vec<TiltSample> {
    let tilts = [
        TiltSample::new(4.0, 0.0),
        TiltSample::new(0.0, -4.0),
        TiltSample::new(-4.0, 0.0),
        TiltSample::new(0.0, 4.0),
    ];
    let level = TiltSample::default();

    (0..3)
        .flat_map(|_| tilts.iter().flat_map(move |tilt| [*tilt, *tilt, level]))
        .collect()
}
