//! Headless driver: runs a scene for a number of steps and logs the body
//! states once per simulated second.
use eyre::{bail, Result};
use physics::scenarios;
use physics::Engine;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let scene_name = args.next().unwrap_or_else(|| "Single Die".to_owned());
    let steps: u32 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 600,
    };

    let Some(scene) = scenarios::catalog()
        .into_iter()
        .find(|s| s.name().eq_ignore_ascii_case(&scene_name))
    else {
        let known: Vec<String> = scenarios::catalog()
            .iter()
            .map(|s| s.name().to_owned())
            .collect();
        bail!("unknown scene {scene_name:?}, pick one of: {}", known.join(", "));
    };

    let mut engine = Engine::new(scene);
    engine.init();
    engine.run = true;
    info!(scene = engine.scene.name(), steps, "starting simulation");

    let per_second = (1. / engine.dt).round() as u32;
    for step in 1..=steps {
        engine.update()?;

        if step % per_second == 0 {
            for (i, body) in engine.body_views().enumerate() {
                info!(
                    t = step as f64 * engine.dt,
                    body = i,
                    x = ?body.position,
                    "body state"
                );
            }
            info!(contacts = engine.prev_contacts.len(), "contact count");
        }
    }

    for (i, body) in engine.body_views().enumerate() {
        println!(
            "body {i}: position ({:+.3}, {:+.3}, {:+.3})",
            body.position.x, body.position.y, body.position.z
        );
    }

    Ok(())
}
