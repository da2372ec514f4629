//! Headless starmap driver.
//!
//! Generates a synthetic galaxy, drives a [`MapView`] with a scripted camera
//! and reports what each phase cost.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng, rngs::StdRng};
use starmap_engine::coords::{Vec2, Viewport};
use starmap_engine::logging::{LoggingConfig, init_logging};
use starmap_engine::render::InstanceBatch;
use starmap_engine::scene::DrawList;
use starmap_engine::time::FrameClock;
use starmap_map::world::{MoverSnapshot, StarSnapshot};
use starmap_map::{Camera, EntityId, Leg, LodCallback, MapConfig, MapView, WorldSnapshot};

const GALAXY_SIZE: f32 = 8000.0;
const STARS: u64 = 3000;
const MOVERS: u64 = 400;
const SEED: u64 = 0x5EED;

#[derive(Parser, Debug)]
#[command(name = "starmap-studio")]
#[command(about = "Headless starmap culling and path-cache driver")]
struct Cli {
    /// TOML map config; defaults are used when omitted
    config: Option<PathBuf>,

    /// Log every frame
    #[arg(long)]
    verbose: bool,
}

/// One scripted camera move.
#[derive(Debug, Copy, Clone)]
enum Step {
    Hold,
    Pan(Vec2),
    Zoom(f32),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose { LoggingConfig::verbose() } else { LoggingConfig::default() });

    let config = match &cli.config {
        Some(path) => {
            MapConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => MapConfig::default(),
    };

    println!();
    println!("  ── STARMAP STUDIO ─────────────────────────────");
    println!("  chunk size {}  ·  {} stars  ·  {} movers", config.chunk_size, STARS, MOVERS);
    println!();

    let snapshot = generate_galaxy(SEED);
    let lod_calls = Rc::new(Cell::new(0usize));

    let mut view = MapView::new(config);
    let counter = Rc::clone(&lod_calls);
    view.reload(&snapshot, &mut |_| {
        let counter = Rc::clone(&counter);
        Some(Box::new(move |_zoom| counter.set(counter.get() + 1)) as LodCallback)
    });

    let script = script();
    let screen = Viewport::new(1280.0, 720.0);
    let mut camera = Camera::new(Vec2::new(3000.0, 3000.0), 100.0);
    let mut clock = FrameClock::fixed(Duration::from_millis(16));
    let mut draw_list = DrawList::new();
    let mut batch = InstanceBatch::new();
    let mut rng = StdRng::seed_from_u64(SEED ^ 1);

    let mut idle_frames = 0usize;
    for (i, step) in script.iter().enumerate() {
        match *step {
            Step::Hold => {}
            Step::Pan(delta) => camera.position = camera.position + delta,
            Step::Zoom(factor) => camera.zoom_percent = (camera.zoom_percent * factor).clamp(5.0, 800.0),
        }

        let frame = clock.tick();
        let before = lod_calls.get();
        let report = view.tick(camera, screen);
        if report.is_idle() {
            idle_frames += 1;
        }

        // Nudge a random mover; direct routes follow it.
        if i % 5 == 0 {
            let mover = EntityId(STARS + rng.random_range(0..MOVERS));
            if let Some(at) = view.index().location(mover) {
                let nudge = Vec2::new(rng.random_range(-20.0..20.0), rng.random_range(-20.0..20.0));
                view.update_mover(mover, at + nudge);
            }
        }

        // Occasional arrival pulse on a random mover.
        if i % 30 == 0 {
            let mover = EntityId(STARS + rng.random_range(0..MOVERS));
            view.spawn_effect(mover, 40.0, 0.5);
        }
        let expired = view.advance_effects(frame);

        draw_list.clear();
        view.draw(&mut draw_list);
        batch.rebuild(&mut draw_list);

        log::debug!(
            "frame {:>3} {:?}: lod +{} rescaled {} quads {} circles {} expired {}",
            frame.frame_index,
            step,
            lod_calls.get() - before,
            report.paths.rescaled,
            batch.quads().len(),
            batch.circles().len(),
            expired.len()
        );
    }

    println!("  frames            {}", script.len());
    println!("  idle frames       {idle_frames}");
    println!("  LOD refreshes     {}", lod_calls.get());
    println!("  shared paths      {}", view.paths().shared_len());
    println!("  unique paths      {}", view.paths().unique_len());
    println!("  chunkless paths   {}", view.paths().chunkless_len());
    println!("  last batch        {} quads / {} circles", batch.quads().len(), batch.circles().len());
    println!(
        "  upload            {} quad bytes / {} circle bytes",
        batch.quad_bytes().len(),
        batch.circle_bytes().len()
    );
    println!();

    Ok(())
}

/// Random stars and movers. Looped movers circle between hub stars; direct
/// movers take multi-hop routes across the whole galaxy.
fn generate_galaxy(seed: u64) -> WorldSnapshot {
    let mut rng = StdRng::seed_from_u64(seed);

    let stars: Vec<StarSnapshot> = (0..STARS)
        .map(|id| StarSnapshot {
            id: EntityId(id),
            location: Vec2::new(rng.random_range(0.0..GALAXY_SIZE), rng.random_range(0.0..GALAXY_SIZE)),
        })
        .collect();

    // A small pool of hub stars so looped routes actually share edges.
    let hubs: Vec<u64> = (0..40).map(|_| rng.random_range(0..STARS)).collect();

    let movers = (0..MOVERS)
        .map(|n| {
            let looped = rng.random_bool(0.5);
            let hops = rng.random_range(1..4);
            let pool: &[u64] = if looped { &hubs } else { &[] };
            let mut stops: Vec<u64> = (0..=hops)
                .map(|_| match pool {
                    [] => rng.random_range(0..STARS),
                    _ => pool[rng.random_range(0..pool.len())],
                })
                .collect();
            if looped {
                stops.push(stops[0]);
            }

            let start = stars[stops[0] as usize].location;
            MoverSnapshot {
                id: EntityId(STARS + n),
                location: start + Vec2::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0)),
                route: stops.windows(2).map(|w| Leg::new(w[0], w[1])).collect(),
                looped,
            }
        })
        .collect();

    WorldSnapshot { stars, movers }
}

fn script() -> Vec<Step> {
    let mut steps = Vec::new();
    steps.extend(std::iter::repeat_n(Step::Hold, 10));
    steps.extend(std::iter::repeat_n(Step::Pan(Vec2::new(24.0, 0.0)), 60));
    steps.extend(std::iter::repeat_n(Step::Zoom(0.97), 40));
    steps.extend(std::iter::repeat_n(Step::Hold, 20));
    steps.extend(std::iter::repeat_n(Step::Pan(Vec2::new(0.0, -40.0)), 60));
    steps.extend(std::iter::repeat_n(Step::Zoom(1.04), 40));
    steps.extend(std::iter::repeat_n(Step::Hold, 10));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_flag_is_accepted_after_the_config_path() {
        let cli = Cli::try_parse_from(["starmap-studio", "cfg.toml", "--verbose"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.toml")));
    }

    #[test]
    fn no_arguments_means_default_config() {
        let cli = Cli::try_parse_from(["starmap-studio"]).unwrap();
        assert!(!cli.verbose);
        assert!(cli.config.is_none());
    }

    #[test]
    fn help_is_not_taken_as_a_config_path() {
        let err = Cli::try_parse_from(["starmap-studio", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
