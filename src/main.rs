//! Sky Barrage headless demo
//!
//! Plays one run natively with a simple autopilot that sweeps the craft
//! across the bottom of the screen, then logs the result. Hosts with a
//! display drive `Game` the same way, one `tick` per animation frame.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use sky_barrage::Game;
    use sky_barrage::persistence::FileStorage;
    use sky_barrage::platform;
    use sky_barrage::sim::{ItemKind, TickInput};
    use sky_barrage::tuning::Tuning;

    platform::init_logging();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or_else(|| platform::now_ms().to_bits());

    let tuning = match std::env::var("SKY_BARRAGE_TUNING") {
        Ok(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json),
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                Tuning::default()
            }
        },
        Err(_) => Tuning::default(),
    };
    let storage = FileStorage::new(
        std::env::var("SKY_BARRAGE_DATA").unwrap_or_else(|_| ".sky-barrage".to_string()),
    );

    // Items to use on the first frames, e.g. SKY_BARRAGE_ITEMS=Wingman,Triple
    let mut queued: Vec<ItemKind> = std::env::var("SKY_BARRAGE_ITEMS")
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .filter_map(|s| {
            let kind = ItemKind::from_str(s.trim());
            if kind.is_none() {
                log::warn!("Unknown item {:?}", s);
            }
            kind
        })
        .rev()
        .collect();

    let mut game = Game::new(tuning, Box::new(storage));
    game.start_run(seed);
    let started = platform::now_ms();

    const FRAME_MS: u64 = 16;
    let width = game.tuning().width;
    let y = game.tuning().player_spawn.1;
    let mut frame: u64 = 0;

    while !game.is_game_over() {
        // Triangle-wave sweep across the playfield
        let t = (frame % 240) as f32 / 120.0;
        let x = if t < 1.0 { t } else { 2.0 - t } * (width - 80.0) + 40.0;
        let input = TickInput {
            pointer: Some(Vec2::new(x, y)),
            activate: queued.pop(),
            ..Default::default()
        };
        let Some(snapshot) = game.tick(FRAME_MS, &input) else {
            break;
        };
        if frame % 600 == 0 {
            log::info!(
                "t={} ms phase={:?} score={} health={} enemies={}",
                snapshot.run_elapsed_ms,
                snapshot.phase,
                snapshot.score,
                snapshot.player.health,
                snapshot.enemies.len()
            );
        }
        frame += 1;
    }

    if let Some(run) = game.run() {
        log::info!(
            "Run over: {:?}, score {}, banked {} ({} frames simulated in {} ms)",
            run.outcome,
            run.score,
            game.profile().currency,
            frame,
            platform::frame_delta_ms(started, platform::now_ms())
        );
    }
    for (kind, count) in game.profile().inventory.iter() {
        if count > 0 {
            log::info!("  {}: {}", kind.as_str(), count);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    sky_barrage::platform::init_logging();
    log::info!("Sky Barrage core loaded; drive `Game` from the page's frame loop");
}
