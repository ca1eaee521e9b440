//! Grove headless driver
//!
//! Plays a short scripted session against the simulation core on a simulated
//! clock and prints the final snapshot as JSON. An optional first argument
//! names a tuning file.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use grove::consts::TICK_INTERVAL_MS;
    use grove::sim::{Action, GameEvent, WildcardId};
    use grove::{Garden, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Grove (headless) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    let seed: u64 = rand::random();
    let mut now = 0;
    let mut garden = Garden::with_tuning(seed, tuning, now);
    garden.subscribe(|event| match event {
        GameEvent::LevelUp { level } => log::info!("Level {}", level),
        GameEvent::TreeCompleted { tree_id, score } => {
            log::info!("Tree {} done (+{})", tree_id, score)
        }
        GameEvent::GardenFull => log::warn!("Garden full"),
        _ => log::trace!("{:?}", event),
    });

    // Ten simulated minutes, one action per second
    for second in 0..600u64 {
        now = second * TICK_INTERVAL_MS;
        garden.tick(now);

        let action = match second % 10 {
            0 => Action::TillSoil,
            3 => Action::BuyAutoFertilizer,
            5 => Action::BuyBird,
            7 => Action::BuyInstantFertilizer,
            8 => Action::UseWildcard(WildcardId::MysterySeed),
            9 => Action::UseWildcard(WildcardId::ChaosBloom),
            _ => Action::WaterPlant,
        };
        let _ = garden.dispatch(action, now);

        let fruits: Vec<String> = garden.state().economy.active_fruits.iter().cloned().collect();
        for slot in fruits {
            let _ = garden.dispatch(Action::HarvestFruit(slot), now);
        }

        if garden.state().is_game_over() {
            log::info!("Game over at {}s", second);
            break;
        }
    }

    match serde_json::to_string_pretty(&garden.snapshot(now)) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The core is driven by the host page on wasm; nothing to run here
}
