use simulation::brain_store::{BrainStore, MemoryBrainStore};
use simulation::config::SimulationConfig;
use simulation::controls::KeyState;
use simulation::traffic::{TrafficPreset, TrafficSlot};
use simulation::world::World;

const FRAME: f32 = 1.0 / 60.0;

fn seeded_config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        population: 20,
        seed: Some(seed),
        stall_timeout: 2.0,
        auto_evolve: true,
        ..Default::default()
    }
}

fn run_until_evolve(world: &mut World, max_frames: usize) -> usize {
    for frame in 0..max_frames {
        world.step(KeyState::default(), FRAME).unwrap();
        if world.should_evolve() {
            return frame;
        }
    }
    max_frames
}

#[test]
fn same_seed_same_run() {
    let mut first = World::new(seeded_config(99), None).unwrap();
    let mut second = World::new(seeded_config(99), None).unwrap();
    for _ in 0..300 {
        first.step(KeyState::default(), FRAME).unwrap();
        second.step(KeyState::default(), FRAME).unwrap();
    }
    assert_eq!(first.best_car().y, second.best_car().y);
    assert_eq!(first.intact_count(), second.intact_count());
}

#[test]
fn blocked_road_ends_the_generation() {
    // One narrow lane, closed by a car that never moves.
    let config = SimulationConfig {
        lane_count: 1,
        road_width_ratio: 0.3,
        traffic: TrafficPreset::Custom(vec![TrafficSlot { lane: 0, y: -100.0 }]),
        traffic_max_speed: 0.0,
        ..seeded_config(5)
    };
    let mut world = World::new(config, None).unwrap();
    let limit = 60 * 60;
    let frames = run_until_evolve(&mut world, limit);
    assert!(frames < limit, "generation still running after {frames} frames");
    assert!(world.all_damaged() || world.is_stalled());
    assert!(world.best_car().y > -100.0);
}

#[test]
fn progress_keeps_the_stall_watch_quiet() {
    let config = SimulationConfig {
        traffic: TrafficPreset::Custom(vec![]),
        stall_timeout: 1.0,
        ..SimulationConfig::keyboard_demo()
    };
    let mut world = World::new(config, None).unwrap();
    let throttle = KeyState {
        up: true,
        ..Default::default()
    };
    for _ in 0..120 {
        world.step(throttle, FRAME).unwrap();
    }
    assert!(!world.is_stalled());
    assert!(world.progress() > 100.0);

    // Rolling out and standing still for longer than the timeout.
    for _ in 0..240 {
        world.step(KeyState::default(), FRAME).unwrap();
    }
    assert!(world.is_stalled());
}

#[test]
fn saved_brain_seeds_next_run() {
    let mut world = World::new(seeded_config(17), None).unwrap();
    run_until_evolve(&mut world, 600);

    let mut store = MemoryBrainStore::default();
    let best = world.best_brain().cloned().expect("cars under test have brains");
    store.save(&best).unwrap();

    let restored = store.load().unwrap();
    let next = World::new(seeded_config(18), restored).unwrap();
    assert_eq!(next.cars[0].brain.as_ref(), Some(&best));
    assert_eq!(next.generation, 1);
}

#[test]
fn traffic_ignores_cars_under_test() {
    let config = SimulationConfig {
        traffic: TrafficPreset::Single,
        ..seeded_config(3)
    };
    let mut world = World::new(config, None).unwrap();
    let start = world.traffic[0].y;
    for _ in 0..120 {
        world.step(KeyState::default(), FRAME).unwrap();
    }
    assert!(!world.traffic[0].damaged);
    assert!(world.traffic[0].y < start);
}

#[test]
fn camera_follows_best_car() {
    let mut world = World::new(seeded_config(8), None).unwrap();
    for _ in 0..60 {
        world.step(KeyState::default(), FRAME).unwrap();
    }
    let view_height = 800.0;
    let offset = world.camera_offset(view_height);
    assert!((world.best_car().y + offset - view_height * 0.7).abs() < 1e-3);
}
