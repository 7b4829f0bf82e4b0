use arcade_racer::car::{AiProfile, Car, PLAYER_SPEC};
use arcade_racer::checkpoint::Checkpoints;
use arcade_racer::config::RaceConfig;
use arcade_racer::input::ControlInputs;
use arcade_racer::race::{RaceState, advance_checkpoint, rank_positions};
use arcade_racer::track::Track;
use proptest::prelude::*;

fn controls() -> impl Strategy<Value = ControlInputs> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(accelerate, brake, left, right, drift)| ControlInputs {
            accelerate,
            brake,
            left,
            right,
            drift,
        },
    )
}

fn assert_car_invariants(race: &RaceState) -> Result<(), TestCaseError> {
    let track = race.track();
    for car in race.cars() {
        prop_assert!(car.position >= 0.0 && car.position < track.total_distance());
        prop_assert!(car.offset.abs() <= track.lateral_bound(car.spec.width));
        prop_assert!(car.speed >= -car.spec.reverse_speed && car.speed <= car.spec.max_speed);
        prop_assert!(car.steering.abs() <= car.spec.max_steering);
        prop_assert!(car.segment < track.segments().len());
    }

    let mut ranks: Vec<usize> = race.cars().iter().map(|c| c.rank).collect();
    ranks.sort_unstable();
    prop_assert_eq!(ranks, (1..=race.cars().len()).collect::<Vec<_>>());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever the player does, every car stays on the loop and within limits.
    #[test]
    fn invariants_hold_every_frame(
        seed in any::<u64>(),
        inputs in prop::collection::vec(controls(), 1..400),
    ) {
        let config = RaceConfig { seed: Some(seed), ..RaceConfig::default() };
        let mut race = RaceState::from_config(&config);
        race.start();

        for input in &inputs {
            race.apply_player_controls(input);
            race.update();
            assert_car_invariants(&race)?;
        }
    }

    /// Every distance on the loop belongs to exactly one checkpoint range.
    #[test]
    fn find_current_is_total(distance in 0.0f32..5600.0) {
        let checkpoints = Checkpoints::from_track(&Track::standard(3));
        let index = checkpoints.find_current(distance);
        prop_assert!(index.is_some());

        let i = index.unwrap();
        let start = checkpoints.start_of(i).unwrap();
        let end = checkpoints.start_of(i + 1).unwrap_or(5600.0);
        prop_assert!(distance >= start && distance < end);
    }

    /// Driving forward only ever moves the next checkpoint forward, apart from
    /// the single last -> 0 step when the loop closes.
    #[test]
    fn checkpoints_never_regress_driving_forward(
        step in 1.0f32..400.0,
        start in 0.0f32..5600.0,
    ) {
        let track = Track::standard(3);
        let checkpoints = Checkpoints::from_track(&track);
        let last = checkpoints.last_index().unwrap();

        let mut car = Car::player(PLAYER_SPEC, [0.0, 0.0]);
        car.position = start;
        advance_checkpoint(&mut car, &checkpoints);

        let mut wraps = 0;
        let frames = (3.0 * track.total_distance() / step) as usize;
        for _ in 0..frames {
            let before = car.next_checkpoint;
            car.position = track.wrap(car.position + step);
            advance_checkpoint(&mut car, &checkpoints);
            let after = car.next_checkpoint;

            if after < before {
                prop_assert_eq!(after, 0);
                prop_assert_eq!(before, last);
                wraps += 1;
            } else {
                prop_assert!(after >= before);
            }
        }
        prop_assert!(wraps >= 2);
    }

    /// Ranks are always 1..=n with no gaps or duplicates.
    #[test]
    fn ranks_are_a_permutation(
        states in prop::collection::vec((1u32..5, 0usize..8, 0.0f32..5600.0), 1..12),
    ) {
        let profile = AiProfile { aggression: 0.7, skill: 0.7 };
        let cars: Vec<Car> = states
            .iter()
            .enumerate()
            .map(|(i, &(lap, checkpoint, position))| {
                let mut car = if i == 0 {
                    Car::player(PLAYER_SPEC, [0.0, 0.0])
                } else {
                    Car::ai(PLAYER_SPEC, profile)
                };
                car.lap = lap;
                car.next_checkpoint = checkpoint;
                car.position = position;
                car
            })
            .collect();

        let mut ranks = rank_positions(&cars);
        ranks.sort_unstable();
        prop_assert_eq!(ranks, (1..=cars.len()).collect::<Vec<_>>());
    }
}

#[test]
fn track_scenario_lookups() {
    let track = Track::standard(3);
    assert_eq!(track.total_distance(), 5600.0);

    let first = track.segment_at(0.0);
    assert_eq!((first.index, first.local_percent), (0, 0.0));

    let second = track.segment_at(1000.0);
    assert_eq!((second.index, second.local_percent), (1, 0.0));

    let end = track.segment_at(5599.0);
    assert_eq!(end.index, 7);
    assert!((end.local_percent - 1.0).abs() < 1e-3);
}
