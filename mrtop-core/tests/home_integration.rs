//! Multi-room homes: fan-out, throttling, aggregation and restarts

mod common;

use common::{air_id, indoor, room_config, Weather, MINUTE};
use mrtop_core::time::FixedTime;
use mrtop_core::{
    AggregationMode, AggregatorId, AggregatorNode, ChildEntry, ChildRef, ComfortError, CoreField, Home,
    HomeConfig, MemoryStore, Notification, QuantityKind, RoomId, StateStore, Unit,
};

const GROUND: AggregatorId = AggregatorId(10);
const UPPER: AggregatorId = AggregatorId(11);
const HOUSE: AggregatorId = AggregatorId(20);

/// Two rooms downstairs, one warmer room upstairs
fn two_storey() -> HomeConfig {
    let mut config = HomeConfig {
        floor_height_m: 2.8,
        ..HomeConfig::default()
    };
    config.rooms = vec![room_config(1, 0), room_config(2, 0), room_config(3, 1)];
    config.aggregators.insert(
        GROUND,
        AggregatorNode::new("Ground floor", AggregationMode::HvacZone)
            .with_child(ChildEntry::room(RoomId(1)))
            .with_child(ChildEntry::room(RoomId(2))),
    );
    config.aggregators.insert(
        UPPER,
        AggregatorNode::new("Upstairs", AggregationMode::HvacZone).with_child(ChildEntry::room(RoomId(3))),
    );
    config.aggregators.insert(
        HOUSE,
        AggregatorNode::new("House", AggregationMode::Floor)
            .with_child(ChildEntry::aggregator(GROUND))
            .with_child(ChildEntry::aggregator(UPPER)),
    );
    config
}

fn warm_up<S: StateStore>(home: &mut Home<S>, at: u64) {
    for n in Weather::winter_night().notifications(at) {
        home.handle(&n, at);
    }
    for (room, t_air) in [(1, 20.0), (2, 21.0), (3, 24.0)] {
        for n in indoor(room, t_air, 45.0, at) {
            home.handle(&n, at);
        }
    }
}

#[test]
fn shared_sources_reach_every_room() {
    let mut home = Home::new(two_storey(), MemoryStore::new()).unwrap();
    warm_up(&mut home, 0);
    assert_eq!(home.snapshots().len(), 3);

    // one outdoor reading fans out to all rooms, but each was just updated
    let n = Notification::number(common::OUTDOOR, QuantityKind::OutdoorTemperature, -6.0, Unit::Celsius, 1_000);
    assert!(home.handle(&n, 1_000).is_empty());
    assert!(home.rooms().all(|r| r.next_due().is_some()));
}

#[test]
fn bursts_are_held_until_the_interval_passes() {
    let mut home = Home::new(two_storey(), MemoryStore::new()).unwrap();
    warm_up(&mut home, 0);

    let later = Notification::number(air_id(1), QuantityKind::AirTemperature, 22.5, Unit::Celsius, 5_000);
    assert!(home.handle(&later, 5_000).is_empty());

    let due = home.next_due().unwrap();
    let mut clock = FixedTime::new(due - 1);
    assert!(home.poll_clock(&clock).is_empty());
    clock.advance(1);
    let results = home.poll_clock(&clock);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].room, RoomId(1));
    assert_eq!(results[0].inputs.t_air.value, 22.5);
    assert!(home.next_due().is_none());
}

#[test]
fn aggregates_follow_the_tree() {
    let mut home = Home::new(two_storey(), MemoryStore::new()).unwrap();
    warm_up(&mut home, 0);
    let snaps = home.snapshots().clone();
    let top = |id: u32| snaps[&RoomId(id)].top;

    let ground = home.aggregate(GROUND).unwrap();
    assert!((ground.top.unwrap() - (top(1) + top(2)) / 2.0).abs() < 1e-4);
    assert!((ground.top_spread - (top(2) - top(1)).abs()).abs() < 1e-4);
    assert_eq!(ground.missing_children, 0);
    assert!(ground.levels.is_empty());

    let house = home.aggregate(HOUSE).unwrap();
    let total_loss: f32 = snaps.values().map(|s| s.heat_loss_w).sum();
    assert!((house.heat_loss_w - total_loss).abs() < 1e-2);
    assert_eq!(house.levels.len(), 2);
    assert_eq!(house.levels[0].rooms, 2);

    let strat = house.stratification.unwrap();
    assert_eq!((strat.lowest_level, strat.highest_level), (0, 1));
    assert!(strat.per_level_c > 0.0);
    assert!((strat.height_m - 2.8).abs() < 1e-6);
    // heated house on a freezing night
    assert!(strat.stack_pressure_pa > 0.0);

    assert_eq!(home.aggregate_all().len(), 3);
}

#[test]
fn rooms_without_results_are_counted_missing() {
    let mut home = Home::new(two_storey(), MemoryStore::new()).unwrap();
    for n in indoor(1, 21.0, 45.0, 0) {
        home.handle(&n, 0);
    }
    let ground = home.aggregate(GROUND).unwrap();
    assert_eq!(ground.missing_children, 1);
    assert!((ground.top.unwrap() - home.snapshots()[&RoomId(1)].top).abs() < 1e-4);

    let upper = home.aggregate(UPPER).unwrap();
    assert_eq!(upper.top, None);
}

#[test]
fn tree_edits_are_checked() {
    let mut home = Home::new(two_storey(), MemoryStore::new()).unwrap();
    assert!(matches!(
        home.attach(GROUND, ChildEntry::aggregator(HOUSE)),
        Err(ComfortError::AggregatorCycle { .. })
    ));
    assert!(matches!(
        home.attach(GROUND, ChildEntry::room(RoomId(99))),
        Err(ComfortError::UnknownRoom(RoomId(99)))
    ));
    assert!(home.detach(HOUSE, ChildRef::Aggregator(UPPER)).unwrap());

    warm_up(&mut home, 0);
    let house = home.aggregate(HOUSE).unwrap();
    assert_eq!(house.levels.len(), 1);
    assert!(house.stratification.is_none());
}

#[test]
fn restart_restores_smoothing_and_profiles() {
    let mut home = Home::new(two_storey(), MemoryStore::new()).unwrap();
    warm_up(&mut home, 0);
    let (id, _) = home
        .update_profiles(RoomId(1), MINUTE, |p| {
            p.edit(CoreField::KLoss, 0.2)?;
            p.save("Drafty")
        })
        .unwrap();
    let before = *home.room(RoomId(1)).unwrap().state();

    let store = home.store().clone();
    assert_eq!(store.len(), 3);
    let restarted = Home::new(two_storey(), store).unwrap();
    let room = restarted.room(RoomId(1)).unwrap();

    assert_eq!(room.state().mrt_prev, before.mrt_prev);
    assert_eq!(room.profiles().active_name(), "Drafty");
    assert_eq!(room.profiles().custom(id).unwrap().factors.k_loss, 0.2);
    // snapshots are not persisted; aggregates wait for fresh results
    assert!(restarted.snapshots().is_empty());
}

#[test]
fn removing_a_room_clears_its_state() {
    let mut home = Home::new(two_storey(), MemoryStore::new()).unwrap();
    warm_up(&mut home, 0);
    home.remove_room(RoomId(2)).unwrap();

    assert!(home.store().load(RoomId(2)).unwrap().is_none());
    assert!(!home.snapshots().contains_key(&RoomId(2)));
    assert_eq!(home.aggregate(GROUND).unwrap().missing_children, 1);
    assert!(matches!(home.remove_room(RoomId(2)), Err(ComfortError::UnknownRoom(_))));
}
