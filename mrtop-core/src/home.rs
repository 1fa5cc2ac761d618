//! All rooms of a home plus their aggregators
//!
//! [`Home`] routes each notification to every room that reads its source,
//! publishes the resulting snapshots for the aggregators, and persists room
//! state through a [`StateStore`]. Storage failures are logged and never stop
//! a result from being published.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::aggregator::{AggregateResult, AggregatorNode, AggregatorTree, ChildEntry, ChildRef, RoomSnapshot};
use crate::config::{HomeConfig, RoomConfig};
use crate::errors::{AggregatorId, ComfortError, ComfortResult, RoomId};
use crate::events::Notification;
use crate::profile::ProfileManager;
use crate::room::{CalculationResult, Room};
use crate::store::StateStore;
use crate::time::{TimeSource, Timestamp};

/// Rooms, aggregators and storage for one site
#[derive(Debug)]
pub struct Home<S: StateStore> {
    rooms: BTreeMap<RoomId, Room>,
    tree: AggregatorTree,
    snapshots: BTreeMap<RoomId, RoomSnapshot>,
    store: S,
    elevation_m: f32,
}

fn persist<S: StateStore>(store: &mut S, room: &Room) {
    if let Err(e) = store.save(room.id(), &room.persisted()) {
        log_warn!("failed to persist {}: {:?}", room.id(), e);
    }
}

impl<S: StateStore> Home<S> {
    /// Build rooms and aggregators, restoring persisted room state
    pub fn new(config: HomeConfig, store: S) -> ComfortResult<Self> {
        config.validate()?;
        let mut home = Self {
            rooms: BTreeMap::new(),
            tree: config.aggregator_tree()?,
            snapshots: BTreeMap::new(),
            store,
            elevation_m: config.elevation_m,
        };
        for room in config.rooms {
            home.add_room(room)?;
        }
        log_info!("home ready: {} rooms, {} aggregators", home.rooms.len(), home.tree.len());
        Ok(home)
    }

    /// Add a room and restore its persisted state, if any
    pub fn add_room(&mut self, config: RoomConfig) -> ComfortResult<()> {
        if self.rooms.contains_key(&config.id) {
            return Err(ComfortError::DuplicateRoom(config.id));
        }
        let mut room = Room::new(config, self.elevation_m)?;
        match self.store.load(room.id()) {
            Ok(Some(persisted)) => room.restore(persisted),
            Ok(None) => {}
            Err(e) => log_warn!("could not load {}: {:?}", room.id(), e),
        }
        self.rooms.insert(room.id(), room);
        Ok(())
    }

    /// Remove a room, its snapshot and its stored state
    pub fn remove_room(&mut self, id: RoomId) -> ComfortResult<Room> {
        let room = self.rooms.remove(&id).ok_or(ComfortError::UnknownRoom(id))?;
        self.snapshots.remove(&id);
        if let Err(e) = self.store.remove(id) {
            log_warn!("could not remove stored state of {}: {:?}", id, e);
        }
        Ok(room)
    }

    /// Room by id
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    /// All rooms in id order
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Published room snapshots
    pub fn snapshots(&self) -> &BTreeMap<RoomId, RoomSnapshot> {
        &self.snapshots
    }

    /// Aggregator table
    pub fn aggregators(&self) -> &AggregatorTree {
        &self.tree
    }

    /// Storage backend
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Deliver a notification to every room that reads its source
    pub fn handle(&mut self, notification: &Notification, now: Timestamp) -> Vec<CalculationResult> {
        let mut results = Vec::new();
        for room in self.rooms.values_mut() {
            if let Some(result) = room.handle(notification, now) {
                self.snapshots.insert(room.id(), result.snapshot(room.config().floor_level, room.config().area_m2));
                persist(&mut self.store, room);
                results.push(result);
            }
        }
        results
    }

    /// Run every held update that is due
    pub fn poll(&mut self, now: Timestamp) -> Vec<CalculationResult> {
        let mut results = Vec::new();
        for room in self.rooms.values_mut() {
            if let Some(result) = room.poll(now) {
                self.snapshots.insert(room.id(), result.snapshot(room.config().floor_level, room.config().area_m2));
                persist(&mut self.store, room);
                results.push(result);
            }
        }
        results
    }

    /// [`poll`](Self::poll) at the clock's current time
    pub fn poll_clock<T: TimeSource>(&mut self, clock: &T) -> Vec<CalculationResult> {
        self.poll(clock.now())
    }

    /// Earliest boundary of any held update
    pub fn next_due(&self) -> Option<Timestamp> {
        self.rooms.values().filter_map(Room::next_due).min()
    }

    /// Change a room's profile library, persist it, and request an update.
    ///
    /// The closure's error leaves the library untouched when the operation
    /// itself guarantees that (every [`ProfileManager`] operation does).
    pub fn update_profiles<T>(
        &mut self,
        id: RoomId,
        now: Timestamp,
        change: impl FnOnce(&mut ProfileManager) -> ComfortResult<T>,
    ) -> ComfortResult<(T, Option<CalculationResult>)> {
        let room = self.rooms.get_mut(&id).ok_or(ComfortError::UnknownRoom(id))?;
        let value = change(room.profiles_mut())?;
        persist(&mut self.store, room);
        let result = room.request_update(now);
        if let Some(r) = &result {
            self.snapshots.insert(id, r.snapshot(room.config().floor_level, room.config().area_m2));
            persist(&mut self.store, room);
        }
        Ok((value, result))
    }

    /// Add or replace an aggregator node
    pub fn set_aggregator(&mut self, id: AggregatorId, node: AggregatorNode) -> ComfortResult<()> {
        for entry in &node.children {
            self.check_room_child(entry.child)?;
        }
        self.tree.insert(id, node)
    }

    /// Attach a room or aggregator under `parent`
    pub fn attach(&mut self, parent: AggregatorId, entry: ChildEntry) -> ComfortResult<()> {
        self.check_room_child(entry.child)?;
        self.tree.attach(parent, entry)
    }

    /// Detach a child from `parent`
    pub fn detach(&mut self, parent: AggregatorId, child: ChildRef) -> ComfortResult<bool> {
        self.tree.detach(parent, child)
    }

    /// Evaluate one aggregator against the current snapshots
    pub fn aggregate(&self, id: AggregatorId) -> ComfortResult<AggregateResult> {
        self.tree.evaluate(id, &self.snapshots)
    }

    /// Evaluate every aggregator
    pub fn aggregate_all(&self) -> Vec<AggregateResult> {
        self.tree
            .ids()
            .filter_map(|id| self.tree.evaluate(id, &self.snapshots).ok())
            .collect()
    }

    fn check_room_child(&self, child: ChildRef) -> ComfortResult<()> {
        match child {
            ChildRef::Room(r) if !self.rooms.contains_key(&r) => Err(ComfortError::UnknownRoom(r)),
            _ => Ok(()),
        }
    }
}
