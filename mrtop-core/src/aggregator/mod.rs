//! Hierarchical Aggregation of Room Results
//!
//! ## Overview
//!
//! Aggregators combine the last published results of rooms, and of other
//! aggregators, into a floor or zone view:
//!
//! ```text
//!              [house: floor]
//!              /            \
//!   [ground: hvac_zone]   [upstairs: hvac_zone]
//!     /      \               /       \
//!  kitchen  living       bedroom   office
//! ```
//!
//! Nodes live in an explicit table keyed by [`AggregatorId`] and refer to
//! their children by id. Every edit checks that the table stays a forest: no
//! node becomes its own descendant, an aggregator has at most one parent,
//! and a room appears at most once under any node. Weights must be finite
//! and non-negative. A rejected edit leaves the table exactly as it was.
//!
//! ## Weighting
//!
//! Each child carries a weight, by default its floor area. Averages are
//! `Σ(v·w) / Σw` over children that have published a result; children
//! without one are skipped and counted in `missing_children`. An aggregator
//! child contributes its own weighted average with its total weight.
//!
//! ## Floor Mode
//!
//! `floor` nodes additionally group the leaf rooms of their subtree by
//! `floor_level` and report per-level statistics, the vertical
//! stratification between the lowest and highest level, and the stack-effect
//! pressure over that height (see [`stack`]).

pub mod stack;

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::constants::physics::{DEFAULT_FLOOR_HEIGHT_M, SEA_LEVEL_PRESSURE_HPA};
use crate::errors::{AggregatorId, ComfortError, ComfortResult, RoomId};
use crate::resolver::heuristics::station_pressure;
use crate::time::Timestamp;

pub use stack::stack_effect_pressure;

/// What an aggregator reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Weighted averages and spreads
    #[default]
    HvacZone,
    /// Zone statistics plus per-level stats, stratification and stack effect
    Floor,
}

/// Reference to a child node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ChildRef {
    /// A room
    Room(RoomId),
    /// Another aggregator
    Aggregator(AggregatorId),
}

/// A child with its weight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChildEntry {
    /// Child node
    pub child: ChildRef,
    /// Explicit weight; defaults to the room area or the child's total weight
    #[serde(default)]
    pub weight: Option<f32>,
}

impl ChildEntry {
    /// Room child weighted by its area
    pub fn room(id: RoomId) -> Self {
        Self { child: ChildRef::Room(id), weight: None }
    }

    /// Aggregator child weighted by its total weight
    pub fn aggregator(id: AggregatorId) -> Self {
        Self { child: ChildRef::Aggregator(id), weight: None }
    }

    /// Override the weight
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// One aggregator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatorNode {
    /// Display name
    pub name: String,
    /// Reporting mode
    #[serde(default)]
    pub mode: AggregationMode,
    /// Children in configuration order
    #[serde(default)]
    pub children: Vec<ChildEntry>,
}

impl AggregatorNode {
    /// Empty node
    pub fn new(name: impl Into<String>, mode: AggregationMode) -> Self {
        Self { name: name.into(), mode, children: Vec::new() }
    }

    /// Append a child
    pub fn with_child(mut self, entry: ChildEntry) -> Self {
        self.children.push(entry);
        self
    }
}

/// Last published values of one room, as seen by aggregators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    /// Operative temperature (°C)
    pub top: f32,
    /// Mean radiant temperature (°C)
    pub mrt: f32,
    /// Indoor air temperature (°C)
    pub t_air: f32,
    /// Outdoor dry-bulb temperature (°C)
    pub t_out: f32,
    /// Exterior wall heat loss (W)
    pub heat_loss_w: f32,
    /// Storey
    pub floor_level: i32,
    /// Floor area (m²)
    pub area_m2: f32,
    /// Time of the underlying result
    pub timestamp: Timestamp,
}

/// Statistics for one floor level
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelStats {
    /// Storey
    pub level: i32,
    /// Weighted operative temperature (°C)
    pub top: f32,
    /// Weighted MRT (°C)
    pub mrt: f32,
    /// Max − min operative temperature across the level's rooms (°C)
    pub top_spread: f32,
    /// Rooms contributing
    pub rooms: usize,
}

/// Vertical profile between the lowest and highest level
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stratification {
    /// Lowest occupied level
    pub lowest_level: i32,
    /// Highest occupied level
    pub highest_level: i32,
    /// Temperature rise per level (°C)
    pub per_level_c: f32,
    /// Height between the levels (m)
    pub height_m: f32,
    /// Stack-effect pressure over that height (Pa)
    pub stack_pressure_pa: f32,
}

/// Result of evaluating one aggregator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Node id
    pub id: AggregatorId,
    /// Display name
    pub name: String,
    /// Reporting mode
    pub mode: AggregationMode,
    /// Weighted operative temperature (°C); `None` with no contributing child
    pub top: Option<f32>,
    /// Weighted MRT (°C)
    pub mrt: Option<f32>,
    /// Weighted air temperature (°C)
    pub t_air: Option<f32>,
    /// Max − min operative temperature across children (°C)
    pub top_spread: f32,
    /// Max − min MRT across children (°C)
    pub mrt_spread: f32,
    /// Sum of child heat losses (W)
    pub heat_loss_w: f32,
    /// Sum of contributing weights
    pub total_weight: f32,
    /// Children skipped for lack of a published result
    pub missing_children: usize,
    /// Per-level statistics (floor mode)
    pub levels: Vec<LevelStats>,
    /// Stratification and stack effect (floor mode, two or more levels)
    pub stratification: Option<Stratification>,
}

#[derive(Debug, Clone, Copy)]
struct Leaf {
    snapshot: RoomSnapshot,
    weight: f32,
}

#[derive(Debug, Default)]
struct Accumulator {
    sum_w: f32,
    top: f32,
    mrt: f32,
    t_air: f32,
    top_range: Option<(f32, f32)>,
    mrt_range: Option<(f32, f32)>,
}

impl Accumulator {
    fn add(&mut self, weight: f32, top: f32, mrt: f32, t_air: f32) {
        self.sum_w += weight;
        self.top += top * weight;
        self.mrt += mrt * weight;
        self.t_air += t_air * weight;
        self.top_range = Some(widen(self.top_range, top));
        self.mrt_range = Some(widen(self.mrt_range, mrt));
    }

    fn mean(&self, sum: f32) -> Option<f32> {
        (self.sum_w > 0.0).then(|| sum / self.sum_w)
    }
}

fn widen(range: Option<(f32, f32)>, v: f32) -> (f32, f32) {
    match range {
        Some((lo, hi)) => (lo.min(v), hi.max(v)),
        None => (v, v),
    }
}

fn spread(range: Option<(f32, f32)>) -> f32 {
    range.map(|(lo, hi)| hi - lo).unwrap_or(0.0)
}

/// Table of aggregator nodes
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatorTree {
    nodes: BTreeMap<AggregatorId, AggregatorNode>,
    floor_height_m: f32,
    p_atm_pa: f32,
}

impl Default for AggregatorTree {
    fn default() -> Self {
        Self::new(DEFAULT_FLOOR_HEIGHT_M, 0.0)
    }
}

impl AggregatorTree {
    /// Empty tree for a site with the given storey height and elevation
    pub fn new(floor_height_m: f32, elevation_m: f32) -> Self {
        Self {
            nodes: BTreeMap::new(),
            floor_height_m,
            p_atm_pa: station_pressure(SEA_LEVEL_PRESSURE_HPA, elevation_m) * 100.0,
        }
    }

    /// Node by id
    pub fn node(&self, id: AggregatorId) -> Option<&AggregatorNode> {
        self.nodes.get(&id)
    }

    /// All node ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = AggregatorId> + '_ {
        self.nodes.keys().copied()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True with no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Replace the whole table.
    ///
    /// Every aggregator child must exist, the graph must be a forest with
    /// no room repeated under one node, and weights must be finite and
    /// non-negative; otherwise the current table is kept.
    pub fn configure(&mut self, nodes: BTreeMap<AggregatorId, AggregatorNode>) -> ComfortResult<()> {
        Self::check_table(&nodes)?;
        self.nodes = nodes;
        log_info!("aggregator table configured with {} nodes", self.nodes.len());
        Ok(())
    }

    /// Add or replace one node, with the same checks as [`configure`](Self::configure)
    pub fn insert(&mut self, id: AggregatorId, node: AggregatorNode) -> ComfortResult<()> {
        let mut candidate = self.nodes.clone();
        candidate.insert(id, node);
        Self::check_table(&candidate)?;
        self.nodes = candidate;
        Ok(())
    }

    /// Remove a node and every reference to it
    pub fn remove(&mut self, id: AggregatorId) -> ComfortResult<AggregatorNode> {
        let node = self.nodes.remove(&id).ok_or(ComfortError::UnknownAggregator(id))?;
        for other in self.nodes.values_mut() {
            other.children.retain(|c| c.child != ChildRef::Aggregator(id));
        }
        Ok(node)
    }

    /// Attach a child under `parent`, or update its weight if already attached.
    ///
    /// Runs the same checks as [`configure`](Self::configure).
    pub fn attach(&mut self, parent: AggregatorId, entry: ChildEntry) -> ComfortResult<()> {
        let mut candidate = self.nodes.clone();
        let node = candidate.get_mut(&parent).ok_or(ComfortError::UnknownAggregator(parent))?;
        match node.children.iter_mut().find(|c| c.child == entry.child) {
            Some(existing) => existing.weight = entry.weight,
            None => node.children.push(entry),
        }
        Self::check_table(&candidate)?;
        self.nodes = candidate;
        Ok(())
    }

    /// Detach a child; returns whether it was attached
    pub fn detach(&mut self, parent: AggregatorId, child: ChildRef) -> ComfortResult<bool> {
        let node = self.nodes.get_mut(&parent).ok_or(ComfortError::UnknownAggregator(parent))?;
        let before = node.children.len();
        node.children.retain(|c| c.child != child);
        Ok(node.children.len() != before)
    }

    /// Every room referenced anywhere in the table
    pub fn referenced_rooms(&self) -> BTreeSet<RoomId> {
        self.nodes
            .values()
            .flat_map(|n| n.children.iter())
            .filter_map(|c| match c.child {
                ChildRef::Room(r) => Some(r),
                ChildRef::Aggregator(_) => None,
            })
            .collect()
    }

    /// Evaluate one node against the current room snapshots
    pub fn evaluate(&self, id: AggregatorId, snapshots: &BTreeMap<RoomId, RoomSnapshot>) -> ComfortResult<AggregateResult> {
        let node = self.nodes.get(&id).ok_or(ComfortError::UnknownAggregator(id))?;
        let mut acc = Accumulator::default();
        let mut heat_loss_w = 0.0;
        let mut missing_children = 0;

        for entry in &node.children {
            match entry.child {
                ChildRef::Room(room) => match snapshots.get(&room) {
                    Some(s) => {
                        let w = entry.weight.unwrap_or(s.area_m2);
                        acc.add(w, s.top, s.mrt, s.t_air);
                        heat_loss_w += s.heat_loss_w;
                    }
                    None => missing_children += 1,
                },
                ChildRef::Aggregator(child) => {
                    let sub = self.evaluate(child, snapshots)?;
                    heat_loss_w += sub.heat_loss_w;
                    match (sub.top, sub.mrt, sub.t_air) {
                        (Some(top), Some(mrt), Some(t_air)) => {
                            acc.add(entry.weight.unwrap_or(sub.total_weight), top, mrt, t_air);
                        }
                        _ => missing_children += 1,
                    }
                }
            }
        }

        let (levels, stratification) = match node.mode {
            AggregationMode::HvacZone => (Vec::new(), None),
            AggregationMode::Floor => {
                let mut leaves = Vec::new();
                self.collect_leaves(id, snapshots, &mut leaves);
                self.level_statistics(&leaves)
            }
        };

        Ok(AggregateResult {
            id,
            name: node.name.clone(),
            mode: node.mode,
            top: acc.mean(acc.top),
            mrt: acc.mean(acc.mrt),
            t_air: acc.mean(acc.t_air),
            top_spread: spread(acc.top_range),
            mrt_spread: spread(acc.mrt_range),
            heat_loss_w,
            total_weight: acc.sum_w,
            missing_children,
            levels,
            stratification,
        })
    }

    fn collect_leaves(
        &self,
        id: AggregatorId,
        snapshots: &BTreeMap<RoomId, RoomSnapshot>,
        out: &mut Vec<Leaf>,
    ) {
        let node = match self.nodes.get(&id) {
            Some(n) => n,
            None => return,
        };
        for entry in &node.children {
            match entry.child {
                ChildRef::Room(room) => {
                    if let Some(s) = snapshots.get(&room) {
                        let weight = entry.weight.unwrap_or(s.area_m2);
                        out.push(Leaf { snapshot: *s, weight });
                    }
                }
                ChildRef::Aggregator(child) => self.collect_leaves(child, snapshots, out),
            }
        }
    }

    fn level_statistics(&self, leaves: &[Leaf]) -> (Vec<LevelStats>, Option<Stratification>) {
        let mut by_level: BTreeMap<i32, (Accumulator, usize)> = BTreeMap::new();
        let mut outdoor = Accumulator::default();
        for leaf in leaves {
            let s = &leaf.snapshot;
            let slot = by_level.entry(s.floor_level).or_default();
            slot.0.add(leaf.weight, s.top, s.mrt, s.t_air);
            slot.1 += 1;
            outdoor.add(leaf.weight, s.t_out, s.t_out, s.t_air);
        }

        let levels: Vec<LevelStats> = by_level
            .iter()
            .filter_map(|(level, (acc, rooms))| {
                Some(LevelStats {
                    level: *level,
                    top: acc.mean(acc.top)?,
                    mrt: acc.mean(acc.mrt)?,
                    top_spread: spread(acc.top_range),
                    rooms: *rooms,
                })
            })
            .collect();

        let stratification = match (levels.first(), levels.last()) {
            (Some(low), Some(high)) if high.level > low.level => {
                let span = high.level - low.level;
                let height_m = span as f32 * self.floor_height_m;
                let t_in = outdoor.mean(outdoor.t_air);
                let t_out = outdoor.mean(outdoor.top);
                let stack_pressure_pa = match (t_in, t_out) {
                    (Some(t_in), Some(t_out)) => stack_effect_pressure(t_in, t_out, height_m, self.p_atm_pa),
                    _ => 0.0,
                };
                Some(Stratification {
                    lowest_level: low.level,
                    highest_level: high.level,
                    per_level_c: stack::stratification_per_level(low.top, high.top, span),
                    height_m,
                    stack_pressure_pa,
                })
            }
            _ => None,
        };

        (levels, stratification)
    }

    fn check_table(nodes: &BTreeMap<AggregatorId, AggregatorNode>) -> ComfortResult<()> {
        for (&parent, node) in nodes {
            for entry in &node.children {
                if let ChildRef::Aggregator(child) = entry.child {
                    if !nodes.contains_key(&child) {
                        return Err(ComfortError::UnknownAggregator(child));
                    }
                    if child == parent || Self::reaches(nodes, child, parent) {
                        log_warn!("rejected {} under {}: cycle", child, parent);
                        return Err(ComfortError::AggregatorCycle { parent, child });
                    }
                }
                if let Some(w) = entry.weight {
                    if !w.is_finite() || w < 0.0 {
                        return Err(ComfortError::InvalidConfiguration {
                            field: "weight",
                            reason: "must be finite and non-negative",
                        });
                    }
                }
            }
        }

        let mut parents: BTreeMap<AggregatorId, AggregatorId> = BTreeMap::new();
        for (&parent, node) in nodes {
            for entry in &node.children {
                if let ChildRef::Aggregator(child) = entry.child {
                    if let Some(&first) = parents.get(&child) {
                        return Err(ComfortError::AggregatorHasParent { parent: first, child });
                    }
                    parents.insert(child, parent);
                }
            }
        }

        for &id in nodes.keys() {
            let mut seen = BTreeSet::new();
            Self::check_rooms_once(nodes, id, id, &mut seen)?;
        }
        Ok(())
    }

    /// Every room in the subtree of `id` appears once; the table is acyclic here
    fn check_rooms_once(
        nodes: &BTreeMap<AggregatorId, AggregatorNode>,
        root: AggregatorId,
        id: AggregatorId,
        seen: &mut BTreeSet<RoomId>,
    ) -> ComfortResult<()> {
        let node = match nodes.get(&id) {
            Some(n) => n,
            None => return Ok(()),
        };
        for entry in &node.children {
            match entry.child {
                ChildRef::Room(room) => {
                    if !seen.insert(room) {
                        return Err(ComfortError::RoomRepeated { aggregator: root, room });
                    }
                }
                ChildRef::Aggregator(child) => Self::check_rooms_once(nodes, root, child, seen)?,
            }
        }
        Ok(())
    }

    /// True if `target` is reachable from `from` through aggregator children
    fn reaches(nodes: &BTreeMap<AggregatorId, AggregatorNode>, from: AggregatorId, target: AggregatorId) -> bool {
        let mut stack = Vec::from([from]);
        let mut seen = BTreeSet::new();
        while let Some(id) = stack.pop() {
            if id == target {
                return true;
            }
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = nodes.get(&id) {
                stack.extend(node.children.iter().filter_map(|c| match c.child {
                    ChildRef::Aggregator(a) => Some(a),
                    ChildRef::Room(_) => None,
                }));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(top: f32, level: i32, area: f32) -> RoomSnapshot {
        RoomSnapshot {
            top,
            mrt: top - 1.0,
            t_air: top + 0.5,
            t_out: 0.0,
            heat_loss_w: 100.0,
            floor_level: level,
            area_m2: area,
            timestamp: 0,
        }
    }

    fn zone(rooms: &[u32]) -> AggregatorNode {
        rooms
            .iter()
            .fold(AggregatorNode::new("zone", AggregationMode::HvacZone), |n, r| {
                n.with_child(ChildEntry::room(RoomId(*r)))
            })
    }

    #[test]
    fn equal_areas_average_evenly() {
        let mut tree = AggregatorTree::default();
        tree.insert(AggregatorId(1), zone(&[1, 2])).unwrap();
        let snapshots = BTreeMap::from([(RoomId(1), snap(20.0, 0, 10.0)), (RoomId(2), snap(24.0, 0, 10.0))]);

        let r = tree.evaluate(AggregatorId(1), &snapshots).unwrap();
        assert_eq!(r.top, Some(22.0));
        assert_eq!(r.top_spread, 4.0);
        assert_eq!(r.heat_loss_w, 200.0);
        assert_eq!(r.total_weight, 20.0);
        assert!(r.levels.is_empty());
    }

    #[test]
    fn area_weighting_and_explicit_weights() {
        let mut tree = AggregatorTree::default();
        let node = AggregatorNode::new("zone", AggregationMode::HvacZone)
            .with_child(ChildEntry::room(RoomId(1)))
            .with_child(ChildEntry::room(RoomId(2)).with_weight(10.0));
        tree.insert(AggregatorId(1), node).unwrap();
        let snapshots = BTreeMap::from([(RoomId(1), snap(20.0, 0, 30.0)), (RoomId(2), snap(24.0, 0, 90.0))]);
        let r = tree.evaluate(AggregatorId(1), &snapshots).unwrap();
        assert_eq!(r.top, Some(21.0));
    }

    #[test]
    fn rooms_without_results_are_skipped() {
        let mut tree = AggregatorTree::default();
        tree.insert(AggregatorId(1), zone(&[1, 2, 3])).unwrap();
        let snapshots = BTreeMap::from([(RoomId(2), snap(21.0, 0, 12.0))]);
        let r = tree.evaluate(AggregatorId(1), &snapshots).unwrap();
        assert_eq!(r.top, Some(21.0));
        assert_eq!(r.missing_children, 2);

        let none = tree.evaluate(AggregatorId(1), &BTreeMap::new()).unwrap();
        assert_eq!(none.top, None);
        assert_eq!(none.top_spread, 0.0);
    }

    #[test]
    fn self_loop_and_longer_cycles_are_rejected() {
        let mut tree = AggregatorTree::default();
        tree.insert(AggregatorId(1), zone(&[1])).unwrap();
        tree.insert(AggregatorId(2), zone(&[2])).unwrap();
        tree.insert(AggregatorId(3), zone(&[3])).unwrap();

        assert_eq!(
            tree.attach(AggregatorId(1), ChildEntry::aggregator(AggregatorId(1))),
            Err(ComfortError::AggregatorCycle { parent: AggregatorId(1), child: AggregatorId(1) })
        );

        tree.attach(AggregatorId(1), ChildEntry::aggregator(AggregatorId(2))).unwrap();
        tree.attach(AggregatorId(2), ChildEntry::aggregator(AggregatorId(3))).unwrap();
        let before = tree.clone();
        assert!(matches!(
            tree.attach(AggregatorId(3), ChildEntry::aggregator(AggregatorId(1))),
            Err(ComfortError::AggregatorCycle { .. })
        ));
        assert_eq!(tree, before);
    }

    #[test]
    fn configure_rejects_cyclic_tables_and_keeps_previous() {
        let mut tree = AggregatorTree::default();
        tree.insert(AggregatorId(9), zone(&[1])).unwrap();
        let before = tree.clone();

        let cyclic = BTreeMap::from([
            (AggregatorId(1), AggregatorNode::default().with_child(ChildEntry::aggregator(AggregatorId(2)))),
            (AggregatorId(2), AggregatorNode::default().with_child(ChildEntry::aggregator(AggregatorId(1)))),
        ]);
        assert!(matches!(tree.configure(cyclic), Err(ComfortError::AggregatorCycle { .. })));
        assert_eq!(tree, before);

        let dangling = BTreeMap::from([(
            AggregatorId(1),
            AggregatorNode::default().with_child(ChildEntry::aggregator(AggregatorId(7))),
        )]);
        assert_eq!(tree.configure(dangling), Err(ComfortError::UnknownAggregator(AggregatorId(7))));
        assert_eq!(tree, before);
    }

    #[test]
    fn nested_aggregators_contribute_their_average() {
        let mut tree = AggregatorTree::default();
        tree.insert(AggregatorId(1), zone(&[1, 2])).unwrap();
        tree.insert(
            AggregatorId(2),
            AggregatorNode::new("home", AggregationMode::HvacZone)
                .with_child(ChildEntry::aggregator(AggregatorId(1)))
                .with_child(ChildEntry::room(RoomId(3))),
        )
        .unwrap();
        let snapshots = BTreeMap::from([
            (RoomId(1), snap(20.0, 0, 10.0)),
            (RoomId(2), snap(22.0, 0, 10.0)),
            (RoomId(3), snap(24.0, 1, 20.0)),
        ]);
        let r = tree.evaluate(AggregatorId(2), &snapshots).unwrap();
        // (21·20 + 24·20) / 40
        assert_eq!(r.top, Some(22.5));
        assert_eq!(r.heat_loss_w, 300.0);
    }

    #[test]
    fn floor_mode_reports_levels_and_stack_effect() {
        let mut tree = AggregatorTree::default();
        tree.insert(
            AggregatorId(1),
            AggregatorNode::new("house", AggregationMode::Floor)
                .with_child(ChildEntry::room(RoomId(1)))
                .with_child(ChildEntry::room(RoomId(2)))
                .with_child(ChildEntry::room(RoomId(3))),
        )
        .unwrap();
        let snapshots = BTreeMap::from([
            (RoomId(1), snap(20.0, 0, 10.0)),
            (RoomId(2), snap(21.0, 0, 10.0)),
            (RoomId(3), snap(23.5, 2, 10.0)),
        ]);
        let r = tree.evaluate(AggregatorId(1), &snapshots).unwrap();
        assert_eq!(r.levels.len(), 2);
        assert_eq!(r.levels[0].top, 20.5);
        assert_eq!(r.levels[0].top_spread, 1.0);
        let s = r.stratification.unwrap();
        assert_eq!((s.lowest_level, s.highest_level), (0, 2));
        assert_eq!(s.per_level_c, 1.5);
        assert_eq!(s.height_m, 6.0);
        assert!(s.stack_pressure_pa > 0.0);
    }

    #[test]
    fn remove_drops_references() {
        let mut tree = AggregatorTree::default();
        tree.insert(AggregatorId(1), zone(&[1])).unwrap();
        tree.insert(AggregatorId(2), zone(&[]).with_child(ChildEntry::aggregator(AggregatorId(1)))).unwrap();
        tree.remove(AggregatorId(1)).unwrap();
        assert!(tree.node(AggregatorId(2)).unwrap().children.is_empty());
        assert!(tree.detach(AggregatorId(2), ChildRef::Room(RoomId(5))).is_ok_and(|d| !d));
    }

    #[test]
    fn attach_checks_weights_like_insert() {
        let mut tree = AggregatorTree::default();
        tree.insert(AggregatorId(1), zone(&[1])).unwrap();
        let before = tree.clone();

        for bad in [-10.0, f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            assert!(matches!(
                tree.attach(AggregatorId(1), ChildEntry::room(RoomId(2)).with_weight(bad)),
                Err(ComfortError::InvalidConfiguration { field: "weight", .. })
            ));
            assert!(matches!(
                tree.attach(AggregatorId(1), ChildEntry::room(RoomId(1)).with_weight(bad)),
                Err(ComfortError::InvalidConfiguration { field: "weight", .. })
            ));
            assert_eq!(tree, before);
        }

        let infinite = zone(&[]).with_child(ChildEntry::room(RoomId(3)).with_weight(f32::INFINITY));
        assert!(tree.insert(AggregatorId(2), infinite).is_err());
        assert_eq!(tree, before);

        tree.attach(AggregatorId(1), ChildEntry::room(RoomId(2)).with_weight(10.0)).unwrap();
        let snapshots = BTreeMap::from([(RoomId(1), snap(20.0, 0, 10.0)), (RoomId(2), snap(22.0, 0, 30.0))]);
        assert_eq!(tree.evaluate(AggregatorId(1), &snapshots).unwrap().top, Some(21.0));
    }

    #[test]
    fn rooms_and_aggregators_are_counted_once() {
        let mut tree = AggregatorTree::default();
        tree.insert(AggregatorId(1), zone(&[1])).unwrap();
        tree.insert(AggregatorId(2), zone(&[1, 2])).unwrap();
        let before = tree.clone();

        // the same room reached through two children of one node
        let house = AggregatorNode::new("house", AggregationMode::Floor)
            .with_child(ChildEntry::aggregator(AggregatorId(1)))
            .with_child(ChildEntry::aggregator(AggregatorId(2)));
        assert_eq!(
            tree.insert(AggregatorId(3), house),
            Err(ComfortError::RoomRepeated { aggregator: AggregatorId(3), room: RoomId(1) })
        );
        assert_eq!(tree, before);
        assert!(tree.insert(AggregatorId(4), zone(&[2, 2])).is_err());

        // separate roots may share a room
        tree.insert(AggregatorId(3), zone(&[]).with_child(ChildEntry::aggregator(AggregatorId(2)))).unwrap();
        assert!(matches!(
            tree.attach(AggregatorId(1), ChildEntry::aggregator(AggregatorId(2))),
            Err(ComfortError::AggregatorHasParent { child: AggregatorId(2), .. })
        ));
        assert_eq!(
            tree.attach(AggregatorId(3), ChildEntry::room(RoomId(2))),
            Err(ComfortError::RoomRepeated { aggregator: AggregatorId(3), room: RoomId(2) })
        );

        let snapshots = BTreeMap::from([(RoomId(1), snap(20.0, 0, 10.0)), (RoomId(2), snap(22.0, 0, 10.0))]);
        let r = tree.evaluate(AggregatorId(3), &snapshots).unwrap();
        assert_eq!(r.heat_loss_w, 200.0);
        assert_eq!(r.total_weight, 20.0);
    }
}
