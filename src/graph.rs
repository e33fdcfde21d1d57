//! The compiled requirement graph
//!
//! A [`RequirementGraph`] is the immutable output of [`crate::compiler::compile`]:
//! one DNF requirement per fact, plus the fact interning tables, the stacked
//! item dominance relation, and the area arena the pathfinder walks. Solving
//! never mutates a graph; only the one-time load-time simplification does,
//! before the graph is handed out.

use crate::bitset::BitSet;
use crate::dnf::Dnf;
use crate::world::{RawEntrance, RawExit, TimeOfDay};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// An atomic boolean proposition, interned as an index in `[0, num_facts)`.
pub type Fact = usize;

/// Index into the area arena.
pub type AreaId = usize;

/// What kind of thing a check is, derived from the dump's check type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckKind {
    Regular,
    Rupee,
    TrialTreasure,
    LooseCrystal,
    Shop,
    Tadtone,
    GossipStone,
}

impl CheckKind {
    /// Classifies a check from its dump type string, `None` meaning regular.
    pub fn classify(check_name: &str, check_type: Option<&str>) -> CheckKind {
        let Some(check_type) = check_type else {
            return CheckKind::Regular;
        };
        if check_type.contains("Rupee") {
            CheckKind::Rupee
        } else if check_type.contains("silent realm") {
            CheckKind::TrialTreasure
        } else if check_type.contains("Loose Crystals") {
            CheckKind::LooseCrystal
        } else if check_type.contains("Beedle's Shop Purchases") {
            CheckKind::Shop
        } else if check_type.contains("Tadtones") && !check_name.contains("Water Dragon's Reward")
        {
            CheckKind::Tadtone
        } else {
            CheckKind::Regular
        }
    }
}

#[derive(Debug, Clone)]
pub struct Check {
    pub kind: CheckKind,
    /// Display name.
    pub name: String,
}

/// An edge condition, split per time of day when the owning area has both.
#[derive(Debug, Clone)]
pub enum TodRequirement {
    Single(Dnf),
    Split { day: Dnf, night: Dnf },
}

impl TodRequirement {
    /// The condition applying at the given concrete time of day.
    pub fn at(&self, tod: TimeOfDay) -> &Dnf {
        match self {
            TodRequirement::Single(dnf) => dnf,
            TodRequirement::Split { day, night } => match tod {
                TimeOfDay::NightOnly => night,
                _ => day,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum LocationKind {
    /// A walkable connection into another area.
    LogicalExit { to_area: AreaId },
    /// A randomizable connector, resolved through the exit assignment.
    MapExit { exit_id: Arc<str>, fact: Fact },
    Check { check_id: Arc<str>, fact: Fact },
    /// Contributes a fact but is not a place the pathfinder can stand in.
    Virtual { fact: Fact },
}

#[derive(Debug, Clone)]
pub struct AreaLocation {
    pub kind: LocationKind,
    /// The edge condition, not including the owning area's own fact.
    pub condition: TodRequirement,
}

#[derive(Debug, Clone)]
pub struct Area {
    pub name: Arc<str>,
    pub is_abstract: bool,
    pub can_sleep: bool,
    pub tod: TimeOfDay,
    pub entrances: Vec<Arc<str>>,
    pub locations: Vec<AreaLocation>,
}

/// Exits of a linked pool entry. Outside first, inside second.
#[derive(Debug, Clone)]
pub struct EntranceLinkage {
    pub exits: [Arc<str>; 2],
    pub entrances: [Arc<str>; 2],
}

#[derive(Debug, Clone, Default)]
pub struct AreaGraph {
    pub areas: Vec<Area>,
    pub area_ids: HashMap<Arc<str>, AreaId>,
    pub root: AreaId,
    pub areas_by_entrance: HashMap<Arc<str>, AreaId>,
    pub areas_by_exit: HashMap<Arc<str>, AreaId>,
    pub entrances: BTreeMap<String, RawEntrance>,
    pub exits: BTreeMap<String, RawExit>,
    /// Exit id to the entrance id of its fixed vanilla destination.
    pub vanilla_connections: HashMap<Arc<str>, Arc<str>>,
    /// Canonical exit to the return exit taken automatically with it.
    pub auto_exits: HashMap<Arc<str>, Arc<str>>,
    /// Pool name to pool entries.
    pub entrance_pools: BTreeMap<String, BTreeMap<String, EntranceLinkage>>,
    /// Dungeon name to the check that marks the dungeon completed.
    pub dungeon_completion_checks: BTreeMap<String, Arc<str>>,
}

impl AreaGraph {
    pub fn area(&self, id: AreaId) -> &Area {
        &self.areas[id]
    }

    pub fn area_by_name(&self, name: &str) -> Option<&Area> {
        self.area_ids.get(name).map(|&id| &self.areas[id])
    }
}

/// The compiled logic for a loaded world.
#[derive(Debug, Clone)]
pub struct RequirementGraph {
    /// One DNF per fact; index is the fact.
    pub requirements: Vec<Dnf>,
    /// Fact index to name.
    pub fact_names: Vec<Arc<str>>,
    pub(crate) fact_ids: HashMap<Arc<str>, Fact>,
    /// Facts never inlined or expanded: items, settings, tricks, markers.
    pub opaque: BitSet,
    /// The day/night marker facts used for time-of-day pruning.
    pub day_fact: Fact,
    pub night_fact: Fact,
    /// Stacked item dominance: name to the stronger names that imply it.
    pub dominators: HashMap<Arc<str>, Vec<Arc<str>>>,
    /// Name to the weaker names it implies.
    pub reverse_dominators: HashMap<Arc<str>, Vec<Arc<str>>>,
    pub checks: HashMap<Arc<str>, Check>,
    /// Hint regions in display order.
    pub regions: Vec<String>,
    /// Hint region to check ids, in dump order.
    pub checks_by_region: BTreeMap<String, Vec<Arc<str>>>,
    pub area_graph: AreaGraph,
}

impl RequirementGraph {
    pub fn num_facts(&self) -> usize {
        self.requirements.len()
    }

    /// Resolves a fact name to its index.
    pub fn fact(&self, name: &str) -> Option<Fact> {
        self.fact_ids.get(name).copied()
    }

    pub fn fact_name(&self, fact: Fact) -> &Arc<str> {
        &self.fact_names[fact]
    }

    /// Dungeons whose completion check satisfies `is_checked`, in dump
    /// order. Trackers mark a dungeon complete once its completion check
    /// has been collected.
    pub fn completed_dungeons(&self, mut is_checked: impl FnMut(&str) -> bool) -> Vec<&str> {
        self.area_graph
            .dungeon_completion_checks
            .iter()
            .filter(|(_, check)| is_checked(check))
            .map(|(dungeon, _)| dungeon.as_str())
            .collect()
    }

    /// The opaque set used when expanding explanations. Checks and virtual
    /// locations act as macros there and dissolve into their requirements
    /// instead of appearing verbatim. The solver-facing [`Self::opaque`] set
    /// keeps them opaque so overrides granting a check still propagate.
    pub fn explanation_opaque(&self) -> BitSet {
        let mut opaque = self.opaque.clone();
        for area in &self.area_graph.areas {
            for location in &area.locations {
                match location.kind {
                    LocationKind::Check { fact, .. } | LocationKind::Virtual { fact } => {
                        opaque.clear_bit(fact);
                    }
                    LocationKind::LogicalExit { .. } | LocationKind::MapExit { .. } => {}
                }
            }
        }
        opaque
    }

    /// Whether holding the fact named `a` always entails holding `b`,
    /// according to the stacked item dominance table.
    pub fn implies(&self, a: &str, b: &str) -> bool {
        a == b
            || self
                .dominators
                .get(b)
                .is_some_and(|stronger| stronger.iter().any(|s| &**s == a))
    }
}
