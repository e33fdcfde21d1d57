//! Requirement graph compiler
//!
//! Turns the nested area/exit/entrance/location description from a logic dump
//! into a flat system of monotone boolean implications, one DNF per fact.
//!
//! Compilation proceeds in phases:
//!
//! 1. Item preprocessing rewrites ordinal item names ("Sword #2") into
//!    stacked-threshold facts and records the dominance table.
//! 2. Every fact name in the dump gets an index; the dump lists day and night
//!    variants separately for anything reachable at both times of day.
//! 3. Two recursive walks over the area tree: the first builds the area
//!    arena so cross-references resolve regardless of declaration order, the
//!    second parses requirements and emits implication edges, combining each
//!    edge condition with the owning area's time-of-day facts.
//! 4. Vanilla connections, auto exits and linked entrance pools are resolved
//!    from the exit table.
//! 5. Stacked item dominance is realized as requirement alternatives so the
//!    solver sees "owning x 3" as one more way of satisfying "owning x 2".
//! 6. A load-time simplification pass shrinks the system in place.
//!
//! Malformed input is fatal; non-fatal findings come back as warnings next to
//! the graph.

mod builder;
pub mod error;
mod items;

pub use error::{CompileError, CompileWarning};

use crate::bitset::BitSet;
use crate::dnf::Dnf;
use crate::graph::{
    Area, AreaGraph, AreaId, AreaLocation, Check, CheckKind, EntranceLinkage, LocationKind,
    RequirementGraph, TodRequirement,
};
use crate::simplify;
use crate::world::{RawArea, RawWorld, TimeOfDay};
use builder::GraphBuilder;
use items::preprocess_items;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// The one exit an abstract area may declare, leading to the chosen start
/// entrance.
pub const START_EXIT: &str = r"\Start";

const DAY_MARKER: &str = "Day";
const NIGHT_MARKER: &str = "Night";

/// A compiled graph plus non-fatal findings.
#[derive(Debug)]
pub struct CompileOutput {
    pub graph: RequirementGraph,
    pub warnings: Vec<CompileWarning>,
}

/// Compiles a raw world description into a requirement graph.
pub fn compile(raw: &RawWorld) -> Result<CompileOutput, CompileError> {
    let items = preprocess_items(&raw.items);
    let fact_names: Vec<Arc<str>> = items
        .names
        .iter()
        .map(|name| Arc::from(name.as_str()))
        .collect();
    let num_facts = fact_names.len();
    let fact_ids: HashMap<Arc<str>, usize> = fact_names
        .iter()
        .enumerate()
        .map(|(idx, name)| (Arc::clone(name), idx))
        .collect();

    // Pessimistically, every fact is opaque; bits are cleared as the walk
    // gives them graph-internal requirements.
    let mut opaque = BitSet::with_capacity(num_facts);
    for fact in 0..num_facts {
        opaque.set_bit(fact);
    }

    let day_fact = *fact_ids
        .get(DAY_MARKER)
        .ok_or(CompileError::MissingMarkerFact { name: DAY_MARKER })?;
    let night_fact = *fact_ids
        .get(NIGHT_MARKER)
        .ok_or(CompileError::MissingMarkerFact { name: NIGHT_MARKER })?;

    let mut checks: HashMap<Arc<str>, Check> = HashMap::new();
    for (check_id, check) in &raw.checks {
        checks.insert(
            Arc::from(check_id.as_str()),
            Check {
                kind: CheckKind::classify(&check.short_name, check.check_type.as_deref()),
                name: check.short_name.clone(),
            },
        );
    }
    for (stone_id, stone_name) in &raw.gossip_stones {
        checks.insert(
            Arc::from(stone_id.as_str()),
            Check {
                kind: CheckKind::GossipStone,
                name: stone_name.clone(),
            },
        );
    }

    let mut walk = Walk {
        raw,
        builder: GraphBuilder::new(&fact_ids, num_facts),
        areas: Vec::new(),
        area_ids: HashMap::new(),
        areas_by_exit: HashMap::new(),
        checks: &checks,
        checks_by_region: BTreeMap::new(),
        entrances_by_short_name: HashMap::new(),
        opaque: &mut opaque,
        day_fact,
        night_fact,
    };

    let root = walk.index_area(&raw.areas);
    if !walk.areas[root].is_abstract {
        return Err(CompileError::RootNotAbstract {
            name: raw.areas.name.clone(),
        });
    }
    walk.populate_area(&raw.areas)?;

    let Walk {
        builder,
        areas,
        area_ids,
        areas_by_exit,
        mut checks_by_region,
        entrances_by_short_name,
        ..
    } = walk;
    let GraphBuilder {
        mut requirements,
        mut warnings,
        ..
    } = builder;

    let mut areas_by_entrance: HashMap<Arc<str>, AreaId> = HashMap::new();
    for (id, area) in areas.iter().enumerate() {
        for entrance in &area.entrances {
            areas_by_entrance.insert(Arc::clone(entrance), id);
        }
    }

    let mut vanilla_connections: HashMap<Arc<str>, Arc<str>> = HashMap::new();
    for (exit_id, exit_def) in &raw.exits {
        if let Some(vanilla) = &exit_def.vanilla {
            let entrance = entrances_by_short_name.get(vanilla).ok_or_else(|| {
                CompileError::UnknownVanillaEntrance {
                    exit: exit_id.clone(),
                    entrance: vanilla.clone(),
                }
            })?;
            vanilla_connections.insert(Arc::from(exit_id.as_str()), Arc::clone(entrance));
        }
    }

    let mut auto_exits: HashMap<Arc<str>, Arc<str>> = HashMap::new();
    let mut entrance_pools: BTreeMap<String, BTreeMap<String, EntranceLinkage>> = BTreeMap::new();
    for (pool_name, pool) in &raw.linked_entrances {
        let entries = entrance_pools.entry(pool_name.clone()).or_default();
        for (location, link) in pool {
            let canonical: Arc<str> = Arc::from(link.exit_from_outside.canonical());
            if let Some(secondary) = link.exit_from_outside.secondary() {
                auto_exits.insert(Arc::clone(&canonical), Arc::from(secondary));
            }
            let inside: Arc<str> = Arc::from(link.exit_from_inside.as_str());
            let entrance_of = |exit: &Arc<str>| {
                vanilla_connections.get(exit).cloned().ok_or_else(|| {
                    CompileError::PoolExitWithoutVanilla {
                        pool: pool_name.clone(),
                        exit: exit.to_string(),
                    }
                })
            };
            entries.insert(
                location.clone(),
                EntranceLinkage {
                    entrances: [entrance_of(&canonical)?, entrance_of(&inside)?],
                    exits: [canonical, inside],
                },
            );
        }
    }

    // Checks within a region keep dump order, and regions are ordered by
    // their first check.
    let check_order: HashMap<&str, usize> = raw
        .checks
        .keys()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();
    let order_of = |id: &str| check_order.get(id).copied().unwrap_or(usize::MAX);
    for region_checks in checks_by_region.values_mut() {
        region_checks.sort_by_key(|id| order_of(id));
    }
    let mut regions: Vec<String> = checks_by_region.keys().cloned().collect();
    regions.sort_by_key(|region| {
        checks_by_region[region]
            .first()
            .map(|id| order_of(id))
            .unwrap_or(usize::MAX)
    });

    // Dominance becomes ordinary requirement alternatives: every higher
    // threshold is one more way to satisfy each lower one. Walking facts in
    // index order keeps the emitted DNFs deterministic.
    for name in &fact_names {
        if let Some(weaker_names) = items.reverse_dominators.get(name) {
            let stronger = fact_ids[name];
            for weaker_name in weaker_names {
                if let Some(&weaker) = fact_ids.get(weaker_name) {
                    requirements[weaker] =
                        requirements[weaker].or_conjunction(BitSet::single(stronger));
                }
            }
        }
    }

    for (fact, name) in fact_names.iter().enumerate() {
        if checks.contains_key(name) && requirements[fact].is_trivially_false() {
            warnings.push(CompileWarning::UnsatisfiableCheck {
                name: name.to_string(),
            });
        }
    }

    let mut dungeon_completion_checks: BTreeMap<String, Arc<str>> = BTreeMap::new();
    for (dungeon, check_id) in &raw.dungeon_completion_requirements {
        match checks.get_key_value(check_id.as_str()) {
            Some((id, _)) => {
                dungeon_completion_checks.insert(dungeon.clone(), Arc::clone(id));
            }
            None => warnings.push(CompileWarning::UnknownCompletionCheck {
                dungeon: dungeon.clone(),
                check: check_id.clone(),
            }),
        }
    }

    // Load-time shrink; the graph is immutable from here on.
    simplify::simplify_requirements(&mut requirements, &opaque);

    let graph = RequirementGraph {
        requirements,
        fact_names,
        fact_ids,
        opaque,
        day_fact,
        night_fact,
        dominators: items.dominators,
        reverse_dominators: items.reverse_dominators,
        checks,
        regions,
        checks_by_region,
        area_graph: AreaGraph {
            areas,
            area_ids,
            root,
            areas_by_entrance,
            areas_by_exit,
            entrances: raw.entrances.clone(),
            exits: raw.exits.clone(),
            vanilla_connections,
            auto_exits,
            entrance_pools,
            dungeon_completion_checks,
        },
    };

    Ok(CompileOutput { graph, warnings })
}

struct Walk<'a> {
    raw: &'a RawWorld,
    builder: GraphBuilder<'a>,
    areas: Vec<Area>,
    area_ids: HashMap<Arc<str>, AreaId>,
    areas_by_exit: HashMap<Arc<str>, AreaId>,
    checks: &'a HashMap<Arc<str>, Check>,
    checks_by_region: BTreeMap<String, Vec<Arc<str>>>,
    entrances_by_short_name: HashMap<String, Arc<str>>,
    opaque: &'a mut BitSet,
    day_fact: usize,
    night_fact: usize,
}

impl Walk<'_> {
    /// First pass: register every area in the arena so the second pass can
    /// resolve cross-references in any order.
    fn index_area(&mut self, raw_area: &RawArea) -> AreaId {
        let name: Arc<str> = Arc::from(raw_area.name.as_str());
        let id = self.areas.len();
        self.areas.push(Area {
            name: Arc::clone(&name),
            is_abstract: raw_area.is_abstract,
            can_sleep: raw_area.can_sleep,
            tod: raw_area.allowed_time_of_day,
            entrances: Vec::new(),
            locations: Vec::new(),
        });
        self.area_ids.insert(name, id);
        for sub_area in raw_area.sub_areas.values() {
            self.index_area(sub_area);
        }
        id
    }

    fn day_pruned(&self, expr: &Dnf) -> Dnf {
        expr.drop_unless(self.day_fact, self.night_fact)
    }

    fn night_pruned(&self, expr: &Dnf) -> Dnf {
        expr.drop_unless(self.night_fact, self.day_fact)
    }

    /// Second pass: emit implication edges and fill in the area arena.
    fn populate_area(&mut self, raw_area: &RawArea) -> Result<(), CompileError> {
        for sub_area in raw_area.sub_areas.values() {
            self.populate_area(sub_area)?;
        }

        let area_id = self.area_ids[raw_area.name.as_str()];
        let src_name = raw_area.name.as_str();
        let src_tod = raw_area.allowed_time_of_day;

        if raw_area.can_sleep {
            if src_tod != TimeOfDay::Both {
                return Err(CompileError::CannotSleep {
                    area: src_name.to_string(),
                });
            }
            // Sleeping flips the time of day for free, in both directions.
            let day = self.builder.day(src_name)?;
            let night = self.builder.night(src_name)?;
            self.builder.add_alternative(day, &Dnf::single(night));
            self.builder.add_alternative(night, &Dnf::single(day));
            self.opaque.clear_bit(day);
            self.opaque.clear_bit(night);
        }

        if let Some(exits) = &raw_area.exits {
            for (exit, requirement_text) in exits {
                let expr = self.builder.parse_requirement(requirement_text)?;
                let full_exit_name = if exit.starts_with('\\') {
                    exit.clone()
                } else {
                    format!("{}\\{}", src_name, exit)
                };
                if self.area_ids.contains_key(full_exit_name.as_str()) {
                    self.logical_exit(raw_area, area_id, &full_exit_name, expr)?;
                } else if self.raw.exits.contains_key(&full_exit_name) {
                    self.map_exit(raw_area, area_id, &full_exit_name, expr)?;
                } else {
                    return Err(CompileError::UnresolvedExit {
                        area: src_name.to_string(),
                        exit: full_exit_name,
                    });
                }
            }
        }

        if let Some(entrances) = &raw_area.entrances {
            for entrance in entrances {
                self.entrance(raw_area, area_id, entrance)?;
            }
        }

        if let Some(locations) = &raw_area.locations {
            for (location, requirement_text) in locations {
                self.location(raw_area, area_id, location, requirement_text)?;
            }
        }

        Ok(())
    }

    /// A walkable connection into another area: the destination's fact gains
    /// an alternative "in the source area and the edge condition holds".
    fn logical_exit(
        &mut self,
        raw_area: &RawArea,
        area_id: AreaId,
        dest_name: &str,
        expr: Dnf,
    ) -> Result<(), CompileError> {
        let dest_id = self.area_ids[dest_name];
        let (dest_tod, dest_abstract) = {
            let dest = &self.areas[dest_id];
            (dest.tod, dest.is_abstract)
        };
        if dest_abstract {
            return Err(CompileError::ExitToAbstractArea {
                area: raw_area.name.clone(),
                exit: dest_name.to_string(),
            });
        }
        let src_name = raw_area.name.as_str();
        let src_tod = raw_area.allowed_time_of_day;

        let condition;
        match dest_tod {
            TimeOfDay::Both => {
                let dest_day = self.builder.day(dest_name)?;
                let dest_night = self.builder.night(dest_name)?;
                self.opaque.clear_bit(dest_day);
                self.opaque.clear_bit(dest_night);

                match src_tod {
                    TimeOfDay::Both => {
                        let src_day = self.builder.day(src_name)?;
                        let src_night = self.builder.night(src_name)?;
                        let day = self.day_pruned(&expr);
                        let night = self.night_pruned(&expr);
                        self.builder
                            .add_alternative(dest_day, &day.and_conjunction(&BitSet::single(src_day)));
                        self.builder.add_alternative(
                            dest_night,
                            &night.and_conjunction(&BitSet::single(src_night)),
                        );
                        condition = TodRequirement::Split { day, night };
                    }
                    TimeOfDay::DayOnly => {
                        let src = self.builder.fact(src_name)?;
                        let day = self.day_pruned(&expr);
                        self.builder
                            .add_alternative(dest_day, &day.and_conjunction(&BitSet::single(src)));
                        condition = TodRequirement::Single(day);
                    }
                    TimeOfDay::NightOnly => {
                        let src = self.builder.fact(src_name)?;
                        let night = self.night_pruned(&expr);
                        self.builder
                            .add_alternative(dest_night, &night.and_conjunction(&BitSet::single(src)));
                        condition = TodRequirement::Single(night);
                    }
                }
            }
            TimeOfDay::DayOnly | TimeOfDay::NightOnly => {
                let dest_fact = self.builder.fact(dest_name)?;
                // Only the disjuncts matching the destination's time of day
                // can ever take this edge.
                let timed_req = if dest_tod == TimeOfDay::DayOnly {
                    self.day_pruned(&expr)
                } else {
                    self.night_pruned(&expr)
                };

                match src_tod {
                    TimeOfDay::Both => {
                        let src = if dest_tod == TimeOfDay::DayOnly {
                            self.builder.day(src_name)?
                        } else {
                            self.builder.night(src_name)?
                        };
                        self.builder.add_alternative(
                            dest_fact,
                            &timed_req.and_conjunction(&BitSet::single(src)),
                        );
                    }
                    _ if src_tod == dest_tod => {
                        let src = self.builder.fact(src_name)?;
                        self.builder.add_alternative(
                            dest_fact,
                            &timed_req.and_conjunction(&BitSet::single(src)),
                        );
                    }
                    // A day-only area cannot connect into a night-only one.
                    _ => {}
                }
                self.opaque.clear_bit(dest_fact);
                condition = TodRequirement::Single(timed_req);
            }
        }

        self.areas[area_id].locations.push(AreaLocation {
            kind: LocationKind::LogicalExit { to_area: dest_id },
            condition,
        });
        Ok(())
    }

    /// A randomizable connector. Taking it requires being in the owning area;
    /// where it leads is resolved at solve time through the exit assignment.
    fn map_exit(
        &mut self,
        raw_area: &RawArea,
        area_id: AreaId,
        full_exit_name: &str,
        expr: Dnf,
    ) -> Result<(), CompileError> {
        let exit_id: Arc<str> = Arc::from(full_exit_name);
        let exit_fact = self.builder.fact(full_exit_name)?;
        self.areas_by_exit.insert(Arc::clone(&exit_id), area_id);
        self.opaque.clear_bit(exit_fact);

        let src_name = raw_area.name.as_str();
        let condition;
        if raw_area.is_abstract {
            if full_exit_name != START_EXIT {
                return Err(CompileError::AbstractAreaExit {
                    area: src_name.to_string(),
                    exit: full_exit_name.to_string(),
                });
            }
            self.builder.set(exit_fact, full_exit_name, expr.clone());
            condition = TodRequirement::Single(expr);
        } else {
            match raw_area.allowed_time_of_day {
                TimeOfDay::Both => {
                    let src_day = self.builder.day(src_name)?;
                    let src_night = self.builder.night(src_name)?;
                    let day = self.day_pruned(&expr);
                    let night = self.night_pruned(&expr);
                    self.builder
                        .add_alternative(exit_fact, &day.and_conjunction(&BitSet::single(src_day)));
                    self.builder.add_alternative(
                        exit_fact,
                        &night.and_conjunction(&BitSet::single(src_night)),
                    );
                    condition = TodRequirement::Split { day, night };
                }
                TimeOfDay::DayOnly => {
                    let src = self.builder.fact(src_name)?;
                    let day = self.day_pruned(&expr);
                    self.builder
                        .add_alternative(exit_fact, &day.and_conjunction(&BitSet::single(src)));
                    condition = TodRequirement::Single(day);
                }
                TimeOfDay::NightOnly => {
                    let src = self.builder.fact(src_name)?;
                    let night = self.night_pruned(&expr);
                    self.builder
                        .add_alternative(exit_fact, &night.and_conjunction(&BitSet::single(src)));
                    condition = TodRequirement::Single(night);
                }
            }
        }

        self.areas[area_id].locations.push(AreaLocation {
            kind: LocationKind::MapExit {
                exit_id,
                fact: exit_fact,
            },
            condition,
        });
        Ok(())
    }

    /// An entrance makes its area reachable whenever the entrance fact holds.
    fn entrance(
        &mut self,
        raw_area: &RawArea,
        area_id: AreaId,
        entrance: &str,
    ) -> Result<(), CompileError> {
        let src_name = raw_area.name.as_str();
        let full_entrance_name = format!("{}\\{}", src_name, entrance);
        let def = self.raw.entrances.get(&full_entrance_name).ok_or_else(|| {
            CompileError::UnknownEntrance {
                area: src_name.to_string(),
                entrance: full_entrance_name.clone(),
            }
        })?;
        let entrance_id: Arc<str> = Arc::from(full_entrance_name.as_str());

        // Pools and exit assignments refer to entrances by short name.
        self.entrances_by_short_name
            .insert(def.short_name.clone(), Arc::clone(&entrance_id));
        self.entrances_by_short_name
            .insert(entrance.to_string(), Arc::clone(&entrance_id));
        self.areas[area_id].entrances.push(Arc::clone(&entrance_id));

        if def.allowed_time_of_day == TimeOfDay::Both {
            let area_day = self.builder.day(src_name)?;
            let area_night = self.builder.night(src_name)?;
            let entrance_day = self.builder.day(&full_entrance_name)?;
            let entrance_night = self.builder.night(&full_entrance_name)?;
            self.builder
                .add_alternative(area_day, &Dnf::single(entrance_day));
            self.builder
                .add_alternative(area_night, &Dnf::single(entrance_night));
            self.opaque.clear_bit(area_day);
            self.opaque.clear_bit(area_night);
        } else {
            let area_fact = if raw_area.allowed_time_of_day == TimeOfDay::Both {
                match def.allowed_time_of_day {
                    TimeOfDay::DayOnly => self.builder.day(src_name)?,
                    TimeOfDay::NightOnly => self.builder.night(src_name)?,
                    TimeOfDay::Both => unreachable!(),
                }
            } else {
                self.builder.fact(src_name)?
            };
            let entrance_fact = self.builder.fact(&full_entrance_name)?;
            self.builder
                .add_alternative(area_fact, &Dnf::single(entrance_fact));
            self.opaque.clear_bit(area_fact);
        }
        Ok(())
    }

    /// A check or virtual location inside an area.
    fn location(
        &mut self,
        raw_area: &RawArea,
        area_id: AreaId,
        location: &str,
        requirement_text: &str,
    ) -> Result<(), CompileError> {
        let src_name = raw_area.name.as_str();
        let rooted = location.starts_with('\\');
        let loc_name = if rooted {
            location.to_string()
        } else {
            format!("{}\\{}", src_name, location)
        };
        let loc_id: Arc<str> = Arc::from(loc_name.as_str());

        let is_check = self.checks.contains_key(loc_name.as_str());
        if !rooted && is_check {
            let region = raw_area
                .hint_region
                .clone()
                .ok_or_else(|| CompileError::CheckWithoutRegion {
                    check: loc_name.clone(),
                })?;
            self.checks_by_region
                .entry(region)
                .or_default()
                .push(Arc::clone(&loc_id));
        }

        let fact = self.builder.fact(&loc_name)?;
        let expr = self.builder.parse_requirement(requirement_text)?;

        let (timed_req, condition) = if raw_area.is_abstract {
            (expr.clone(), TodRequirement::Single(expr))
        } else {
            match raw_area.allowed_time_of_day {
                TimeOfDay::Both => {
                    let src_day = self.builder.day(src_name)?;
                    let src_night = self.builder.night(src_name)?;
                    let day = self.day_pruned(&expr);
                    let night = self.night_pruned(&expr);
                    let timed_req = day
                        .and_conjunction(&BitSet::single(src_day))
                        .or(&night.and_conjunction(&BitSet::single(src_night)));
                    (timed_req, TodRequirement::Split { day, night })
                }
                TimeOfDay::DayOnly => {
                    let src = self.builder.fact(src_name)?;
                    let day = self.day_pruned(&expr);
                    (
                        day.and_conjunction(&BitSet::single(src)),
                        TodRequirement::Single(day),
                    )
                }
                TimeOfDay::NightOnly => {
                    let src = self.builder.fact(src_name)?;
                    let night = self.night_pruned(&expr);
                    (
                        night.and_conjunction(&BitSet::single(src)),
                        TodRequirement::Single(night),
                    )
                }
            }
        };
        self.builder.add_alternative(fact, &timed_req);

        let kind = if is_check {
            LocationKind::Check {
                check_id: loc_id,
                fact,
            }
        } else {
            LocationKind::Virtual { fact }
        };
        self.areas[area_id]
            .locations
            .push(AreaLocation { kind, condition });
        Ok(())
    }
}
