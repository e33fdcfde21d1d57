//! Breadcrumb pathfinding over the area graph
//!
//! Solving answers *whether* a check is reachable; this walk answers *how*.
//! Starting from the assigned start entrance at its concrete time of day, it
//! explores `(area, time of day)` nodes breadth-first: logical exits whose
//! edge condition holds under the solved bits, map exits through the given
//! exit assignment, and sleeping where the area allows it. For every check
//! and map exit it records the first node that reached it, so a path of
//! breadcrumbs can be read back through the parent links.
//!
//! The walk is presentation-level: reachability itself always comes from the
//! solver, never from here.

use crate::bitset::BitSet;
use crate::compiler::START_EXIT;
use crate::graph::{AreaId, LocationKind, RequirementGraph};
use crate::world::TimeOfDay;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Exit id to the entrance id it leads to.
pub type ExitAssignment = HashMap<Arc<str>, Arc<str>>;

/// One visited `(area, time of day)` state. `edge` labels the transition
/// taken from the parent ("Sleep" or a map exit's short name; logical exits
/// are unlabeled).
#[derive(Debug, Clone)]
pub struct ExplorationNode {
    pub area: AreaId,
    pub tod: TimeOfDay,
    pub parent: Option<usize>,
    pub edge: Option<Arc<str>>,
}

/// The result of [`explore`]: the visited node arena and, per check or map
/// exit, the index of the node that first reached it.
#[derive(Debug, Clone, Default)]
pub struct Exploration {
    pub nodes: Vec<ExplorationNode>,
    pub reachable: HashMap<Arc<str>, usize>,
}

impl Exploration {
    /// The node chain from the start to `node`, in walking order.
    pub fn path_to(&self, node: usize) -> Vec<&ExplorationNode> {
        let mut path = Vec::new();
        let mut current = Some(node);
        while let Some(idx) = current {
            path.push(&self.nodes[idx]);
            current = self.nodes[idx].parent;
        }
        path.reverse();
        path
    }
}

fn opposite(tod: TimeOfDay) -> TimeOfDay {
    match tod {
        TimeOfDay::DayOnly => TimeOfDay::NightOnly,
        _ => TimeOfDay::DayOnly,
    }
}

/// Walks the area graph under the solved `bits` and the exit assignment.
///
/// Returns `None` when no start entrance is assigned, or when the assigned
/// start entrance has no concrete time of day.
pub fn explore(
    graph: &RequirementGraph,
    assignment: &ExitAssignment,
    bits: &BitSet,
) -> Option<Exploration> {
    let area_graph = &graph.area_graph;
    let start_entrance = assignment.get(START_EXIT)?;
    let start_def = area_graph.entrances.get(&**start_entrance)?;
    if start_def.allowed_time_of_day == TimeOfDay::Both {
        return None;
    }
    let start_area = *area_graph.areas_by_entrance.get(start_entrance)?;

    let mut exploration = Exploration::default();
    exploration.nodes.push(ExplorationNode {
        area: start_area,
        tod: start_def.allowed_time_of_day,
        parent: None,
        edge: None,
    });

    let mut visited: HashMap<(AreaId, bool), usize> = HashMap::new();
    let key = |area: AreaId, tod: TimeOfDay| (area, tod == TimeOfDay::NightOnly);
    visited.insert(key(start_area, start_def.allowed_time_of_day), 0);
    let mut work_list: VecDeque<usize> = VecDeque::from([0]);

    while let Some(node_idx) = work_list.pop_back() {
        let (area_id, tod) = {
            let node = &exploration.nodes[node_idx];
            (node.area, node.tod)
        };
        let area = area_graph.area(area_id);

        if area.can_sleep {
            let flipped = opposite(tod);
            if let std::collections::hash_map::Entry::Vacant(entry) =
                visited.entry(key(area_id, flipped))
            {
                let next = exploration.nodes.len();
                entry.insert(next);
                exploration.nodes.push(ExplorationNode {
                    area: area_id,
                    tod: flipped,
                    parent: Some(node_idx),
                    edge: Some(Arc::from("Sleep")),
                });
                work_list.push_front(next);
            }
        }

        for location in &area.locations {
            let condition = location.condition.at(tod);
            match &location.kind {
                LocationKind::LogicalExit { to_area } => {
                    let dest = area_graph.area(*to_area);
                    if !visited.contains_key(&key(*to_area, tod))
                        && (dest.tod == TimeOfDay::Both || dest.tod == tod)
                        && condition.eval(bits)
                    {
                        let next = exploration.nodes.len();
                        visited.insert(key(*to_area, tod), next);
                        exploration.nodes.push(ExplorationNode {
                            area: *to_area,
                            tod,
                            parent: Some(node_idx),
                            edge: None,
                        });
                        work_list.push_front(next);
                    }
                }
                LocationKind::MapExit { exit_id, .. } => {
                    if !exploration.reachable.contains_key(exit_id) && condition.eval(bits) {
                        exploration.reachable.insert(Arc::clone(exit_id), node_idx);
                    }
                    let Some(entrance) = assignment.get(exit_id) else {
                        continue;
                    };
                    let Some(&dest_id) = area_graph.areas_by_entrance.get(entrance) else {
                        continue;
                    };
                    let dest = area_graph.area(dest_id);
                    if !visited.contains_key(&key(dest_id, tod))
                        && (dest.tod == TimeOfDay::Both || dest.tod == tod)
                    {
                        let edge = area_graph
                            .exits
                            .get(&**exit_id)
                            .map(|def| Arc::from(def.short_name.as_str()));
                        let next = exploration.nodes.len();
                        visited.insert(key(dest_id, tod), next);
                        exploration.nodes.push(ExplorationNode {
                            area: dest_id,
                            tod,
                            parent: Some(node_idx),
                            edge,
                        });
                        work_list.push_front(next);
                    }
                }
                LocationKind::Check { check_id, .. } => {
                    if !exploration.reachable.contains_key(check_id) && condition.eval(bits) {
                        exploration.reachable.insert(Arc::clone(check_id), node_idx);
                    }
                }
                // Virtual locations only exist in the requirement system.
                LocationKind::Virtual { .. } => {}
            }
        }
    }

    Some(exploration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::solver::solve;
    use crate::world::RawWorld;
    use serde_json::json;

    /// Day-entrance village that can sleep, with a night-only chest, a
    /// day-only field behind a logical exit, and a randomizable cave exit.
    fn world() -> RawWorld {
        serde_json::from_value(json!({
            "items": [
                "Day",
                "Night",
                "\\Start",
                "\\Village\\Main",
                "\\Village\\Cave Exit",
                "\\Village_DAY",
                "\\Village_NIGHT",
                "\\Village\\Night Chest",
                "\\Field",
                "\\Field\\Gate"
            ],
            "checks": {
                "\\Village\\Night Chest": { "type": null, "short_name": "Village - Night Chest" },
                "\\Field\\Gate": { "type": null, "short_name": "Field - Gate" }
            },
            "exits": {
                "\\Start": { "allowed_time_of_day": 3, "short_name": "Start" },
                "\\Village\\Cave Exit": { "allowed_time_of_day": 1, "short_name": "Cave Exit" }
            },
            "entrances": {
                "\\Village\\Main": { "allowed_time_of_day": 1, "short_name": "Village Main" }
            },
            "areas": {
                "name": "Root",
                "abstract": true,
                "can_sleep": false,
                "hint_region": null,
                "allowed_time_of_day": 3,
                "exits": { "\\Start": "True" },
                "sub_areas": {
                    "Village": {
                        "name": "\\Village",
                        "abstract": false,
                        "can_sleep": true,
                        "hint_region": "The Village",
                        "allowed_time_of_day": 3,
                        "entrances": ["Main"],
                        "exits": {
                            "\\Field": "True",
                            "Cave Exit": "True"
                        },
                        "locations": { "Night Chest": "Night" }
                    },
                    "Field": {
                        "name": "\\Field",
                        "abstract": false,
                        "can_sleep": false,
                        "hint_region": "The Field",
                        "allowed_time_of_day": 1,
                        "locations": { "Gate": "True" }
                    }
                }
            }
        }))
        .unwrap()
    }

    fn assignment() -> ExitAssignment {
        HashMap::from([(Arc::from(START_EXIT), Arc::from(r"\Village\Main"))])
    }

    #[test]
    fn explores_day_night_and_records_first_visits() {
        let graph = compile(&world()).unwrap().graph;
        let entrance = graph.fact(r"\Village\Main").unwrap();
        let inventory = HashMap::from([(entrance, crate::dnf::Dnf::always())]);
        let bits = solve(&graph, &[&inventory], None);

        let exploration = explore(&graph, &assignment(), &bits).unwrap();

        // The night chest is first reached from the slept-through node.
        let chest_node = exploration.reachable[r"\Village\Night Chest"];
        let path = exploration.path_to(chest_node);
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].edge, None);
        assert_eq!(path[1].edge.as_deref(), Some("Sleep"));
        assert_eq!(path[1].tod, TimeOfDay::NightOnly);

        // The field is entered during the day only.
        let gate_node = exploration.reachable[r"\Field\Gate"];
        assert_eq!(exploration.nodes[gate_node].tod, TimeOfDay::DayOnly);

        // The cave exit is recorded as reachable even though it leads nowhere.
        assert!(exploration.reachable.contains_key(r"\Village\Cave Exit"));
    }

    #[test]
    fn no_start_assignment_means_no_walk() {
        let graph = compile(&world()).unwrap().graph;
        let bits = BitSet::new();
        assert!(explore(&graph, &HashMap::new(), &bits).is_none());
    }
}
