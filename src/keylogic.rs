//! Key logic: predicting which dungeon keys are guaranteed obtainable
//!
//! For each key-locked dungeon this precomputes, against the full item
//! inventory, which checks are gated purely on the dungeon's own keys:
//! which checks fall out of logic as small keys are taken away one by one,
//! and which require the boss key. The semilogic loop then uses that data
//! to grant keys the player must be able to get: if every check reachable
//! with the keys they already hold is collected or in logic, the next key
//! has to be among them.
//!
//! The precomputation only makes sense for dungeons whose every candidate
//! check is optimistically reachable; others are skipped entirely.

use crate::bitset::BitSet;
use crate::dnf::Dnf;
use crate::graph::{Fact, RequirementGraph};
use crate::solver::{solve, Overrides};
use std::collections::HashSet;
use std::sync::Arc;

/// Caller-supplied description of a key-locked dungeon.
#[derive(Debug, Clone)]
pub struct KeyDungeon {
    pub name: String,
    /// Candidate check ids, with banned checks already removed.
    pub checks: Vec<Arc<str>>,
    /// Small-key threshold facts in ascending count order, so index `i`
    /// means "holds at least `i + 1` small keys". Empty when the dungeon
    /// has no small keys.
    pub small_key_facts: Vec<Fact>,
    pub boss_key_fact: Fact,
}

/// Precomputed key gating for one dungeon.
#[derive(Debug, Clone)]
pub struct DungeonKeyData {
    pub name: String,
    pub checks: Vec<Arc<str>>,
    pub small_key_facts: Vec<Fact>,
    pub boss_key_fact: Fact,
    /// Checks that need the boss key given everything else.
    pub boss_key_checks: Vec<Arc<str>>,
    /// Index `i` holds the checks that come into logic once the player has
    /// `i` small keys (and not before). Length is `small_key_facts.len() + 1`.
    pub checks_by_key_count: Vec<Vec<Arc<str>>>,
}

fn without_keys(inventory: &Overrides, keys: impl IntoIterator<Item = Fact>) -> Overrides {
    let mut inv = inventory.clone();
    for key in keys {
        inv.remove(&key);
    }
    inv
}

fn solve_with(
    graph: &RequirementGraph,
    base: &[&Overrides],
    inventory: &Overrides,
    starting_bits: Option<&BitSet>,
) -> BitSet {
    let mut layers: Vec<&Overrides> = base.to_vec();
    layers.push(inventory);
    solve(graph, &layers, starting_bits)
}

/// Computes [`DungeonKeyData`] for every dungeon whose checks are all
/// reachable in `optimistic_bits`. `full_inventory` must grant every item
/// fact, keys included; key-less variants are derived from it.
pub fn key_data(
    graph: &RequirementGraph,
    base: &[&Overrides],
    full_inventory: &Overrides,
    dungeons: &[KeyDungeon],
    optimistic_bits: &BitSet,
) -> Vec<DungeonKeyData> {
    let viable: Vec<&KeyDungeon> = dungeons
        .iter()
        .filter(|dungeon| {
            dungeon.checks.iter().all(|check| {
                graph
                    .fact(check)
                    .is_some_and(|fact| optimistic_bits.test(fact))
            })
        })
        .collect();

    // The no-key solve is shared by every per-dungeon solve as a resume point.
    let all_keys = viable.iter().flat_map(|dungeon| {
        dungeon
            .small_key_facts
            .iter()
            .copied()
            .chain([dungeon.boss_key_fact])
    });
    let no_keys_inventory = without_keys(full_inventory, all_keys);
    let baseline = solve_with(graph, base, &no_keys_inventory, None);

    let all_boss_keys: Vec<Fact> = viable.iter().map(|dungeon| dungeon.boss_key_fact).collect();
    let no_boss_keys_inventory = without_keys(full_inventory, all_boss_keys.iter().copied());

    let mut result = Vec::new();
    for dungeon in viable {
        let check_facts: Vec<(Arc<str>, Fact)> = dungeon
            .checks
            .iter()
            .filter_map(|check| graph.fact(check).map(|fact| (Arc::clone(check), fact)))
            .collect();

        let no_boss_bits = solve_with(graph, base, &no_boss_keys_inventory, Some(&baseline));
        let boss_key_checks = check_facts
            .iter()
            .filter(|(_, fact)| !no_boss_bits.test(*fact))
            .map(|(check, _)| Arc::clone(check))
            .collect();

        let num_keys = dungeon.small_key_facts.len();
        let mut checks_by_key_count = vec![Vec::new(); num_keys + 1];

        // Take keys away one at a time; a check that drops out between
        // `i` and `i - 1` keys needs exactly `i`.
        let mut previous = no_boss_bits;
        for i in (1..=num_keys).rev() {
            let inventory = without_keys(
                full_inventory,
                dungeon.small_key_facts[i - 1..]
                    .iter()
                    .copied()
                    .chain([dungeon.boss_key_fact]),
            );
            let bits = solve_with(graph, base, &inventory, Some(&baseline));
            for (check, fact) in &check_facts {
                if previous.test(*fact) && !bits.test(*fact) {
                    checks_by_key_count[i].push(Arc::clone(check));
                }
            }
            previous = bits;
        }
        for (check, fact) in &check_facts {
            if previous.test(*fact) {
                checks_by_key_count[0].push(Arc::clone(check));
            }
        }

        result.push(DungeonKeyData {
            name: dungeon.name.clone(),
            checks: dungeon.checks.clone(),
            small_key_facts: dungeon.small_key_facts.clone(),
            boss_key_fact: dungeon.boss_key_fact,
            boss_key_checks,
            checks_by_key_count,
        });
    }
    result
}

fn collected(
    graph: &RequirementGraph,
    check: &Arc<str>,
    bits: &BitSet,
    assumed_checks: &HashSet<Arc<str>>,
) -> bool {
    assumed_checks.contains(check) || graph.fact(check).is_some_and(|fact| bits.test(fact))
}

/// Grants keys the player is guaranteed to be able to collect, as assumption
/// overrides. Returns whether anything new was granted; each dungeon grants
/// at most one key per call, so this is meant to run inside the semilogic
/// loop until it settles.
pub fn predict_keys(
    graph: &RequirementGraph,
    dungeons: &[DungeonKeyData],
    boss_keys_in_dungeon: bool,
    small_keys_in_dungeon: bool,
    assumptions: &mut Overrides,
    bits: &BitSet,
    assumed_checks: &HashSet<Arc<str>>,
) -> bool {
    let mut changed = false;
    for dungeon in dungeons {
        if boss_keys_in_dungeon && !assumptions.contains_key(&dungeon.boss_key_fact) {
            let only_boss_left = dungeon.checks.iter().all(|check| {
                dungeon.boss_key_checks.contains(check)
                    || collected(graph, check, bits, assumed_checks)
            });
            if only_boss_left {
                assumptions.insert(dungeon.boss_key_fact, Dnf::always());
                changed = true;
                continue;
            }
        }

        if small_keys_in_dungeon && !dungeon.small_key_facts.is_empty() {
            let held = dungeon
                .small_key_facts
                .iter()
                .filter(|fact| assumptions.contains_key(fact))
                .count();
            if held >= dungeon.small_key_facts.len() {
                continue;
            }
            let within_reach = dungeon.checks_by_key_count[..=held]
                .iter()
                .flatten()
                .all(|check| collected(graph, check, bits, assumed_checks));
            if within_reach {
                // The next key must be among the checks we already have
                // the keys for.
                for fact in &dungeon.small_key_facts[..=held] {
                    assumptions.insert(*fact, Dnf::always());
                }
                changed = true;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnf::Dnf;
    use crate::graph::AreaGraph;
    use std::collections::{BTreeMap, HashMap};

    // 0 small key, 1 small key x 2, 2 boss key, 3 check behind one key,
    // 4 check behind two keys, 5 boss chest.
    fn dungeon_graph() -> RequirementGraph {
        let fact_names: Vec<Arc<str>> = [
            "SV Small Key",
            "SV Small Key x 2",
            "SV Boss Key",
            "SV - Key Chest",
            "SV - Deep Chest",
            "SV - Boss Chest",
        ]
        .iter()
        .map(|&n| Arc::from(n))
        .collect();
        let fact_ids = fact_names
            .iter()
            .enumerate()
            .map(|(idx, name)| (Arc::clone(name), idx))
            .collect();
        let requirements = vec![
            // Holding two keys grants the one-key threshold.
            Dnf::single(1),
            Dnf::never(),
            Dnf::never(),
            Dnf::single(0),
            Dnf::single(1),
            Dnf::single(2),
        ];
        let mut opaque = BitSet::with_capacity(requirements.len());
        for fact in 0..requirements.len() {
            opaque.set_bit(fact);
        }
        RequirementGraph {
            requirements,
            fact_names,
            fact_ids,
            opaque,
            day_fact: 0,
            night_fact: 0,
            dominators: HashMap::new(),
            reverse_dominators: HashMap::new(),
            checks: HashMap::new(),
            regions: Vec::new(),
            checks_by_region: BTreeMap::new(),
            area_graph: AreaGraph::default(),
        }
    }

    fn skyview() -> KeyDungeon {
        KeyDungeon {
            name: "Skyview".into(),
            checks: vec![
                Arc::from("SV - Key Chest"),
                Arc::from("SV - Deep Chest"),
                Arc::from("SV - Boss Chest"),
            ],
            small_key_facts: vec![0, 1],
            boss_key_fact: 2,
        }
    }

    fn full_inventory() -> Overrides {
        HashMap::from([
            (0, Dnf::always()),
            (1, Dnf::always()),
            (2, Dnf::always()),
        ])
    }

    #[test]
    fn checks_are_bucketed_by_required_key_count() {
        let g = dungeon_graph();
        let inventory = full_inventory();
        let optimistic = solve(&g, &[&inventory], None);

        let data = key_data(&g, &[], &inventory, &[skyview()], &optimistic);
        assert_eq!(data.len(), 1);
        let data = &data[0];

        assert_eq!(data.boss_key_checks, vec![Arc::from("SV - Boss Chest")]);
        assert!(data.checks_by_key_count[0].is_empty());
        assert_eq!(data.checks_by_key_count[1], vec![Arc::from("SV - Key Chest")]);
        assert_eq!(data.checks_by_key_count[2], vec![Arc::from("SV - Deep Chest")]);
    }

    #[test]
    fn unreachable_dungeons_are_skipped() {
        let g = dungeon_graph();
        let mut inventory = full_inventory();
        // Without the boss key the boss chest is never optimistically
        // reachable, so the dungeon does not qualify.
        inventory.remove(&2);
        let optimistic = solve(&g, &[&inventory], None);
        let data = key_data(&g, &[], &inventory, &[skyview()], &optimistic);
        assert!(data.is_empty());
    }

    #[test]
    fn keys_are_granted_one_at_a_time() {
        let g = dungeon_graph();
        let inventory = full_inventory();
        let optimistic = solve(&g, &[&inventory], None);
        let data = key_data(&g, &[], &inventory, &[skyview()], &optimistic);

        // Every non-boss check is in logic as far as keys allow.
        let mut bits = BitSet::new();
        bits.set_bit(3).set_bit(4);
        let assumed = HashSet::new();
        let mut assumptions = Overrides::new();

        // Both key chests are in logic, so only the boss chest is left and
        // the boss key is granted right away.
        assert!(predict_keys(&g, &data, true, true, &mut assumptions, &bits, &assumed));
        assert!(assumptions.contains_key(&2));
        assert!(!assumptions.contains_key(&0));

        // No keys held and nothing key-gated below one key: key one is free.
        assert!(predict_keys(&g, &data, true, true, &mut assumptions, &bits, &assumed));
        assert!(assumptions.contains_key(&0));
        assert!(!assumptions.contains_key(&1));

        // Key Chest is reachable and in logic, so key two follows.
        assert!(predict_keys(&g, &data, true, true, &mut assumptions, &bits, &assumed));
        assert!(assumptions.contains_key(&1));

        assert!(!predict_keys(&g, &data, true, true, &mut assumptions, &bits, &assumed));
    }

    #[test]
    fn keys_stall_on_uncollected_checks() {
        let g = dungeon_graph();
        let inventory = full_inventory();
        let optimistic = solve(&g, &[&inventory], None);
        let data = key_data(&g, &[], &inventory, &[skyview()], &optimistic);

        // Key Chest is not in logic and not assumed, so after the first
        // free key the prediction cannot continue.
        let bits = BitSet::new();
        let assumed = HashSet::new();
        let mut assumptions = Overrides::new();
        assert!(predict_keys(&g, &data, true, true, &mut assumptions, &bits, &assumed));
        assert!(!predict_keys(&g, &data, true, true, &mut assumptions, &bits, &assumed));
        assert!(!assumptions.contains_key(&1));
        assert!(!assumptions.contains_key(&2));
    }
}
