use super::*;
use crate::expression::Op;
use crate::graph::AreaGraph;
use std::collections::{BTreeMap, HashMap};

fn cube(bits: &[usize]) -> BitSet {
    bits.iter().copied().collect()
}

fn graph(fact_names: &[&str], dominance: &[(&str, &str)]) -> RequirementGraph {
    let fact_names: Vec<Arc<str>> = fact_names.iter().map(|&n| Arc::from(n)).collect();
    let fact_ids: HashMap<Arc<str>, Fact> = fact_names
        .iter()
        .enumerate()
        .map(|(idx, name)| (Arc::clone(name), idx))
        .collect();
    let mut dominators: HashMap<Arc<str>, Vec<Arc<str>>> = HashMap::new();
    let mut reverse_dominators: HashMap<Arc<str>, Vec<Arc<str>>> = HashMap::new();
    for &(weaker, stronger) in dominance {
        dominators
            .entry(Arc::from(weaker))
            .or_default()
            .push(Arc::from(stronger));
        reverse_dominators
            .entry(Arc::from(stronger))
            .or_default()
            .push(Arc::from(weaker));
    }
    let num_facts = fact_names.len();
    RequirementGraph {
        requirements: vec![Dnf::never(); num_facts],
        fact_names,
        fact_ids,
        opaque: BitSet::new(),
        day_fact: 0,
        night_fact: 0,
        dominators,
        reverse_dominators,
        checks: HashMap::new(),
        regions: Vec::new(),
        checks_by_region: BTreeMap::new(),
        area_graph: AreaGraph::default(),
    }
}

fn eval_expr(graph: &RequirementGraph, expr: &BooleanExpression, bits: &BitSet) -> bool {
    let eval_item = |item: &Item| match item {
        Item::Term(name) => bits.test(graph.fact(name).unwrap()),
        Item::Expr(inner) => eval_expr(graph, inner, bits),
    };
    match expr.op {
        Op::And => expr.items.iter().all(eval_item),
        Op::Or => expr.items.iter().any(eval_item),
    }
}

#[test]
fn degenerate_inputs() {
    let g = graph(&["A", "B"], &[]);
    assert_eq!(minimize(&g, &Dnf::never()), BooleanExpression::never());
    assert_eq!(minimize(&g, &Dnf::always()), BooleanExpression::always());
    assert_eq!(
        minimize(&g, &Dnf::from_conjunctions(vec![cube(&[0, 1])])),
        BooleanExpression::and(vec![Item::term("A"), Item::term("B")])
    );
}

#[test]
fn factors_two_level_sop() {
    // (Mitts | Bomb Bag) & (Bow | Clawshots | Slingshot | Beetle),
    // presented as the full 8-cube expansion.
    let g = graph(
        &["Mitts", "Bomb Bag", "Bow", "Clawshots", "Slingshot", "Beetle"],
        &[],
    );
    let sop: Vec<BitSet> = [0, 1]
        .iter()
        .flat_map(|&hand| [2, 3, 4, 5].iter().map(move |&tool| cube(&[hand, tool])))
        .collect();
    let result = minimize(&g, &Dnf::from_conjunctions(sop));

    let expected = BooleanExpression::and(vec![
        BooleanExpression::or(vec![Item::term("Mitts"), Item::term("Bomb Bag")]).into(),
        BooleanExpression::or(vec![
            Item::term("Bow"),
            Item::term("Clawshots"),
            Item::term("Slingshot"),
            Item::term("Beetle"),
        ])
        .into(),
    ]);
    assert_eq!(result, expected);
}

#[test]
fn dominated_facts_are_dropped_from_cubes() {
    let g = graph(
        &["Sword", "Sword x 2", "Bow", "Slingshot"],
        &[("Sword", "Sword x 2")],
    );
    // Sword is redundant next to Sword x 2.
    let sop = vec![cube(&[0, 1, 2]), cube(&[3])];
    let result = minimize(&g, &Dnf::from_conjunctions(sop));
    let expected = BooleanExpression::or(vec![
        BooleanExpression::and(vec![Item::term("Sword x 2"), Item::term("Bow")]).into(),
        Item::term("Slingshot"),
    ]);
    assert_eq!(result, expected);
}

#[test]
fn minimization_preserves_semantics() {
    let g = graph(&["a", "b", "c", "d", "e", "f"], &[]);
    let sop = vec![
        cube(&[0, 1]),
        cube(&[0, 2]),
        cube(&[3]),
        cube(&[1, 2, 4]),
        cube(&[0, 1, 5]),
    ];
    let dnf = Dnf::from_conjunctions(sop);
    let result = minimize(&g, &dnf);

    for mask in 0u32..64 {
        let mut bits = BitSet::new();
        for fact in 0..6 {
            if mask & (1 << fact) != 0 {
                bits.set_bit(fact);
            }
        }
        assert_eq!(
            eval_expr(&g, &result, &bits),
            dnf.eval(&bits),
            "diverges on {:?}",
            bits
        );
    }
}

#[test]
fn ground_expression_substitutes_to_opaque_facts() {
    // 0, 1 opaque; 2 = {0}; 3 = {2, 1} | {4}; 4 = {3} (a cycle).
    let opaque = cube(&[0, 1]);
    let requirements = vec![
        Dnf::never(),
        Dnf::never(),
        Dnf::from_conjunctions(vec![cube(&[0])]),
        Dnf::from_conjunctions(vec![cube(&[2, 1]), cube(&[4])]),
        Dnf::from_conjunctions(vec![cube(&[3])]),
    ];
    let ground = compute_ground_expression(&opaque, &requirements, 3);
    assert_eq!(ground.conjunctions(), &[cube(&[0, 1])]);
}

#[test]
fn ground_expression_of_pure_cycle_is_false() {
    let opaque = cube(&[0]);
    let requirements = vec![
        Dnf::never(),
        Dnf::from_conjunctions(vec![cube(&[2])]),
        Dnf::from_conjunctions(vec![cube(&[1])]),
    ];
    assert!(compute_ground_expression(&opaque, &requirements, 1).is_trivially_false());
}

#[test]
fn subgoal_search_walks_unexpanded_facts() {
    let opaque = cube(&[0, 1]);
    let requirements = vec![
        Dnf::never(),
        Dnf::never(),
        Dnf::from_conjunctions(vec![cube(&[0])]),
        Dnf::from_conjunctions(vec![cube(&[2, 1]), cube(&[4])]),
        Dnf::from_conjunctions(vec![cube(&[3])]),
    ];

    let path = find_new_subgoals(&opaque, &requirements, 3, &HashSet::new()).unwrap();
    assert_eq!(path, cube(&[2, 3]));

    // Once 2 is expanded, the remaining path goes through the cycle arm.
    let expanded = HashSet::from([2]);
    let path = find_new_subgoals(&opaque, &requirements, 3, &expanded).unwrap();
    assert_eq!(path, cube(&[3, 4]));

    // An unsatisfiable goal has no path at all.
    assert!(find_new_subgoals(&opaque, &requirements, 0, &HashSet::new()).is_none());

    // And an already expanded goal yields no further work.
    let expanded = HashSet::from([2, 3, 4]);
    assert!(find_new_subgoals(&opaque, &requirements, 3, &expanded).is_none());
}
