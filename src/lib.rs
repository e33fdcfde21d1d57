//! # Tracker Logic
//!
//! A requirement-logic engine for randomized game worlds. A world dump
//! describes areas, connections, checks and textual requirement expressions;
//! this crate compiles it into a monotone implication system over interned
//! facts and answers reachability and explanation queries against it.
//!
//! ## Overview
//!
//! The pipeline:
//!
//! 1. Deserialize the dump into a [`world::RawWorld`] (plain serde types).
//! 2. [`compiler::compile`] parses every requirement expression, walks the
//!    area graph (day/night duality, sleeping, exits and entrances) and
//!    produces a [`graph::RequirementGraph`]: one [`dnf::Dnf`] requirement
//!    per fact. The system is shrunk once at the end of the compile by
//!    [`simplify::simplify_requirements`] without changing which facts are
//!    derivable.
//! 3. [`solver::solve`] computes the least fixed point under any stack of
//!    override layers (tracked inventory, settings, assumed checks), in
//!    milliseconds rather than once.
//!
//! On top of that sit the read-only analyses: [`pathfinding::explore`] walks
//! the area graph for "how do I get there" breadcrumbs, [`semilogic`] and
//! [`keylogic`] compute reachability under optimistic assumptions, and
//! [`worker::AnalysisWorker`] turns a fact's requirement into a minimal
//! human-readable and/or tree on a background thread.
//!
//! ## Example
//!
//! ```no_run
//! use tracker_logic::compiler::compile;
//! use tracker_logic::dnf::Dnf;
//! use tracker_logic::solver::{solve, Overrides};
//! use tracker_logic::world::RawWorld;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dump = std::fs::read_to_string("world.json")?;
//! let raw: RawWorld = serde_json::from_str(&dump)?;
//! let output = compile(&raw)?;
//! let graph = output.graph;
//!
//! let mut inventory = Overrides::new();
//! if let Some(sword) = graph.fact("Progressive Sword") {
//!     inventory.insert(sword, Dnf::always());
//! }
//! let bits = solve(&graph, &[&inventory], None);
//! for (check_id, check) in &graph.checks {
//!     if graph.fact(check_id).is_some_and(|fact| bits.test(fact)) {
//!         println!("in logic: {}", check.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod bitset;
pub mod compiler;
pub mod dnf;
pub mod error;
pub mod expression;
pub mod graph;
pub mod keylogic;
pub mod minimize;
pub mod pathfinding;
pub mod semilogic;
pub mod simplify;
pub mod solver;
pub mod worker;
pub mod world;

pub use bitset::BitSet;
pub use compiler::{compile, CompileError, CompileOutput, CompileWarning};
pub use dnf::Dnf;
pub use error::TrackerError;
pub use expression::{BooleanExpression, ExpressionParseError, Item, Op};
pub use graph::{AreaGraph, Fact, RequirementGraph};
pub use solver::{override_conflicts, solve, Overrides};
pub use world::RawWorld;
