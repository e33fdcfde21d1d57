//! Background analysis worker
//!
//! Minimizing an explanation for a fact can take a while on deep graphs, so
//! queries run on a dedicated thread owning its own copy of the requirement
//! graph. The thread pre-simplifies its copy on startup, then answers
//! analyze requests over a channel. Ground expansions computed along the way
//! replace the corresponding requirements in the private copy, so repeated
//! queries against related facts get cheaper over time.
//!
//! The copy never leaves the thread; cancellation is cooperative, checked
//! between units of work.

use crate::expression::BooleanExpression;
use crate::graph::{Fact, RequirementGraph};
use crate::minimize::{compute_ground_expression, find_new_subgoals, minimize};
use crate::simplify::{remove_duplicates, shallow_simplify, unify_requirements};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Upper bound on ground expansions learned per analyze request. Keeps the
/// first query for a deep fact from expanding the whole graph at once while
/// still guaranteeing some shared progress per request.
const MAX_LEARNED_PER_REQUEST: usize = 5;

/// Shared flag for cooperatively stopping worker computation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

enum Request {
    Analyze(Fact),
}

/// A minimized explanation of a fact in terms of opaque facts only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub fact: Fact,
    pub expression: BooleanExpression,
}

/// Handle to the analysis thread. Dropping it shuts the thread down.
pub struct AnalysisWorker {
    /// `None` only during shutdown; closing the channel ends the loop.
    requests: Option<Sender<Request>>,
    responses: Receiver<Analysis>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
}

impl AnalysisWorker {
    /// Spawns the worker with its own copy of the graph. The copy uses the
    /// explanation opaque set, so checks and virtual locations expand into
    /// their requirements, and is pre-simplified before the first request
    /// is served.
    pub fn spawn(graph: &RequirementGraph) -> AnalysisWorker {
        let cancel = CancelToken::new();
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();
        let thread_cancel = cancel.clone();
        let mut graph = graph.clone();
        graph.opaque = graph.explanation_opaque();
        let handle = std::thread::spawn(move || {
            worker_loop(&mut graph, request_rx, response_tx, &thread_cancel);
        });
        AnalysisWorker {
            requests: Some(request_tx),
            responses: response_rx,
            cancel,
            handle: Some(handle),
        }
    }

    /// Queues an analyze request. The answer arrives via [`Self::recv`];
    /// answers come back in request order.
    pub fn analyze(&self, fact: Fact) {
        // A send failure means the thread is gone; recv will report that.
        if let Some(requests) = &self.requests {
            let _ = requests.send(Request::Analyze(fact));
        }
    }

    /// Blocks until the next answer, or `None` once the worker has stopped.
    pub fn recv(&self) -> Option<Analysis> {
        self.responses.recv().ok()
    }

    /// The token the worker checks between units of work.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(
    graph: &mut RequirementGraph,
    requests: Receiver<Request>,
    responses: Sender<Analysis>,
    cancel: &CancelToken,
) {
    presimplify(graph, cancel);
    let mut learned: HashSet<Fact> = HashSet::new();

    while let Ok(request) = requests.recv() {
        if cancel.is_cancelled() {
            break;
        }
        match request {
            Request::Analyze(fact) => {
                let expression = analyze(graph, &mut learned, fact, cancel);
                if responses.send(Analysis { fact, expression }).is_err() {
                    break;
                }
            }
        }
    }
}

/// The load-time simplification loop, stopping early when cancelled.
fn presimplify(graph: &mut RequirementGraph, cancel: &CancelToken) {
    loop {
        if cancel.is_cancelled() {
            return;
        }
        remove_duplicates(&mut graph.requirements);
        while !cancel.is_cancelled() && shallow_simplify(&graph.opaque, &mut graph.requirements) {
            remove_duplicates(&mut graph.requirements);
        }
        if cancel.is_cancelled() || !unify_requirements(&graph.opaque, &mut graph.requirements) {
            return;
        }
    }
}

fn analyze(
    graph: &mut RequirementGraph,
    learned: &mut HashSet<Fact>,
    fact: Fact,
    cancel: &CancelToken,
) -> BooleanExpression {
    // Ground a few subgoals on the way to the target first. Without this,
    // cheap intermediate facts get expanded inline over and over while the
    // expensive shared ones never make it into the cache.
    let mut num_learned = 0;
    while num_learned < MAX_LEARNED_PER_REQUEST && !cancel.is_cancelled() {
        let Some(path) = find_new_subgoals(&graph.opaque, &graph.requirements, fact, learned)
        else {
            break;
        };
        let learned_before = num_learned;
        for bit in path.iter() {
            if !graph.opaque.test(bit) && !learned.contains(&bit) {
                let ground = compute_ground_expression(&graph.opaque, &graph.requirements, bit);
                graph.requirements[bit] = ground;
                learned.insert(bit);
                num_learned += 1;
            }
        }
        if num_learned == learned_before {
            break;
        }
    }

    let ground = compute_ground_expression(&graph.opaque, &graph.requirements, fact);
    graph.requirements[fact] = ground.clone();
    learned.insert(fact);
    minimize(graph, &ground)
}
