//! Precedence graph and cycle detection.
//!
//! Jobs are stored in an arena (`Vec`) and addressed by index; edges are
//! adjacency lists of indices. Only edges whose endpoints both resolve are
//! added, since dangling endpoints are reported by the reference check.
//!
//! # Algorithm
//! Depth-first search with an explicit stack and three-colour marking
//! (unvisited / in progress / done). A back-edge into an in-progress node
//! closes a cycle; the cycle is the stack segment from that node to the top.
//! Finished nodes are never re-entered, so the traversal is O(V + E) and
//! never recurses.
//!
//! Each back-edge yields one cycle, so independent cycles are all reported
//! but overlapping ones may not be: with `A -> B -> A` and `A -> C -> B`,
//! `B` is finished before `C` reaches it and only `[A, B]` comes out.
//! Enumerating every elementary cycle (Johnson's algorithm) can be
//! exponential in the number of cycles and is not attempted.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.3-22.4

use std::collections::HashMap;
use tracing::debug;

use super::references::EntityIndex;
use super::report::{Violation, ViolationKind};
use crate::models::Instance;

/// An outgoing or incoming edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arc {
    /// Index of the job at the other end.
    pub node: usize,
    /// Minimum lag carried by the edge.
    pub lag: u64,
}

/// Directed graph over job identifiers.
#[derive(Debug, Clone)]
pub struct PrecedenceGraph<'a> {
    nodes: Vec<&'a str>,
    index: HashMap<&'a str, usize>,
    successors: Vec<Vec<Arc>>,
    predecessors: Vec<Vec<Arc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Result of a full traversal.
#[derive(Debug, Clone, Default)]
pub struct Traversal {
    /// Each cycle as a node sequence, first element is the re-entered node.
    pub cycles: Vec<Vec<usize>>,
    /// Topological order, present only if the graph is acyclic.
    pub order: Option<Vec<usize>>,
}

impl<'a> PrecedenceGraph<'a> {
    /// Builds the graph. Self-loops are returned as violations and left out.
    pub fn build(instance: &'a Instance, entities: &EntityIndex<'_>) -> (Self, Vec<Violation>) {
        let mut nodes = Vec::with_capacity(instance.jobs.len());
        let mut index = HashMap::with_capacity(instance.jobs.len());
        for job in &instance.jobs {
            index.entry(job.id.as_str()).or_insert_with(|| {
                nodes.push(job.id.as_str());
                nodes.len() - 1
            });
        }

        let mut successors = vec![Vec::new(); nodes.len()];
        let mut predecessors = vec![Vec::new(); nodes.len()];
        let mut self_loops = Vec::new();

        for (i, p) in instance.precedences.iter().enumerate() {
            if !entities.has_job(&p.predecessor) || !entities.has_job(&p.successor) {
                continue;
            }
            if p.is_self_loop() {
                self_loops.push(
                    Violation::new(
                        ViolationKind::SelfLoop,
                        [p.predecessor.as_str()],
                        format!("job '{}' is declared as its own predecessor", p.predecessor),
                    )
                    .with_field(format!("precedences[{i}]")),
                );
                continue;
            }
            let (Some(&from), Some(&to)) = (
                index.get(p.predecessor.as_str()),
                index.get(p.successor.as_str()),
            ) else {
                continue;
            };
            successors[from].push(Arc { node: to, lag: p.lag });
            predecessors[to].push(Arc {
                node: from,
                lag: p.lag,
            });
        }

        (
            Self {
                nodes,
                index,
                successors,
                predecessors,
            },
            self_loops,
        )
    }

    /// Number of jobs.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    /// Job identifier of a node.
    pub fn id(&self, node: usize) -> &'a str {
        self.nodes[node]
    }

    /// Node of a job identifier.
    pub fn node(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Outgoing edges.
    pub fn successors(&self, node: usize) -> &[Arc] {
        &self.successors[node]
    }

    /// Incoming edges.
    pub fn predecessors(&self, node: usize) -> &[Arc] {
        &self.predecessors[node]
    }

    /// Runs the DFS over every node, collecting cycles and, if there are
    /// none, a topological order.
    pub fn traverse(&self) -> Traversal {
        let n = self.nodes.len();
        let mut mark = vec![Mark::Unvisited; n];
        let mut depth = vec![0usize; n];
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut finished = Vec::with_capacity(n);
        let mut cycles = Vec::new();

        for root in 0..n {
            if mark[root] != Mark::Unvisited {
                continue;
            }
            mark[root] = Mark::InProgress;
            depth[root] = 0;
            stack.push((root, 0));

            while let Some(top) = stack.last_mut() {
                let (node, next) = *top;
                let Some(arc) = self.successors[node].get(next) else {
                    mark[node] = Mark::Done;
                    finished.push(node);
                    stack.pop();
                    continue;
                };
                top.1 += 1;

                match mark[arc.node] {
                    Mark::Unvisited => {
                        mark[arc.node] = Mark::InProgress;
                        depth[arc.node] = stack.len();
                        stack.push((arc.node, 0));
                    }
                    Mark::InProgress => {
                        let cycle = stack[depth[arc.node]..].iter().map(|&(v, _)| v).collect();
                        cycles.push(cycle);
                    }
                    Mark::Done => {}
                }
            }
        }

        let order = cycles.is_empty().then(|| {
            finished.reverse();
            finished
        });
        Traversal { cycles, order }
    }

    /// Topological order, or `None` if the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<usize>> {
        self.traverse().order
    }
}

/// Graph phase output, shared with the feasibility checks.
#[derive(Debug, Clone)]
pub struct GraphAnalysis<'a> {
    /// The graph itself.
    pub graph: PrecedenceGraph<'a>,
    /// Topological order when the graph is acyclic.
    pub order: Option<Vec<usize>>,
    /// Self-loop and cycle violations.
    pub violations: Vec<Violation>,
}

impl GraphAnalysis<'_> {
    /// Whether the graph was confirmed acyclic.
    pub fn is_acyclic(&self) -> bool {
        self.order.is_some()
    }
}

/// Builds the precedence graph and reports self-loops and cycles.
pub fn analyze<'a>(instance: &'a Instance, entities: &EntityIndex<'_>) -> GraphAnalysis<'a> {
    let (graph, mut violations) = PrecedenceGraph::build(instance, entities);
    let Traversal { cycles, order } = graph.traverse();

    for cycle in &cycles {
        let ids: Vec<&str> = cycle.iter().map(|&v| graph.id(v)).collect();
        let mut walk = ids.join(" -> ");
        walk.push_str(" -> ");
        walk.push_str(ids[0]);
        violations.push(Violation::new(
            ViolationKind::CyclicDependency,
            ids.iter().copied(),
            format!("precedence cycle of length {}: {walk}", ids.len()),
        ));
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        cycles = cycles.len(),
        "precedence graph analyzed"
    );
    GraphAnalysis {
        graph,
        order,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Job, Precedence};

    fn instance(jobs: &[&str], edges: &[(&str, &str)]) -> Instance {
        let mut inst = Instance::new();
        for j in jobs {
            inst = inst.with_job(Job::new(*j));
        }
        for (a, b) in edges {
            inst = inst.with_precedence(Precedence::new(*a, *b));
        }
        inst
    }

    fn cycles_of(inst: &Instance) -> Vec<Vec<String>> {
        let index = EntityIndex::build(inst);
        analyze(inst, &index)
            .violations
            .into_iter()
            .filter(|v| v.kind == ViolationKind::CyclicDependency)
            .map(|v| v.entities)
            .collect()
    }

    #[test]
    fn test_chain_is_acyclic() {
        let inst = instance(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let index = EntityIndex::build(&inst);
        let analysis = analyze(&inst, &index);

        assert!(analysis.is_acyclic());
        assert!(analysis.violations.is_empty());
        let order: Vec<&str> = analysis
            .order
            .unwrap()
            .into_iter()
            .map(|v| analysis.graph.id(v))
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_topological_order_respects_edges() {
        let inst = instance(
            &["D", "C", "B", "A"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        let index = EntityIndex::build(&inst);
        let (graph, _) = PrecedenceGraph::build(&inst, &index);
        let order = graph.topological_order().unwrap();

        let pos: HashMap<usize, usize> = order.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        for v in 0..graph.node_count() {
            for arc in graph.successors(v) {
                assert!(pos[&v] < pos[&arc.node]);
            }
        }
    }

    #[test]
    fn test_two_cycle() {
        let inst = instance(&["J1", "J2"], &[("J1", "J2"), ("J2", "J1")]);
        assert_eq!(cycles_of(&inst), vec![vec!["J1", "J2"]]);
    }

    #[test]
    fn test_cycle_length_k() {
        let inst = instance(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "B"), ("D", "E")],
        );
        assert_eq!(cycles_of(&inst), vec![vec!["B", "C", "D"]]);
    }

    #[test]
    fn test_disjoint_cycles_reported_separately() {
        let inst = instance(
            &["A", "B", "C", "D", "E"],
            &[("A", "B"), ("B", "A"), ("C", "D"), ("D", "E"), ("E", "C")],
        );
        assert_eq!(
            cycles_of(&inst),
            vec![vec!["A", "B"], vec!["C", "D", "E"]]
        );
    }

    #[test]
    fn test_overlapping_cycle_through_finished_node_not_repeated() {
        let inst = instance(
            &["A", "B", "C"],
            &[("A", "B"), ("B", "A"), ("A", "C"), ("C", "B")],
        );
        assert_eq!(cycles_of(&inst), vec![vec!["A", "B"]]);
    }

    #[test]
    fn test_self_loop_excluded_from_graph() {
        let inst = instance(&["A", "B"], &[("A", "A"), ("A", "B")]);
        let index = EntityIndex::build(&inst);
        let analysis = analyze(&inst, &index);

        assert!(analysis.is_acyclic());
        assert_eq!(analysis.violations.len(), 1);
        assert_eq!(analysis.violations[0].kind, ViolationKind::SelfLoop);
        assert_eq!(analysis.violations[0].entities, vec!["A"]);
        assert_eq!(analysis.graph.edge_count(), 1);
    }

    #[test]
    fn test_dangling_edges_skipped() {
        let inst = instance(&["A"], &[("A", "Z"), ("Z", "Z")]);
        let index = EntityIndex::build(&inst);
        let analysis = analyze(&inst, &index);

        assert_eq!(analysis.graph.edge_count(), 0);
        assert!(analysis.violations.is_empty());
    }

    #[test]
    fn test_duplicate_job_ids_share_node() {
        let inst = instance(&["A", "B", "A"], &[("A", "B")]);
        let index = EntityIndex::build(&inst);
        let (graph, _) = PrecedenceGraph::build(&inst, &index);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node("A"), Some(0));
        assert_eq!(graph.predecessors(1), &[Arc { node: 0, lag: 0 }]);
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let n = 100_000;
        let ids: Vec<String> = (0..n).map(|i| format!("J{i}")).collect();
        let mut inst = Instance::new();
        for id in &ids {
            inst = inst.with_job(Job::new(id.clone()));
        }
        for w in ids.windows(2) {
            inst = inst.with_precedence(Precedence::new(w[0].clone(), w[1].clone()));
        }
        inst = inst.with_precedence(Precedence::new(ids[n - 1].clone(), ids[0].clone()));

        let cycles = cycles_of(&inst);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), n);
    }
}
