//!
//! Definition of the state-graph HMM
//!
//! States are nodes of a `DiGraph` and transitions are its edges.
//! The initial and ending pseudo-states are not nodes: they are stored as
//! per-state `init` / `end` scores.
//!
use super::common::{SequenceContext, StateGraph};
use super::state_set::StateSet;
use crate::common::{Position, StateIndex};
use crate::error::{Result, TrellisError};
use crate::prob::Prob;
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use std::collections::HashSet;
use std::convert::TryFrom;

///
/// Emission distribution of a state
///
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    ///
    /// order-0 emission, indexed by the symbol
    Symbol(Vec<Prob>),
    ///
    /// higher-order emission conditioned on the previous `order` symbols.
    ///
    /// `table` is indexed by `x[i-order], ..., x[i]` read as a number of
    /// base `n_symbols`. Positions `i < order` use `fallback`.
    Context {
        order: usize,
        n_symbols: usize,
        table: Vec<Prob>,
        fallback: Vec<Prob>,
    },
}

impl Emission {
    ///
    /// The number of previous symbols the emission depends on
    ///
    pub fn order(&self) -> usize {
        match self {
            Emission::Symbol(_) => 0,
            Emission::Context { order, .. } => *order,
        }
    }
    ///
    /// Emission score of the symbol at the position of the sequence
    ///
    pub fn score<Q: SequenceContext + ?Sized>(&self, seq: &Q, position: Position) -> Prob {
        match self {
            Emission::Symbol(table) => lookup(table, seq.symbol(position) as usize),
            Emission::Context {
                order,
                n_symbols,
                table,
                fallback,
            } => {
                if position < *order {
                    lookup(fallback, seq.symbol(position) as usize)
                } else {
                    // a symbol out of the alphabet in the window cannot be emitted
                    let index = (position - order..=position).try_fold(0usize, |acc, i| {
                        let x = seq.symbol(i) as usize;
                        if x < *n_symbols {
                            Some(acc * *n_symbols + x)
                        } else {
                            None
                        }
                    });
                    index.map_or_else(Prob::zero, |index| lookup(table, index))
                }
            }
        }
    }
}

/// out of table means the symbol cannot be emitted
fn lookup(table: &[Prob], index: usize) -> Prob {
    table.get(index).copied().unwrap_or_else(Prob::zero)
}

///
/// Transition score of an edge
///
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    ///
    /// same score at every position
    Fixed(Prob),
    ///
    /// score depends on the position; positions out of `scores` use `default`
    Positional { scores: Vec<Prob>, default: Prob },
}

impl Transition {
    pub fn score(&self, position: Position) -> Prob {
        match self {
            Transition::Fixed(p) => *p,
            Transition::Positional { scores, default } => {
                scores.get(position).copied().unwrap_or(*default)
            }
        }
    }
    pub fn is_fixed(&self) -> bool {
        matches!(self, Transition::Fixed(_))
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Transition::Fixed(p) => write!(f, "p={}", p),
            Transition::Positional { scores, default } => {
                write!(f, "positional(n={}, default={})", scores.len(), default)
            }
        }
    }
}

///
/// attribute of HMM state (node)
///
#[derive(Debug, Clone, PartialEq)]
pub struct HmmState {
    pub name: String,
    /// transition score from the initial pseudo-state
    pub init: Prob,
    /// transition score to the ending pseudo-state
    pub end: Prob,
    pub emission: Emission,
}

impl HmmState {
    pub fn new(name: &str, init: Prob, end: Prob, emission: Emission) -> HmmState {
        HmmState {
            name: name.to_string(),
            init,
            end,
            emission,
        }
    }
}

impl std::fmt::Display for HmmState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} (init={} end={} order={})",
            self.name,
            self.init,
            self.end,
            self.emission.order()
        )
    }
}

pub type HmmGraph = DiGraph<HmmState, Transition>;

///
/// HMM over a state graph
///
/// The predecessor sets, the ending set and the basic flag are computed
/// once in `HmmModel::new`.
///
#[derive(Debug, Clone)]
pub struct HmmModel {
    graph: HmmGraph,
    predecessors: Vec<StateSet>,
    ending_from: StateSet,
    is_basic: bool,
}

impl HmmModel {
    ///
    /// Wrap the graph as a model.
    ///
    /// Fails if two edges connect the same pair of states, or if the size of
    /// a context emission table does not match its order.
    ///
    pub fn new(graph: HmmGraph) -> Result<HmmModel> {
        let n = graph.node_count();

        let mut pairs = HashSet::new();
        for edge in graph.edge_references() {
            if !pairs.insert((edge.source(), edge.target())) {
                return Err(TrellisError::InvalidModel(format!(
                    "duplicated transition {} -> {}",
                    edge.source().index(),
                    edge.target().index()
                )));
            }
        }

        for state in graph.node_weights() {
            if let Emission::Context {
                order,
                n_symbols,
                table,
                fallback,
            } = &state.emission
            {
                let expected = u32::try_from(*order)
                    .ok()
                    .and_then(|order| order.checked_add(1))
                    .and_then(|exp| n_symbols.checked_pow(exp))
                    .ok_or_else(|| {
                        TrellisError::InvalidModel(format!(
                            "state {}: context table of order {} over {} symbols is too large",
                            state.name, order, n_symbols
                        ))
                    })?;
                if fallback.len() != *n_symbols {
                    return Err(TrellisError::InvalidModel(format!(
                        "state {}: fallback has {} entries, expected {}",
                        state.name,
                        fallback.len(),
                        n_symbols
                    )));
                }
                if table.len() != expected {
                    return Err(TrellisError::InvalidModel(format!(
                        "state {}: context table has {} entries, expected {}",
                        state.name,
                        table.len(),
                        expected
                    )));
                }
            }
        }

        let predecessors: Vec<StateSet> = graph
            .node_indices()
            .map(|v| {
                StateSet::from_states(
                    n,
                    graph
                        .edges_directed(v, petgraph::Direction::Incoming)
                        .filter(|e| !is_never(e.weight()))
                        .map(|e| e.source()),
                )
            })
            .collect();
        let ending_from = StateSet::from_states(
            n,
            graph
                .node_indices()
                .filter(|&v| !graph[v].end.is_zero()),
        );
        let is_basic = graph.node_weights().all(|s| s.emission.order() == 0)
            && graph.edge_weights().all(|t| t.is_fixed());

        Ok(HmmModel {
            graph,
            predecessors,
            ending_from,
            is_basic,
        })
    }
    ///
    /// Build a fully-connected model from dense matrices.
    ///
    /// * `init[k]`: initial -> k
    /// * `trans[k][l]`: k -> l (log-zero entries create no edge)
    /// * `end[k]`: k -> ending
    /// * `emissions[k][x]`: k emits symbol x
    ///
    pub fn from_matrix(
        init: &[Prob],
        trans: &[Vec<Prob>],
        end: &[Prob],
        emissions: &[Vec<Prob>],
    ) -> Result<HmmModel> {
        let n = init.len();
        if trans.len() != n
            || end.len() != n
            || emissions.len() != n
            || trans.iter().any(|row| row.len() != n)
        {
            return Err(TrellisError::InvalidModel(format!(
                "matrix size mismatch for {} states",
                n
            )));
        }
        let mut graph = HmmGraph::new();
        for k in 0..n {
            graph.add_node(HmmState::new(
                &format!("s{}", k),
                init[k],
                end[k],
                Emission::Symbol(emissions[k].clone()),
            ));
        }
        for k in 0..n {
            for l in 0..n {
                if !trans[k][l].is_zero() {
                    graph.add_edge(
                        StateIndex::new(k),
                        StateIndex::new(l),
                        Transition::Fixed(trans[k][l]),
                    );
                }
            }
        }
        HmmModel::new(graph)
    }
    ///
    /// create iterator of all states
    /// Item of the iterator is `(StateIndex, &HmmState)`.
    ///
    pub fn states(&self) -> impl Iterator<Item = (StateIndex, &HmmState)> + '_ {
        self.graph
            .node_indices()
            .map(move |v| (v, &self.graph[v]))
    }
    ///
    /// Return the number of transitions in the graph
    ///
    pub fn n_edges(&self) -> usize {
        self.graph.edge_count()
    }
}

/// fixed log-zero transition is the same as no edge
fn is_never(t: &Transition) -> bool {
    match t {
        Transition::Fixed(p) => p.is_zero(),
        Transition::Positional { .. } => false,
    }
}

impl StateGraph for HmmModel {
    fn n_states(&self) -> usize {
        self.graph.node_count()
    }
    fn is_basic(&self) -> bool {
        self.is_basic
    }
    fn end_transition(&self, state: StateIndex) -> Prob {
        self.graph[state].end
    }
    fn ending_from(&self) -> &StateSet {
        &self.ending_from
    }
    fn predecessors(&self, state: StateIndex) -> &StateSet {
        &self.predecessors[state.index()]
    }
    fn transition(&self, from: StateIndex, to: StateIndex, position: Position) -> Prob {
        match self.graph.find_edge(from, to) {
            Some(e) => self.graph[e].score(position),
            None => Prob::zero(),
        }
    }
    fn initial_transition(&self, to: StateIndex) -> Prob {
        self.graph[to].init
    }
    fn emission<Q: SequenceContext + ?Sized>(
        &self,
        state: StateIndex,
        seq: &Q,
        position: Position,
    ) -> Prob {
        self.graph[state].emission.score(seq, position)
    }
}

impl std::fmt::Display for HmmModel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", Dot::with_config(&self.graph, &[]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::si;
    use crate::prob::p;
    use crate::trellis::mocks::mock_two_state;
    use crate::trellis::sequence::EncodedSequence;

    #[test]
    fn model_from_matrix() {
        let m = HmmModel::from_matrix(
            &[p(0.5), p(0.5)],
            &[vec![p(0.6), p(0.4)], vec![p(0.0), p(1.0)]],
            &[p(1.0), p(0.0)],
            &[vec![p(0.5), p(0.5)], vec![p(0.9), p(0.1)]],
        )
        .unwrap();
        assert_eq!(m.n_states(), 2);
        assert_eq!(m.n_edges(), 3);
        assert!(m.is_basic());
        // 1 -> 0 is not defined
        assert!(m.transition(si(1), si(0), 0).is_zero());
        assert_eq!(m.transition(si(0), si(1), 5), p(0.4));
        assert_eq!(m.predecessors(si(0)).iter().collect::<Vec<_>>(), vec![si(0)]);
        assert_eq!(
            m.predecessors(si(1)).iter().collect::<Vec<_>>(),
            vec![si(0), si(1)]
        );
        assert_eq!(m.ending_from().iter().collect::<Vec<_>>(), vec![si(0)]);
        let seq = EncodedSequence::new(vec![1, 0]);
        assert_eq!(m.emission(si(1), &seq, 0), p(0.1));
        assert_eq!(m.emission(si(1), &seq, 1), p(0.9));
        println!("{}", m);
    }
    #[test]
    fn model_matrix_size_mismatch() {
        let r = HmmModel::from_matrix(
            &[p(0.5), p(0.5)],
            &[vec![p(0.6), p(0.4)]],
            &[p(1.0), p(0.0)],
            &[vec![p(0.5)], vec![p(0.9)]],
        );
        assert!(matches!(r, Err(TrellisError::InvalidModel(_))));
    }
    #[test]
    fn model_duplicated_edge() {
        let mut g = HmmGraph::new();
        let a = g.add_node(HmmState::new("a", p(1.0), p(1.0), Emission::Symbol(vec![p(1.0)])));
        g.add_edge(a, a, Transition::Fixed(p(0.5)));
        g.add_edge(a, a, Transition::Fixed(p(0.5)));
        assert!(matches!(HmmModel::new(g), Err(TrellisError::InvalidModel(_))));
    }
    #[test]
    fn model_context_emission() {
        // order-1 emission over 2 symbols: table[prev * 2 + cur]
        let e = Emission::Context {
            order: 1,
            n_symbols: 2,
            table: vec![p(0.9), p(0.1), p(0.2), p(0.8)],
            fallback: vec![p(0.5), p(0.5)],
        };
        let seq = EncodedSequence::new(vec![1, 1, 0]);
        assert_eq!(e.score(&seq, 0), p(0.5));
        assert_eq!(e.score(&seq, 1), p(0.8));
        assert_eq!(e.score(&seq, 2), p(0.2));

        let mut g = HmmGraph::new();
        let a = g.add_node(HmmState::new("a", p(1.0), p(1.0), e));
        g.add_edge(a, a, Transition::Fixed(p(1.0)));
        let m = HmmModel::new(g).unwrap();
        assert!(!m.is_basic());

        let mut g = HmmGraph::new();
        g.add_node(HmmState::new(
            "bad",
            p(1.0),
            p(1.0),
            Emission::Context {
                order: 2,
                n_symbols: 2,
                table: vec![p(0.5); 4],
                fallback: vec![p(0.5); 2],
            },
        ));
        assert!(HmmModel::new(g).is_err());
    }
    #[test]
    fn context_emission_out_of_alphabet() {
        let e = Emission::Context {
            order: 1,
            n_symbols: 2,
            table: vec![p(0.9), p(0.1), p(0.2), p(0.8)],
            fallback: vec![p(0.5), p(0.5)],
        };
        let s = Emission::Symbol(vec![p(0.5), p(0.5)]);
        let seq = EncodedSequence::new(vec![0, 3, 1, 1]);
        assert!(s.score(&seq, 1).is_zero());
        // (0, 3) would otherwise be read as the entry of (1, 1)
        assert!(e.score(&seq, 1).is_zero());
        // 3 is in the window of position 2 as the previous symbol
        assert!(e.score(&seq, 2).is_zero());
        assert_eq!(e.score(&seq, 3), p(0.8));
        let seq = EncodedSequence::new(vec![3, 0]);
        assert!(e.score(&seq, 0).is_zero());
    }
    #[test]
    fn context_emission_too_large_order() {
        let mut g = HmmGraph::new();
        g.add_node(HmmState::new(
            "huge",
            p(1.0),
            p(1.0),
            Emission::Context {
                order: 64,
                n_symbols: 4,
                table: vec![p(0.5); 4],
                fallback: vec![p(0.5); 4],
            },
        ));
        assert!(matches!(HmmModel::new(g), Err(TrellisError::InvalidModel(_))));

        let mut g = HmmGraph::new();
        g.add_node(HmmState::new(
            "short fallback",
            p(1.0),
            p(1.0),
            Emission::Context {
                order: 1,
                n_symbols: 2,
                table: vec![p(0.5); 4],
                fallback: vec![p(1.0)],
            },
        ));
        assert!(matches!(HmmModel::new(g), Err(TrellisError::InvalidModel(_))));
    }
    #[test]
    fn model_states() {
        let m = mock_two_state();
        let names: Vec<_> = m.states().map(|(v, s)| (v, s.name.clone())).collect();
        assert_eq!(names, vec![(si(0), "s0".to_string()), (si(1), "s1".to_string())]);
    }
    #[test]
    fn model_positional_transition() {
        let t = Transition::Positional {
            scores: vec![p(0.1), p(0.2)],
            default: p(0.3),
        };
        assert_eq!(t.score(0), p(0.1));
        assert_eq!(t.score(1), p(0.2));
        assert_eq!(t.score(100), p(0.3));
        assert!(!t.is_fixed());
    }
}
