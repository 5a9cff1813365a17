//!
//! Mock models and sequences for testing
//!
use super::model::{Emission, HmmGraph, HmmModel, HmmState, Transition};
use super::sequence::EncodedSequence;
use crate::common::{StateIndex, Symbol};
use crate::prob::{p, Prob};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

///
/// Two state model `A(0)` and `B(1)` over two symbols
///
/// ```text
/// A -> A 0.6   A -> B 0.4
/// B -> A 0.3   B -> B 0.7
/// Begin -> A 0.5   Begin -> B 0.5
/// A -> End 1.0     B -> End 0.0
/// ```
///
/// Every state emits every symbol with p=0.5.
///
pub fn mock_two_state() -> HmmModel {
    HmmModel::from_matrix(
        &[p(0.5), p(0.5)],
        &[vec![p(0.6), p(0.4)], vec![p(0.3), p(0.7)]],
        &[p(1.0), p(0.0)],
        &[vec![p(0.5), p(0.5)], vec![p(0.5), p(0.5)]],
    )
    .unwrap()
}

///
/// length 3 sequence for `mock_two_state`
///
pub fn mock_two_state_sequence() -> EncodedSequence {
    EncodedSequence::new(vec![0, 1, 0])
}

///
/// Random normalized distribution of length `n` where each entry is
/// kept with probability `density` (at least one entry is kept).
///
fn random_dist(rng: &mut Xoshiro256PlusPlus, n: usize, density: f64) -> Vec<Prob> {
    let keep: usize = rng.gen_range(0..n);
    let xs: Vec<f64> = (0..n)
        .map(|i| {
            if i == keep || rng.gen_bool(density) {
                rng.gen_range(0.05..1.0)
            } else {
                0.0
            }
        })
        .collect();
    let total: f64 = xs.iter().sum();
    xs.into_iter().map(|x| p(x / total)).collect()
}

///
/// Random basic model with `n_states` states over `n_symbols` symbols.
///
/// Each transition is defined with probability `density`, so that the
/// predecessor sets are sparse.
///
pub fn mock_random_model(n_states: usize, n_symbols: usize, density: f64, seed: u64) -> HmmModel {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let init = random_dist(&mut rng, n_states, density);
    let trans: Vec<Vec<Prob>> = (0..n_states)
        .map(|_| random_dist(&mut rng, n_states, density))
        .collect();
    let end: Vec<Prob> = (0..n_states)
        .map(|k| {
            if k == 0 || rng.gen_bool(0.5) {
                p(rng.gen_range(0.01..0.2))
            } else {
                Prob::zero()
            }
        })
        .collect();
    let emissions: Vec<Vec<Prob>> = (0..n_states)
        .map(|_| random_dist(&mut rng, n_symbols, 1.0))
        .collect();
    HmmModel::from_matrix(&init, &trans, &end, &emissions).unwrap()
}

///
/// Random non-basic model.
///
/// Odd states have an order-1 context emission, and transitions out of
/// state 0 are position-dependent.
///
pub fn mock_general_model(n_states: usize, n_symbols: usize, seed: u64) -> HmmModel {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut g = HmmGraph::new();
    for k in 0..n_states {
        let emission = if k % 2 == 1 {
            let table: Vec<Prob> = (0..n_symbols)
                .flat_map(|_| random_dist(&mut rng, n_symbols, 1.0))
                .collect();
            Emission::Context {
                order: 1,
                n_symbols,
                table,
                fallback: random_dist(&mut rng, n_symbols, 1.0),
            }
        } else {
            Emission::Symbol(random_dist(&mut rng, n_symbols, 1.0))
        };
        let end = if k == 0 || rng.gen_bool(0.5) {
            p(rng.gen_range(0.01..0.2))
        } else {
            Prob::zero()
        };
        g.add_node(HmmState::new(
            &format!("s{}", k),
            p(1.0 / n_states as f64),
            end,
            emission,
        ));
    }
    for k in 0..n_states {
        let dist = random_dist(&mut rng, n_states, 0.6);
        for (l, t) in dist.into_iter().enumerate() {
            if t.is_zero() {
                continue;
            }
            let transition = if k == 0 {
                Transition::Positional {
                    scores: (0..8).map(|_| p(rng.gen_range(0.05..1.0))).collect(),
                    default: t,
                }
            } else {
                Transition::Fixed(t)
            };
            g.add_edge(StateIndex::new(k), StateIndex::new(l), transition);
        }
    }
    HmmModel::new(g).unwrap()
}

///
/// Random sequence of `length` symbols
///
pub fn mock_random_sequence(length: usize, n_symbols: usize, seed: u64) -> EncodedSequence {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let symbols: Vec<Symbol> = (0..length)
        .map(|_| rng.gen_range(0..n_symbols) as Symbol)
        .collect();
    EncodedSequence::new(symbols)
}
