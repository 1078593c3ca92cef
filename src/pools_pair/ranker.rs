//! Best-pair selection among the candidates of one token pair.
//!
//! Candidates that cannot be quoted, or quote zero, are dropped. With
//! `prefers_direct` set, the best direct candidate wins over any better
//! transitive one: tiny amounts routed through a high-decimals intermediary
//! can truncate to zero on chain.

use crate::pools_pair::PoolsPair;

fn pick(ranked: Vec<(u64, &PoolsPair)>, prefers_direct: bool) -> Option<PoolsPair> {
    let best = if prefers_direct {
        ranked
            .iter()
            .find(|(_, pair)| pair.is_direct())
            .or_else(|| ranked.first())
    } else {
        ranked.first()
    };
    best.map(|(_, pair)| (*pair).clone())
}

/// Highest output for `input_amount`.
pub fn best_for_input_amount(input_amount: u64, candidates: &[PoolsPair], prefers_direct: bool) -> Option<PoolsPair> {
    let mut ranked: Vec<(u64, &PoolsPair)> = candidates
        .iter()
        .filter_map(|pair| {
            let output = pair.output_amount(input_amount).ok()?;
            (output > 0).then_some((output, pair))
        })
        .collect();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    pick(ranked, prefers_direct)
}

/// Lowest input needed to receive `estimated_amount`.
pub fn best_for_estimated_amount(
    estimated_amount: u64,
    candidates: &[PoolsPair],
    prefers_direct: bool,
) -> Option<PoolsPair> {
    let mut ranked: Vec<(u64, &PoolsPair)> = candidates
        .iter()
        .filter_map(|pair| {
            let input = pair.input_amount(estimated_amount).ok()?;
            (input > 0).then_some((input, pair))
        })
        .collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0));
    pick(ranked, prefers_direct)
}
