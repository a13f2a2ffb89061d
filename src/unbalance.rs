use crate::load::BrokerLoad;

/// Score how unevenly load is spread over a set of brokers.
///
/// Each broker contributes `f(load / avg - 1)` where `f(x) = x²` above the
/// mean and `x² / 2` below it, so overloaded brokers are penalized harder
/// than idle ones. Lower is better and 0 is perfectly even.
///
/// Fewer than two brokers, or a set with no load at all, cannot be unbalanced
/// and scores 0. The sum is taken in slice order; callers fix that order
/// before comparing scores.
pub fn unbalance(loads: &[BrokerLoad]) -> f64 {
    if loads.len() < 2 {
        return 0.0;
    }

    let total: f64 = loads.iter().map(|b| b.load).sum();
    let avg = total / loads.len() as f64;
    if avg == 0.0 {
        return 0.0;
    }

    loads
        .iter()
        .map(|b| {
            let rel = b.load / avg - 1.0;
            if rel > 0.0 {
                rel * rel
            } else {
                rel * rel / 2.0
            }
        })
        .sum()
}
