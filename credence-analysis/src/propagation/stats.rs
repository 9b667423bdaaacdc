//! Column-wise moments of transformed samples.

use statrs::statistics::Statistics;

use credence_core::BeliefVector;

/// Element-wise empirical mean and population variance over `rows`.
///
/// All rows must share one length; callers validate that first.
pub fn column_moments(rows: &[BeliefVector]) -> (BeliefVector, BeliefVector) {
    let dims = rows.first().map_or(0, BeliefVector::len);
    let mut means = Vec::with_capacity(dims);
    let mut variances = Vec::with_capacity(dims);
    let mut column = Vec::with_capacity(rows.len());

    for d in 0..dims {
        column.clear();
        column.extend(rows.iter().map(|row| row[d]));
        means.push(column.iter().mean());
        // Welford accumulation can dip a hair below zero for constant columns.
        variances.push(column.iter().population_variance().max(0.0));
    }

    (BeliefVector::from(means), BeliefVector::from(variances))
}
