//! One generation's worth of evaluated controllers.

use crate::evolution::fitness::{Evaluation, FitnessError, FitnessOracle, evaluate_population};
use crate::evolution::selection::SelectionStats;
use crate::network::NetworkController;

/// A fixed-size, fully evaluated generation.
///
/// A `Population` only exists once every member carries a fitness; it is
/// replaced wholesale by the next generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    members: Vec<NetworkController>,
    fitness: Vec<f64>,
}

impl Population {
    /// Evaluate `members` against `oracle` and wrap them as a generation.
    ///
    /// # Errors
    ///
    /// Propagates the first oracle failure; no population is built in that case.
    pub fn evaluate<O: FitnessOracle + ?Sized>(
        mut members: Vec<NetworkController>,
        oracle: &O,
        seed: u64,
        mode: Evaluation,
    ) -> Result<Self, FitnessError> {
        evaluate_population(&mut members, oracle, seed, mode)?;
        Ok(Self::from_evaluated(members))
    }

    /// Wrap members that already carry a fitness.
    ///
    /// Members without a recorded fitness, or with a NaN one, rank below
    /// every evaluated one.
    #[must_use]
    pub fn from_evaluated(members: Vec<NetworkController>) -> Self {
        let fitness = members
            .iter()
            .map(|m| m.fitness().filter(|f| !f.is_nan()).unwrap_or(f64::NEG_INFINITY))
            .collect();
        Self { members, fitness }
    }

    /// Number of individuals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if the population holds nobody.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Individuals in creation order.
    #[must_use]
    pub fn members(&self) -> &[NetworkController] {
        &self.members
    }

    /// Individual at `idx`.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&NetworkController> {
        self.members.get(idx)
    }

    /// Fitness values in member order.
    #[must_use]
    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// The fittest individual; the earliest one wins a tie.
    #[must_use]
    pub fn best(&self) -> Option<&NetworkController> {
        let mut best = 0;
        for (idx, &fit) in self.fitness.iter().enumerate().skip(1) {
            if fit > self.fitness[best] {
                best = idx;
            }
        }
        self.members.get(best)
    }

    /// Members ordered by descending fitness.
    #[must_use]
    pub fn ranked(&self) -> Vec<&NetworkController> {
        let mut ranked: Vec<&NetworkController> = self.members.iter().collect();
        ranked.sort_by(|a, b| a.rank_cmp(b));
        ranked
    }

    /// Fitness summary for reporting.
    #[must_use]
    pub fn stats(&self) -> SelectionStats {
        SelectionStats::from_fitness(&self.fitness)
    }

    /// Give up the members.
    #[must_use]
    pub fn into_members(self) -> Vec<NetworkController> {
        self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkShape;

    fn with_fitness(values: &[f64]) -> Vec<NetworkController> {
        let shape = NetworkShape::new(1, 1, 1).unwrap();
        values
            .iter()
            .map(|&f| {
                let mut c = NetworkController::new(shape).unwrap();
                c.set_fitness(f);
                c
            })
            .collect()
    }

    #[test]
    fn test_best_prefers_first_on_tie() {
        let members = with_fitness(&[1.0, 4.0, 4.0, 2.0]);
        let population = Population::from_evaluated(members);
        let best = population.best().unwrap();
        assert_eq!(best.fitness(), Some(4.0));
        assert!(std::ptr::eq(best, &population.members()[1]));
    }

    #[test]
    fn test_ranked_descending() {
        let population = Population::from_evaluated(with_fitness(&[2.0, 9.0, -1.0, 5.0]));
        let order: Vec<f64> = population
            .ranked()
            .iter()
            .filter_map(|c| c.fitness())
            .collect();
        assert_eq!(order, vec![9.0, 5.0, 2.0, -1.0]);
    }

    #[test]
    fn test_evaluate_records_fitness() {
        let shape = NetworkShape::new(2, 2, 2).unwrap();
        let members = vec![NetworkController::new(shape).unwrap(); 3];
        let oracle = |_: &NetworkController, seed: u64| -> Result<f64, FitnessError> {
            #[allow(clippy::cast_precision_loss)]
            let score = seed as f64;
            Ok(score)
        };
        let population = Population::evaluate(members, &oracle, 8, Evaluation::Sequential).unwrap();
        assert_eq!(population.len(), 3);
        assert_eq!(population.fitness(), &[8.0, 8.0, 8.0]);
        assert!((population.stats().mean_fitness - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_fitness_ranks_last() {
        let population = Population::from_evaluated(with_fitness(&[f64::NAN, -3.0, 1.5]));
        assert_eq!(population.fitness()[0].to_bits(), f64::NEG_INFINITY.to_bits());
        let best = population.best().unwrap();
        assert!(std::ptr::eq(best, &population.members()[2]));
        assert!(population.stats().best_fitness.is_finite());
    }

    #[test]
    fn test_empty_population_has_no_best() {
        let population = Population::from_evaluated(Vec::new());
        assert!(population.is_empty());
        assert!(population.best().is_none());
    }
}
