//! Genetic algorithm evolving placement weights.
//!
//! One generation:
//!
//! 1. **Evaluate** - every individual plays the same game sessions ([`Population::evaluate`])
//! 2. **Elites** - the best `elite_count` individuals are copied unchanged
//! 3. **Tournament selection** - each parent is the fittest of `tournament_size` random picks
//! 4. **Uniform crossover** - each gene comes from either parent with equal probability
//! 5. **Gaussian mutation** - each gene gets `N(0, 1)` noise with probability `mutation_rate`
//!
//! Fitness is the mean number of rows cleared per game plus one hundredth of the mean number
//! of placed pieces, so among equally productive individuals the one that survives longer
//! ranks first. The score is the mean rows cleared alone.
//!
//! Evaluation runs one thread per individual; the games themselves are deterministic, so the
//! result does not depend on scheduling.

use std::{cmp::Ordering, thread};

use kickstack_engine::GameSession;
use kickstack_evaluator::{
    board_feature::{FEATURE_COUNT, Weights},
    placement_evaluator::WeightedPlacementEvaluator,
    session_evaluator::{SessionEvaluator, SessionSummary},
    turn_evaluator::{Bot, TurnEvaluator},
};
use kickstack_stats::descriptive::DescriptiveStats;
use rand::{Rng, seq::IndexedRandom};

use crate::weights;

/// Placed pieces worth one cleared row in the fitness.
const PIECES_PER_ROW: f64 = 100.0;

/// A candidate weight vector with the results of its last evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    weights: Weights,
    fitness: f64,
    score: f64,
}

impl Individual {
    /// Creates an unevaluated individual.
    #[must_use]
    pub const fn new(weights: Weights) -> Self {
        Self {
            weights,
            fitness: 0.0,
            score: 0.0,
        }
    }

    /// Creates an individual with every weight uniform in `[-1, 1]`.
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(weights::random(rng))
    }

    #[must_use]
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Mean rows cleared per game in the last evaluation.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    /// Creates an unevaluated child by uniform crossover with `other`.
    pub fn crossover<R>(&self, other: &Self, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(weights::crossover(&self.weights, &other.weights, rng))
    }

    /// See [`weights::mutate`]; `rate` must be in `[0, 1]`.
    pub fn mutate<R>(&mut self, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        weights::mutate(&mut self.weights, rate, rng);
    }

    fn record(&mut self, summary: SessionSummary) {
        self.score = summary.mean_rows_cleared;
        self.fitness = summary.mean_rows_cleared + summary.mean_pieces / PIECES_PER_ROW;
    }
}

/// A population of individuals, kept best-first after evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Creates `count` random individuals.
    pub fn random<R>(count: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let individuals = (0..count).map(|_| Individual::random(rng)).collect();
        Self { individuals }
    }

    /// Seeds a population of `count` individuals from previously trained weight rows.
    ///
    /// Rows fill the first slots in order; rows beyond `count` are ignored. Once the rows run
    /// out, each remaining slot is a mutated crossover child of two different seeded
    /// individuals picked at random. With a single row that row is its own partner, and with
    /// no rows the population is random. `mutation_rate` must be in `[0, 1]`.
    pub fn from_rows<R>(rows: &[Weights], count: usize, mutation_rate: f64, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        if rows.is_empty() {
            return Self::random(count, rng);
        }
        let seeded = rows.len().min(count);
        let mut individuals: Vec<_> = rows[..seeded].iter().copied().map(Individual::new).collect();
        while individuals.len() < count {
            let i = rng.random_range(0..seeded);
            let mut j = rng.random_range(0..seeded);
            while seeded > 1 && j == i {
                j = rng.random_range(0..seeded);
            }
            let mut child = individuals[i].crossover(&individuals[j], rng);
            child.mutate(mutation_rate, rng);
            individuals.push(child);
        }
        Self { individuals }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    #[must_use]
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    pub fn replace_individuals(&mut self, individuals: Vec<Individual>) {
        self.individuals = individuals;
    }

    /// The individual with the highest fitness, if any.
    #[must_use]
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.iter().max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    /// Plays every session with every individual's weights and records fitness and score.
    ///
    /// Individuals are then sorted by fitness, best first.
    pub fn evaluate(&mut self, sessions: &[GameSession], session_evaluator: &SessionEvaluator) {
        thread::scope(|s| {
            for individual in &mut self.individuals {
                s.spawn(move || {
                    let evaluator = WeightedPlacementEvaluator::new(individual.weights);
                    let mut bot = Bot::new(TurnEvaluator::new(Box::new(evaluator)));
                    individual.record(session_evaluator.play_sessions(sessions, &mut bot));
                });
            }
        });
        self.individuals.sort_by(by_fitness_descending);
    }

    /// Spread of each weight across the population, in feature order.
    ///
    /// `None` for an empty population.
    #[must_use]
    pub fn weight_stats(&self) -> Option<[DescriptiveStats; FEATURE_COUNT]> {
        let stats: Vec<_> = (0..FEATURE_COUNT)
            .map(|i| DescriptiveStats::new(self.individuals.iter().map(|ind| ind.weights[i])))
            .collect::<Option<_>>()?;
        stats.try_into().ok()
    }

    /// Spread of fitness across the population, `None` if it is empty.
    #[must_use]
    pub fn fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.individuals.iter().map(|ind| ind.fitness))
    }
}

fn by_fitness_descending(a: &Individual, b: &Individual) -> Ordering {
    b.fitness.total_cmp(&a.fitness)
}

/// Parameters for building one generation from the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationEvolver {
    /// Number of top individuals copied unchanged.
    pub elite_count: usize,
    /// Individuals drawn per tournament (larger = stronger selection pressure).
    pub tournament_size: usize,
    /// Per-gene mutation probability, in `[0, 1]`.
    pub mutation_rate: f64,
}

impl Default for PopulationEvolver {
    fn default() -> Self {
        Self {
            elite_count: 2,
            tournament_size: 3,
            mutation_rate: 0.05,
        }
    }
}

impl PopulationEvolver {
    /// Builds the next generation, the same size as `population`.
    ///
    /// Elites are the fittest individuals whatever the order of `population`.
    pub fn evolve<R>(&self, population: &Population, rng: &mut R) -> Population
    where
        R: Rng + ?Sized,
    {
        let mut ranked = population.individuals.clone();
        ranked.sort_by(by_fitness_descending);

        let mut next = Vec::with_capacity(ranked.len());
        next.extend(ranked.iter().take(self.elite_count).cloned());
        while next.len() < ranked.len() {
            let (Some(p1), Some(p2)) = (
                tournament_select(&ranked, self.tournament_size, rng),
                tournament_select(&ranked, self.tournament_size, rng),
            ) else {
                break;
            };
            let mut child = p1.crossover(p2, rng);
            child.mutate(self.mutation_rate, rng);
            next.push(child);
        }
        Population { individuals: next }
    }
}

/// Picks the fittest of `tournament_size` distinct random individuals.
fn tournament_select<'a, R>(
    population: &'a [Individual],
    tournament_size: usize,
    rng: &mut R,
) -> Option<&'a Individual>
where
    R: Rng + ?Sized,
{
    population
        .choose_multiple(rng, tournament_size.max(1))
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
}
