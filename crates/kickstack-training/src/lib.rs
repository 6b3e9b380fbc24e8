//! Genetic training of placement weights.
//!
//! A [`genetic::Population`] of weight vectors plays the same set of seeded games; each
//! individual's fitness is its mean rows cleared, with survival breaking ties. A
//! [`genetic::PopulationEvolver`] then builds the next generation by elitism, tournament
//! selection, uniform crossover and Gaussian mutation (see [`weights`]).
//!
//! All randomness comes from a caller-supplied generator, so a seeded run is reproducible.

pub mod genetic;
pub mod weights;
