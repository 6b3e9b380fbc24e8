//! Summary statistics for training reports.
//!
//! Training prints the spread of every weight and of the fitness across a population
//! after each generation; [`descriptive::DescriptiveStats`] computes those summaries.

pub mod descriptive;
