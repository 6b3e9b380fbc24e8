use std::path::PathBuf;

use chrono::Utc;
use kickstack_engine::{GameSession, PieceSeed};
use kickstack_evaluator::{board_feature::BoardFeature, session_evaluator::SessionEvaluator};
use kickstack_training::{
    genetic::{Population, PopulationEvolver},
    weights,
};
use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::{
    model::AiModel,
    util::{self, Output},
};

const POPULATION_COUNT: usize = 30;
const MAX_GENERATIONS: usize = 50;
const GAMES_PER_INDIVIDUAL: usize = 3;
const PIECE_LIMIT: usize = 500;
const MUTATION_RATE: f64 = 0.05;
const ELITE_COUNT: usize = 2;
const TOURNAMENT_SIZE: usize = 3;
const BOARD_WIDTH: usize = 10;
const BOARD_HEIGHT: usize = 24;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of individuals per generation
    #[arg(long, default_value_t = POPULATION_COUNT)]
    population: usize,
    /// Number of generations to evolve
    #[arg(long, default_value_t = MAX_GENERATIONS)]
    generations: usize,
    /// Games played by every individual per generation
    #[arg(long, default_value_t = GAMES_PER_INDIVIDUAL)]
    games: usize,
    /// Stop each game after this many placed pieces
    #[arg(long, default_value_t = PIECE_LIMIT)]
    piece_limit: usize,
    /// Per-weight mutation probability
    #[arg(long, default_value_t = MUTATION_RATE)]
    mutation_rate: f64,
    /// Individuals carried over unchanged to the next generation
    #[arg(long, default_value_t = ELITE_COUNT)]
    elite: usize,
    /// Individuals drawn per selection tournament
    #[arg(long, default_value_t = TOURNAMENT_SIZE)]
    tournament: usize,
    /// Seed of the training run (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Weight rows (JSON array of 9-element arrays, best first) seeding the first generation
    #[arg(long)]
    initial: Option<PathBuf>,
    /// Output file path for the trained model
    #[arg(long)]
    output: Option<PathBuf>,
    /// Output file path for the final population's weight rows, best first
    #[arg(long)]
    population_output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    validate(arg)?;
    let TrainArg {
        population: population_count,
        generations,
        games,
        piece_limit,
        mutation_rate,
        elite,
        tournament,
        seed,
        initial,
        output,
        population_output,
    } = arg;

    let mut rng = match seed {
        Some(seed) => Pcg32::seed_from_u64(*seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    };
    let mut population = match initial {
        Some(path) => {
            let rows = util::read_weight_rows_file(path)?;
            eprintln!("Seeding from {} weight rows in {}", rows.len(), path.display());
            Population::from_rows(&rows, *population_count, *mutation_rate, &mut rng)
        }
        None => Population::random(*population_count, &mut rng),
    };
    let evolver = PopulationEvolver {
        elite_count: *elite,
        tournament_size: *tournament,
        mutation_rate: *mutation_rate,
    };
    let session_evaluator = SessionEvaluator::new(*piece_limit);

    for generation in 0..*generations {
        eprintln!("Generation #{generation}:");
        let sessions = (0..*games)
            .map(|_| GameSession::new(BOARD_WIDTH, BOARD_HEIGHT, rng.random::<PieceSeed>()))
            .collect::<Result<Vec<_>, _>>()?;
        population.evaluate(&sessions, &session_evaluator);
        report_generation(&population);

        if generation + 1 < *generations {
            population = evolver.evolve(&population, &mut rng);
        }
    }

    eprintln!("Best Individuals:");
    for (i, ind) in population.individuals().iter().take(5).enumerate() {
        eprintln!(
            "  {i:2}: {:?} => {:.3} ({:.1} rows)",
            ind.weights(),
            ind.fitness(),
            ind.score()
        );
    }

    let best = population
        .individuals()
        .first()
        .ok_or_else(|| anyhow::anyhow!("Population is empty"))?;
    let model = AiModel::from_individual("trained", Utc::now(), best);
    Output::save_json(&model, output.clone())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Name: {}", model.name);
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Fitness: {:.3}", model.fitness);
    eprintln!("  Score: {:.3}", model.score);

    if let Some(path) = population_output {
        let rows: Vec<_> = population
            .individuals()
            .iter()
            .map(|ind| ind.weights().to_vec())
            .collect();
        Output::save_json(&rows, Some(path.clone()))?;
        eprintln!("  Population: {}", path.display());
    }

    Ok(())
}

fn validate(arg: &TrainArg) -> anyhow::Result<()> {
    anyhow::ensure!(arg.generations > 0, "At least one generation is required");
    anyhow::ensure!(arg.population > 0, "Population must not be empty");
    anyhow::ensure!(
        weights::is_valid_rate(arg.mutation_rate),
        "Mutation rate must be in [0, 1], got {}",
        arg.mutation_rate
    );
    Ok(())
}

fn report_generation(population: &Population) {
    eprintln!("  Individuals:");
    for (i, ind) in population.individuals().iter().enumerate() {
        eprintln!(
            "  {i:2}: {:.3?} => {:.3} ({:.1} rows)",
            ind.weights(),
            ind.fitness(),
            ind.score()
        );
    }

    if let Some(weight_stats) = population.weight_stats() {
        eprintln!("  Weights Stats:");
        for (feature, stats) in BoardFeature::ALL.iter().zip(&weight_stats) {
            eprintln!(
                "    {:<22} min {:>7.3}  max {:>7.3}  mean {:>7.3}  stddev {:>6.3}",
                feature.name(),
                stats.min,
                stats.max,
                stats.mean,
                stats.std_dev
            );
        }
    }

    if let Some(fitness_stats) = population.fitness_stats() {
        eprintln!("  Fitness Stats:");
        eprintln!("    Min:    {:.3}", fitness_stats.min);
        eprintln!("    Max:    {:.3}", fitness_stats.max);
        eprintln!("    Mean:   {:.3}", fitness_stats.mean);
        eprintln!("    Median: {:.3}", fitness_stats.median);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[command(flatten)]
        arg: TrainArg,
    }

    fn parse(args: &[&str]) -> TrainArg {
        Cli::parse_from(std::iter::once("train").chain(args.iter().copied())).arg
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&parse(&[])).is_ok());
    }

    #[test]
    fn test_rejects_mutation_rate_outside_unit_range() {
        for rate in ["NaN", "1.5", "-0.1"] {
            let flag = format!("--mutation-rate={rate}");
            let err = validate(&parse(&[flag.as_str()])).unwrap_err();
            assert!(
                err.to_string().starts_with("Mutation rate must be in [0, 1]"),
                "{err}"
            );
        }
        assert!(validate(&parse(&["--mutation-rate", "1"])).is_ok());
    }

    #[test]
    fn test_rejects_empty_runs() {
        let err = validate(&parse(&["--generations", "0"])).unwrap_err();
        assert_eq!(err.to_string(), "At least one generation is required");
        let err = validate(&parse(&["--population", "0"])).unwrap_err();
        assert_eq!(err.to_string(), "Population must not be empty");
    }
}
