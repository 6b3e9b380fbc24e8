use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kickstack_evaluator::board_feature::{BoardFeature, FEATURE_COUNT, Weights};
use kickstack_training::genetic::Individual;
use serde::{Deserialize, Serialize};

/// A trained weight vector as stored on disk.
///
/// Weights are keyed by [`BoardFeature::id`] so the file stays readable.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AiModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub fitness: f64,
    /// Mean rows cleared per training game.
    pub score: f64,
    pub placement_weights: BTreeMap<String, f64>,
}

impl AiModel {
    pub fn from_individual(name: &str, trained_at: DateTime<Utc>, individual: &Individual) -> Self {
        Self {
            name: name.to_owned(),
            trained_at,
            fitness: individual.fitness(),
            score: individual.score(),
            placement_weights: BoardFeature::ALL
                .iter()
                .zip(individual.weights())
                .map(|(feature, weight)| (feature.id().to_owned(), *weight))
                .collect(),
        }
    }

    /// Weight vector in feature order. Every feature must be present exactly once.
    pub fn to_weights(&self) -> anyhow::Result<Weights> {
        let mut weights = [None; FEATURE_COUNT];
        for (feature_id, weight) in &self.placement_weights {
            let feature = BoardFeature::from_id(feature_id)
                .ok_or_else(|| anyhow::anyhow!("Feature ID {feature_id} in model not found"))?;
            weights[feature.index()] = Some(*weight);
        }
        let mut result = [0.0; FEATURE_COUNT];
        for (feature, weight) in BoardFeature::ALL.iter().zip(weights) {
            result[feature.index()] = weight.ok_or_else(|| {
                anyhow::anyhow!("Feature ID {} missing from model", feature.id())
            })?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use kickstack_evaluator::placement_evaluator::TRAINED_WEIGHTS;

    use super::*;

    fn model() -> AiModel {
        let mut individual = Individual::new(TRAINED_WEIGHTS);
        individual.set_fitness(12.5);
        individual.set_score(12.0);
        AiModel::from_individual("test", DateTime::UNIX_EPOCH, &individual)
    }

    #[test]
    fn test_weights_survive_json() {
        let model = model();
        let json = serde_json::to_string(&model).unwrap();
        let parsed: AiModel = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.name, "test");
        assert_eq!(parsed.trained_at, model.trained_at);
        let weights = parsed.to_weights().unwrap();
        for (parsed, trained) in weights.iter().zip(TRAINED_WEIGHTS) {
            assert!((parsed - trained).abs() < 1e-12);
        }
        assert_eq!(model.placement_weights["holes"], TRAINED_WEIGHTS[2]);
    }

    #[test]
    fn test_unknown_or_missing_feature() {
        let mut model = model();
        model.placement_weights.remove("pillars");
        assert_eq!(
            model.to_weights().unwrap_err().to_string(),
            "Feature ID pillars missing from model"
        );
        model.placement_weights.insert("wells".to_owned(), 1.0);
        assert_eq!(
            model.to_weights().unwrap_err().to_string(),
            "Feature ID wells in model not found"
        );
    }
}
