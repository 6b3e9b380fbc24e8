use std::{
    fs::File,
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use kickstack_evaluator::board_feature::{FEATURE_COUNT, Weights};
use kickstack_training::weights;

use crate::model::AiModel;

/// Destination of a JSON document: a file when a path is given, stdout otherwise.
#[derive(Debug)]
pub enum Output {
    Stdout(StdoutLock<'static>),
    File(BufWriter<File>, PathBuf),
}

impl Output {
    /// Writes `value` as pretty-printed JSON followed by a newline.
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = match output_path {
            Some(path) => {
                let file = File::create(&path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                Output::File(BufWriter::new(file), path)
            }
            None => Output::Stdout(io::stdout().lock()),
        };
        output
            .write_json(value)
            .with_context(|| format!("Failed to write JSON to {}", output.target()))
    }

    fn target(&self) -> String {
        match self {
            Output::Stdout(_) => "stdout".to_owned(),
            Output::File(_, path) => path.display().to_string(),
        }
    }

    fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let writer: &mut dyn io::Write = match self {
            Output::Stdout(writer) => writer,
            Output::File(writer, _) => writer,
        };
        serde_json::to_writer_pretty(&mut *writer, value)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Reads an AI model from a JSON file.
pub fn read_ai_model_file<P>(path: P) -> anyhow::Result<AiModel>
where
    P: AsRef<Path>,
{
    read_json_file("AI model", path)
}

/// Reads weight rows (a JSON array of arrays of numbers), best first.
pub fn read_weight_rows_file<P>(path: P) -> anyhow::Result<Vec<Weights>>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let rows: Vec<Vec<f64>> = read_json_file("weight rows", path)?;
    rows_to_weights(&rows).with_context(|| format!("Invalid weight rows in {}", path.display()))
}

pub fn rows_to_weights(rows: &[Vec<f64>]) -> anyhow::Result<Vec<Weights>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            weights::from_slice(row).ok_or_else(|| {
                anyhow::anyhow!(
                    "Row {i} has {} weights, expected {FEATURE_COUNT}",
                    row.len()
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_to_weights_checks_arity() {
        let rows = vec![vec![1.0; FEATURE_COUNT], vec![2.0; FEATURE_COUNT]];
        let weights = rows_to_weights(&rows).unwrap();
        assert_eq!(weights, [[1.0; FEATURE_COUNT], [2.0; FEATURE_COUNT]]);

        let rows = vec![vec![1.0; FEATURE_COUNT], vec![2.0; 3]];
        let err = rows_to_weights(&rows).unwrap_err();
        assert_eq!(err.to_string(), "Row 1 has 3 weights, expected 9");
    }

    #[test]
    fn test_save_json_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("kickstack-rows-{}.json", std::process::id()));
        let rows = vec![vec![0.5; FEATURE_COUNT]];
        Output::save_json(&rows, Some(path.clone())).unwrap();

        let weights = read_weight_rows_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(weights, [[0.5; FEATURE_COUNT]]);
    }
}
