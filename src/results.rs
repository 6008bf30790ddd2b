use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::AnalysisError;
use crate::stats;

const MICROS_PER_MILLI: f64 = 1000.0;

/// One line of a result file: a two-word benchmark label, a batch size, and
/// the raw latency samples in microseconds. Batch size 0 is the unbatched
/// baseline reading.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRow {
    pub algorithm: String,
    pub batch_size: u64,
    pub samples: Vec<f64>,
}

impl ResultRow {
    /// Parses `<word> <word> <batch_size> <sample>+`. The algorithm name is
    /// always the first two tokens joined with a single space. Anything
    /// malformed is fatal; rows are never skipped.
    fn parse(file: &str, number: usize, line: &str) -> Result<ResultRow, AnalysisError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(AnalysisError::ShortLine {
                file: file.to_string(),
                line: number,
                fields: tokens.len(),
            });
        }

        let algorithm = format!("{} {}", tokens[0], tokens[1]);

        let batch_size = tokens[2]
            .parse()
            .map_err(|_| AnalysisError::BadBatchSize {
                file: file.to_string(),
                line: number,
                token: tokens[2].to_string(),
            })?;

        let mut samples = Vec::with_capacity(tokens.len() - 3);
        for token in &tokens[3..] {
            let value: f64 = token.parse().map_err(|_| AnalysisError::BadSample {
                file: file.to_string(),
                line: number,
                token: token.to_string(),
            })?;
            if !value.is_finite() {
                return Err(AnalysisError::BadSample {
                    file: file.to_string(),
                    line: number,
                    token: token.to_string(),
                });
            }
            samples.push(value);
        }

        Ok(ResultRow {
            algorithm,
            batch_size,
            samples,
        })
    }
}

/// Aggregated measurements for one result file, keyed by algorithm and then
/// by batch size. Batch sizes are held in ascending numeric order so that
/// "first N points" slicing never depends on file order.
pub struct ResultTable<V> {
    file: String,
    algorithms: HashMap<String, BTreeMap<u64, V>>,
}

impl<V> ResultTable<V> {
    fn load<R: BufRead>(
        file: &str,
        reader: R,
        aggregate: fn(&ResultRow) -> Result<V, AnalysisError>,
    ) -> Result<ResultTable<V>, AnalysisError> {
        let mut algorithms: HashMap<String, BTreeMap<u64, V>> = HashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| AnalysisError::Read {
                file: file.to_string(),
                source: e,
            })?;
            let row = ResultRow::parse(file, i + 1, &line)?;
            let value = aggregate(&row)?;
            // duplicate (algorithm, batch_size) keys: last occurrence wins
            algorithms
                .entry(row.algorithm)
                .or_insert_with(BTreeMap::new)
                .insert(row.batch_size, value);
        }

        Ok(ResultTable {
            file: file.to_string(),
            algorithms,
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.algorithms.keys().map(String::as_str)
    }

    pub fn series(&self, algorithm: &str) -> Result<&BTreeMap<u64, V>, AnalysisError> {
        self.algorithms
            .get(algorithm)
            .ok_or_else(|| AnalysisError::MissingAlgorithm {
                file: self.file.clone(),
                algorithm: algorithm.to_string(),
            })
    }

    pub fn value(&self, algorithm: &str, batch_size: u64) -> Result<&V, AnalysisError> {
        self.series(algorithm)?
            .get(&batch_size)
            .ok_or_else(|| AnalysisError::MissingBatchSize {
                file: self.file.clone(),
                algorithm: algorithm.to_string(),
                batch_size,
            })
    }
}

fn summarize(row: &ResultRow) -> Result<f64, AnalysisError> {
    Ok(stats::percentile(&row.samples, 50.0)? / MICROS_PER_MILLI)
}

fn keep_all(row: &ResultRow) -> Result<Vec<f64>, AnalysisError> {
    Ok(row.samples.iter().map(|v| v / MICROS_PER_MILLI).collect())
}

/// Reads a result file, reducing each row to its median latency in
/// milliseconds.
pub fn read_summary(path: &Path) -> Result<ResultTable<f64>, AnalysisError> {
    let file = path.display().to_string();
    let reader = open(path, &file)?;
    ResultTable::load(&file, reader, summarize)
}

/// Reads a result file keeping every sample, converted to milliseconds, for
/// downstream percentile and deviation analysis.
pub fn read_raw(path: &Path) -> Result<ResultTable<Vec<f64>>, AnalysisError> {
    let file = path.display().to_string();
    let reader = open(path, &file)?;
    ResultTable::load(&file, reader, keep_all)
}

fn open(path: &Path, file: &str) -> Result<BufReader<File>, AnalysisError> {
    let handle = File::open(path).map_err(|e| AnalysisError::Read {
        file: file.to_string(),
        source: e,
    })?;
    Ok(BufReader::new(handle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary_of(text: &str) -> Result<ResultTable<f64>, AnalysisError> {
        ResultTable::load("test", text.as_bytes(), summarize)
    }

    fn raw_of(text: &str) -> Result<ResultTable<Vec<f64>>, AnalysisError> {
        ResultTable::load("test", text.as_bytes(), keep_all)
    }

    #[test]
    fn algorithm_keys_are_the_first_two_tokens() {
        let text = "no batch 0 100 200 300\n\
                    batch only 2 50 60 70\n\
                    batch prefetch 4 40 40 40\n";
        let table = summary_of(text).unwrap();
        let mut algorithms: Vec<&str> = table.algorithms().collect();
        algorithms.sort_unstable();
        assert_eq!(algorithms, vec!["batch only", "batch prefetch", "no batch"]);
    }

    #[test]
    fn summary_is_the_median_in_milliseconds() {
        let table = summary_of("no batch 0 1 2 3 4 5\n").unwrap();
        assert_eq!(*table.value("no batch", 0).unwrap(), 0.003);
    }

    #[test]
    fn raw_keeps_every_sample_in_order() {
        let table = raw_of("batch only 2 10 30 20\n").unwrap();
        assert_eq!(
            *table.value("batch only", 2).unwrap(),
            vec![0.01, 0.03, 0.02]
        );
    }

    #[test]
    fn raw_median_matches_summary() {
        let text = "batch prefetch 8 31 17 23 45 12\n";
        let summary = summary_of(text).unwrap();
        let raw = raw_of(text).unwrap();
        let samples = raw.value("batch prefetch", 8).unwrap();
        assert_eq!(
            stats::percentile(samples, 50.0).unwrap(),
            *summary.value("batch prefetch", 8).unwrap()
        );
    }

    #[test]
    fn duplicate_keys_take_the_last_row() {
        let text = "no batch 0 100 100 100\n\
                    no batch 0 400 400 400\n";
        let table = summary_of(text).unwrap();
        assert_eq!(*table.value("no batch", 0).unwrap(), 0.4);
    }

    #[test]
    fn batch_sizes_come_back_in_ascending_order() {
        let text = "batch only 16 5\n\
                    batch only 2 9\n\
                    batch only 8 7\n";
        let table = summary_of(text).unwrap();
        let batches: Vec<u64> = table.series("batch only").unwrap().keys().copied().collect();
        assert_eq!(batches, vec![2, 8, 16]);
    }

    #[test]
    fn short_lines_are_fatal() {
        assert!(matches!(
            summary_of("no batch 0\n"),
            Err(AnalysisError::ShortLine { line: 1, .. })
        ));
    }

    #[test]
    fn blank_lines_are_fatal() {
        assert!(matches!(
            summary_of("no batch 0 100 200\n\n"),
            Err(AnalysisError::ShortLine { line: 2, .. })
        ));
    }

    #[test]
    fn non_integer_batch_size_is_fatal() {
        assert!(matches!(
            summary_of("no batch two 100 200\n"),
            Err(AnalysisError::BadBatchSize { .. })
        ));
    }

    #[test]
    fn non_numeric_sample_is_fatal() {
        assert!(matches!(
            summary_of("no batch 0 abc\n"),
            Err(AnalysisError::BadSample { .. })
        ));
    }

    #[test]
    fn non_finite_sample_is_fatal() {
        assert!(matches!(
            summary_of("no batch 0 100 inf\n"),
            Err(AnalysisError::BadSample { .. })
        ));
    }

    #[test]
    fn missing_algorithm_is_an_error() {
        let table = summary_of("no batch 0 100 200 300\n").unwrap();
        assert!(matches!(
            table.series("batch only"),
            Err(AnalysisError::MissingAlgorithm { .. })
        ));
    }

    #[test]
    fn missing_batch_size_is_an_error() {
        let table = summary_of("no batch 0 100 200 300\n").unwrap();
        assert!(matches!(
            table.value("no batch", 7),
            Err(AnalysisError::MissingBatchSize { batch_size: 7, .. })
        ));
    }
}
