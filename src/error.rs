use thiserror::Error;

/// Errors raised while loading result files or aggregating measurements.
///
/// Every variant carries enough context to name the offending file, line, or
/// key. Any of these aborts the whole run; partial charts are never written.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{file}: {source}")]
    Read {
        file: String,
        source: std::io::Error,
    },
    #[error("{file}:{line}: expected at least 4 fields, got {fields}")]
    ShortLine {
        file: String,
        line: usize,
        fields: usize,
    },
    #[error("{file}:{line}: bad batch size {token:?}")]
    BadBatchSize {
        file: String,
        line: usize,
        token: String,
    },
    #[error("{file}:{line}: bad sample {token:?}")]
    BadSample {
        file: String,
        line: usize,
        token: String,
    },
    #[error("{file}: no rows for algorithm {algorithm:?}")]
    MissingAlgorithm { file: String, algorithm: String },
    #[error("{file}: no batch size {batch_size} for algorithm {algorithm:?}")]
    MissingBatchSize {
        file: String,
        algorithm: String,
        batch_size: u64,
    },
    #[error("percentile of an empty sample set")]
    EmptySamples,
    #[error("percentile {0} is outside 0..=100")]
    BadPercentile(f64),
    #[error("no batch sizes recorded for series")]
    EmptySeries,
    #[error("speedup denominator is zero or not finite")]
    DivisionByZero,
    #[error(
        "{file}: batch size {batch_size} has {got} samples, baseline has {baseline}"
    )]
    SampleCountMismatch {
        file: String,
        batch_size: u64,
        baseline: usize,
        got: usize,
    },
}
