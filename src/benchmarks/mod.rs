pub mod benchmarks_model;
pub mod benchmarks_service;

pub use benchmarks_model::{BenchmarkReturns, BenchmarkRow, BenchmarkSeries, IndexLevels};
pub use benchmarks_service::BenchmarkReturnEngine;
