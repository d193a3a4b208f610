pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod pipeline;
pub mod storage;
pub mod types;

pub use config::{Config, OutputLayout};
pub use error::{ConvertError, Result};
pub use mapper::AnnotationMapper;
pub use pipeline::{BatchSummary, FileFailure, Pipeline, RunOptions};
