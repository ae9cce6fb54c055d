pub mod analyzer;
pub mod cancellation;
pub mod estimator;
pub mod features;
pub mod generator;
pub mod history;
pub mod scorer;

pub use analyzer::{analyze_history, DistributionAnalyzer};
pub use cancellation::CancellationToken;
pub use estimator::{estimate_success_probability, expected_attempts};
pub use generator::{
    spawn_generation, GenerationHandle, GenerationOutcome, GenerationRequest, Generator,
    ProgressEvent,
};
pub use history::{HistorySource, InMemoryHistory};
pub use scorer::score_combination;
