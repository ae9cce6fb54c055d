pub mod error;
pub mod filters;
pub mod models;

pub use error::{CombinationError, DrawError, FilterError, ScoreError};
pub use filters::{FilterConfig, FilterDimension, RestrictivenessBand, ValueRange};
pub use models::{
    Combination, DistributionReport, HistoricalDraw, RankedNumber, RecentHit, ScoringResult,
    PICK_COUNT, UNIVERSE,
};
