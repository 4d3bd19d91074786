pub mod alert;
pub mod article;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod impact;
pub mod signal;

pub use alert::{Alert, AlertSet, AlertTier, SuppressedAlert};
pub use article::{ArticleRecord, Commodity, EventType, RawExtraction, Sentiment};
pub use config::{
    AlertConfig, CalibrationEntry, CommodityDefaultEntry, ConfidenceWeights, EngineConfig,
    EventBaseWeights, ImpactConfig, KeywordEntry, MacroConfig, MacroWeights, PipelineConfig,
    ScoringConfig,
};
pub use config_loader::ConfigLoader;
pub use error::{EngineError, Result};
pub use impact::PriceImpactEstimate;
pub use signal::{DailySignal, MacroIndicator, MacroTheme, SignalScore};
