//! Rate normalization, conversion and change tracking

pub mod change;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod feed;
pub mod log;
pub mod resolver;
pub mod snapshot;
pub mod table;

// Re-export main types for cleaner imports
pub use change::{DeltaMode, PairQuote, Trend};
pub use conversion::{ConversionError, ConversionRequest, ConversionResult, ConversionState};
pub use currency::{CurrencyCode, CurrencyPair, RateProvider};
pub use feed::{FeedEvent, RateFeed, SharedRateTable};
pub use snapshot::RateSnapshot;
pub use table::RateTable;
