pub mod models;
pub mod utils;

pub use models::{
    HistoryRange, HistoryRequest, Interval, PricePoint, PriceSeries, RsiPoint, RsiSeries, SeriesError,
};
