// Application services wiring providers, indicators and reports together
pub mod rsi_service;

pub use rsi_service::RsiService;
