pub mod aggregator;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod output;
pub mod record;
pub mod series;
pub mod stats;
pub mod views;
