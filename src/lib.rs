pub mod config;
pub mod extract;
pub mod fetch_error;
pub mod fetcher;
pub mod metrics;
pub mod parsing;
pub mod report;
pub mod selection;
pub mod table;
pub mod workbook;
