pub mod config;
pub mod db;
pub mod error;
pub mod scoring;
pub mod telemetry;
