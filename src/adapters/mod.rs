//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! data sources, plus the infrastructure the binary wires around them.
//!
//! Adapter categories:
//! - `sample`: file-backed statistics and forecasts, and an empty provider
//! - `cache`: per-batch memoization of provider answers
//! - `weather`: Open-Meteo forecast client
//! - `metrics`: Prometheus registry and text export

pub mod cache;
pub mod metrics;
pub mod sample;
pub mod weather;
