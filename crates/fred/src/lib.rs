//! # FRED client
//!
//! Thin client for the Federal Reserve Economic Data `series/observations`
//! endpoint.
//!
//! ```rust,no_run
//! use fredmcp_core::ObservationRequest;
//! use fredmcp_fred::{FredClient, FredConfig};
//!
//! # async fn example() -> fredmcp_core::GatewayResult<()> {
//! let client = FredClient::new(FredConfig::default().with_api_key("abcdef0123456789"))?;
//!
//! let query = ObservationRequest::for_series("GDP").resolve()?;
//! for obs in client.series_observations(&query).await? {
//!     println!("{} {:?}", obs.date, obs.numeric_value());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;

pub use client::FredClient;
pub use config::{FredConfig, DEFAULT_BASE_URL};
