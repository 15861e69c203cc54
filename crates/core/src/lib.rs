// Core types for the FRED observations gateway

pub mod error;
pub mod request;
pub mod source;
pub mod types;

pub use error::{GatewayError, GatewayResult};
pub use request::{IntegerArg, ObservationQuery, ObservationRequest};
pub use source::ObservationSource;
pub use types::*;
