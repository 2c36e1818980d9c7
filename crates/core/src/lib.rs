//! Core data types for the signal relay.

pub mod alert;
pub mod error;
pub mod pair;
pub mod price;
pub mod timeframe;

pub use alert::*;
pub use error::*;
pub use pair::*;
pub use price::*;
pub use timeframe::*;
