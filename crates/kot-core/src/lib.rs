#![deny(missing_docs)]
#![doc = "Core data types for the kot check engine: statuses, outcomes, structured errors and value helpers."]

pub mod errors;
mod outcome;
pub mod serde;
mod status;
pub mod value;

pub use errors::{ErrorInfo, KotError, ProviderError};
pub use outcome::{json_type_name, Outcome};
pub use serde_json::Value;
pub use status::{Status, StatusCounts};
