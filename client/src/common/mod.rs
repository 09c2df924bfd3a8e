pub mod errors;

pub use errors::{AcknowledgeError, AcknowledgeResult, BackendError};
