pub mod consts;
pub mod error;
pub mod logging;

pub use consts::*;
pub use error::{ErrorKind, Result, TrxError};
pub use logging::{setup_logging, setup_logging_with_level};
