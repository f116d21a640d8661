//! Prelude module for convenient imports.
//!
//! ```rust
//! use oas_valexp::prelude::*;
//! ```

pub use crate::config::ValExpConfig;
pub use crate::error::{ErrorCategory, ErrorCode, SchemaError, ValidationError};
pub use crate::message::{Locale, MessageCatalog, Reporter};
pub use crate::parameter::Parameter;
pub use crate::schema::Schema;
pub use crate::valexp::{BuildError, ValExp, ValidationResult};
