//! # oas-valexp
//!
//! Validates runtime values against OpenAPI Schema Objects and reports the
//! first violated constraint with an exact path, a stable error code, and a
//! localized message.
//!
//! ## Quick Start
//!
//! ```rust
//! use oas_valexp::prelude::*;
//! use serde_json::json;
//!
//! let mut valexp = ValExp::new(&json!({
//!     "name": "hoge",
//!     "required": true,
//!     "schema": {
//!         "type": "object",
//!         "properties": {
//!             "foo": { "type": "array", "items": { "type": "string", "maxLength": 3 } },
//!             "bar": { "type": "integer", "default": 10 }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let result = valexp.exec(Some(&json!({ "foo": ["abc"] }))).unwrap();
//! assert_eq!(result.value, Some(json!({ "foo": ["abc"], "bar": 10 })));
//!
//! assert!(!valexp.test(Some(&json!({ "foo": ["abcd"] }))));
//! let err = valexp.error().unwrap();
//! assert_eq!(err.path, "hoge.foo[0]");
//! assert_eq!(err.code, ErrorCode::ValueStringMaxLength);
//! ```
//!
//! ## Layers
//!
//! - [`schema`]: normalizes a raw schema into a canonical [`Schema`] tree
//! - [`validate`]: checks a value against a [`Schema`], applying defaults
//! - [`message`]: renders error codes into localized messages
//! - [`ValExp`]: ties a [`Parameter`] to a reporter and remembers the last error
//!
//! ## Supported keywords
//!
//! `type`, `nullable`, `enum`, `default`, `oneOf`, `anyOf`, `allOf`,
//! `minLength`, `maxLength`, `pattern`, `format` (`date-time`, `date`,
//! `time`, `byte`, `int32`, `int64`), `minimum`, `maximum`,
//! `exclusiveMinimum`, `exclusiveMaximum`, `multipleOf`, `minItems`,
//! `maxItems`, `uniqueItems`, `items`, `minProperties`, `maxProperties`,
//! `required`, `properties` and `additionalProperties`.

pub mod config;
pub mod error;
mod json;
pub mod message;
mod parameter;
pub mod prelude;
pub mod schema;
pub mod validate;
mod valexp;

pub use config::{ConfigError, ValExpConfig};
pub use error::{ErrorCategory, ErrorCode, SchemaError, ValidationError, Violation};
pub use message::{Locale, MessageCatalog, MessageResolver, Reporter};
pub use parameter::Parameter;
pub use schema::Schema;
pub use valexp::{BuildError, ValExp, ValidationResult};
