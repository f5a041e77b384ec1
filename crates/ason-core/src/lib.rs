//! # ason-core
//!
//! Bridge between a host's dynamic value model and **ASON** values:
//! immutable, set-theoretic structured values that can be unioned,
//! intersected, joined and complemented.
//!
//! The bridge does three things at the boundary with the engine:
//!
//! - **Conversion**: host scalars, lists, string-keyed mappings and
//!   [`ToAson`] extension objects become ASON values. Lists are encoded as
//!   exact-length intersections and mappings as successive object joins.
//! - **Comparison**: a partial order that uses native ordering for strings
//!   and numbers and set containment for everything else.
//! - **Iteration**: a lazy cursor over lists, unions and objects.
//!
//! ## Quick start
//!
//! ```rust
//! use ason_core::{Ason, HostValue, parse_with};
//! use serde_json::json;
//!
//! // Host → ASON
//! let doc = Ason::new(HostValue::from(json!({"name": "Alice", "tags": ["a", "b"]}))).unwrap();
//! assert_eq!(doc.to_string(), r#"{"name": "Alice", "tags": ["a", "b"]}"#);
//!
//! // Set algebra
//! let pattern = Ason::parse(r#"{"name": *, *}"#).unwrap();
//! assert!(doc < pattern);
//!
//! // Variables
//! let expr = parse_with("[x, x]", [("x", "hi")]).unwrap();
//! assert_eq!(expr.to_string(), r#"["hi", "hi"]"#);
//!
//! // ASON → JSON
//! assert_eq!(doc.to_json().unwrap(), json!({"name": "Alice", "tags": ["a", "b"]}));
//! ```
//!
//! ## Modules
//!
//! - [`engine`]: value handles, set algebra, reader and printer
//! - [`convert`]: host value → ASON value
//! - [`compare`]: equality and ordering
//! - [`iter`]: lazy structural iteration
//! - [`namespace`]: variable bindings for one expression read
//! - [`host`]: host values and the `ToAson` capability
//! - [`config`]: conversion limits
//! - [`error`]: error types

pub mod compare;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod host;
pub mod iter;
pub mod namespace;
pub mod value;

pub use compare::{compare, CmpOp};
pub use config::BridgeConfig;
pub use convert::{convert, Converter};
pub use engine::TypeTag;
pub use error::{
    AsonError, BindError, ComparisonError, ConversionError, IterationError, ParseError,
};
pub use host::{HostValue, ToAson};
pub use iter::{Item, Iter};
pub use namespace::{parse_with, Namespace};
pub use value::Ason;
