//! graph-clone - Deep cloning for cyclic, heterogeneous value graphs
//!
//! This crate models dynamically-typed value graphs ([`GraphValue`]) and
//! copies them safely: shared references stay shared, cycles terminate, and
//! leaf categories (dates, patterns, boxed primitives, errors, tokens) are
//! reconstructed rather than traversed.
//!
//! # Example
//!
//! ```
//! use graph_clone::{clone, GraphValue};
//!
//! // A self-referential object
//! let config = GraphValue::obj_from([("retries", GraphValue::Int(3))]);
//! config.set_key("owner", config.clone());
//!
//! let copy = clone(&config);
//! assert!(copy.get_key("owner").unwrap().same(&copy));
//! assert!(!copy.same(&config));
//! ```

pub mod clone;
pub mod convert;
pub mod equal;
pub mod leaves;
pub mod value;

// Re-exports for convenience
pub use clone::{clone, clone_with, IdentityMap};
pub use convert::to_json;
pub use equal::deep_equal;
pub use leaves::{DateValue, ErrorValue, PatternError, PatternValue, TokenRef, UniqueToken};
pub use value::GraphValue;
