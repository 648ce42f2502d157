//! Fine-grained change tracking over a plain JSON document.
//!
//! A [`Store`] walks its document once at construction, classifying every
//! slot reachable through plain objects as either a cell or a sequence
//! (a non-empty array). Cell writes report to the store's [`Host`] before
//! they are stored and unchanged writes are suppressed; sequence mutations
//! apply their edit and then report the whole sequence once. Paths the
//! walk never registered can still be written, but silently.
//!
//! # Example
//!
//! ```
//! use json_observe::{RecordingHost, Store};
//! use serde_json::json;
//!
//! let mut store = Store::new(
//!     RecordingHost::new(),
//!     json!({
//!         "user": { "name": "ada" },
//!         "items": [1, 2],
//!     }),
//! );
//!
//! store.set("user.name", json!("grace")).unwrap();
//! store.seq("items").unwrap().push(json!(3)).unwrap();
//!
//! let records = store.host().records();
//! assert_eq!(records[0].path, "user.name");
//! assert_eq!(records[0].value, json!("grace"));
//! assert_eq!(records[1].path, "items");
//! assert_eq!(records[1].value, json!([1, 2, 3]));
//! ```

pub mod observe;

// Re-exports for convenience.
pub use observe::{
    cmp_values, CellHandle, ChangeRecord, DataProxy, FnHost, Host, RecordingHost, SeqHandle,
    Store, StoreError, TrackKind,
};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
