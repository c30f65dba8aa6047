//! Deep merge of TOML values with workspace restriction enforcement.
//!
//! The merge operates on raw [`toml::Value`] trees rather than deserialized
//! structs. A missing key in a TOML table will not override the base layer.

mod deep;
mod restrict;
mod types;

pub use deep::{deep_merge, deep_merge_tracking};
pub(crate) use deep::record_all_leaves;
pub(crate) use restrict::{get_nested, set_nested};
pub use restrict::enforce_restrictions;
pub use types::{ConfigLayer, FieldSources};
