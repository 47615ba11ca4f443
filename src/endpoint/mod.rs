//! Endpoint module
//!
//! Describes what is queried (URL, fields, where records live) and builds
//! the request for each page.

mod builtin;
mod types;

pub use builtin::{get_builtin, is_builtin, list_builtin, BUILTIN_ENDPOINTS};
pub use types::{parse_field_list, Endpoint, FetchRequest, IdentityStyle, RecordsLocation};
