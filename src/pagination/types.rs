//! Pagination types
//!
//! Turns a raw response body into a fully populated [`PageResult`] and tracks
//! the continuation values between pages.

use crate::endpoint::RecordsLocation;
use crate::error::{Error, Result};
use crate::types::{JsonValue, OptionStringExt};
use serde_json::Value;

/// Code the API puts in `error.code` when a payload is valid
pub const API_OK_CODE: &str = "ok";

/// One parsed page of results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    /// Records in server order
    pub records: Vec<JsonValue>,
    /// Cursor to send with the next request
    pub cursor: Option<JsonValue>,
    /// Server's "more data" flag
    pub has_more: bool,
    /// Secondary continuation token
    pub search_id: Option<String>,
}

impl PageResult {
    /// Parse a response body.
    ///
    /// A top-level `error.code` other than `"ok"` makes the page a failure.
    /// Everything else is optional: missing records mean an empty page, a
    /// missing or `null` cursor means none, and a missing `has_more` is false.
    pub fn parse(body: &Value, location: &RecordsLocation) -> Result<Self> {
        check_error_envelope(body)?;

        let Some(data) = body.get("data").and_then(Value::as_object) else {
            return Ok(Self::default());
        };

        let records = match location {
            RecordsLocation::Keys(keys) => keys
                .iter()
                .find_map(|key| data.get(key))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            RecordsLocation::Object => {
                if data.is_empty() {
                    Vec::new()
                } else {
                    vec![Value::Object(data.clone())]
                }
            }
        };

        let cursor = data.get("cursor").and_then(present_cursor);
        let has_more = data.get("has_more").and_then(Value::as_bool).unwrap_or(false);
        let search_id = data
            .get("search_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .none_if_empty();

        Ok(Self {
            records,
            cursor,
            has_more,
            search_id,
        })
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this page carried no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// `null`, `""`, `0` and `false` are not cursors
fn present_cursor(value: &Value) -> Option<JsonValue> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if n.as_f64().is_some_and(|f| f.abs() < f64::EPSILON) => None,
        other => Some(other.clone()),
    }
}

fn check_error_envelope(body: &Value) -> Result<()> {
    let Some(error) = body.get("error").and_then(Value::as_object) else {
        return Ok(());
    };

    match error.get("code").and_then(Value::as_str) {
        None | Some(API_OK_CODE) => Ok(()),
        Some(code) => {
            let text = |key: &str| {
                error
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            Err(Error::api(code, text("message"), text("log_id")))
        }
    }
}

/// Outcome of advancing past a page
#[derive(Debug, Clone, PartialEq)]
pub enum NextPage {
    /// Request another page with these continuation values
    Continue {
        /// Cursor to echo back unchanged
        cursor: JsonValue,
        /// Secondary token to echo back, if any was ever issued
        search_id: Option<String>,
    },
    /// The server says the result set is exhausted
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Tracks continuation state across the pages of one fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaginationState {
    /// Cursor returned by the latest page
    pub cursor: Option<JsonValue>,
    /// Latest secondary token seen on any page
    pub search_id: Option<String>,
    /// Pages accepted so far
    pub pages: usize,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a page into the state and decide whether to continue.
    ///
    /// The cursor is always replaced by the page's cursor. The search id is
    /// only replaced when the page carries one. Continuing requires both a
    /// cursor and `has_more`; an empty page does not stop anything by itself.
    pub fn advance(&mut self, page: &PageResult) -> NextPage {
        self.pages += 1;
        self.total_fetched += page.len() as u64;
        self.cursor.clone_from(&page.cursor);
        if page.search_id.is_some() {
            self.search_id.clone_from(&page.search_id);
        }

        match (&self.cursor, page.has_more) {
            (Some(cursor), true) => NextPage::Continue {
                cursor: cursor.clone(),
                search_id: self.search_id.clone(),
            },
            _ => {
                self.done = true;
                NextPage::Done
            }
        }
    }
}
