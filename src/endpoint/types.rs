//! Endpoint descriptors and per-page requests

use crate::error::{Error, Result};
use crate::partition::TimeWindow;
use crate::types::{JsonObject, JsonValue};
use serde_json::json;
use std::sync::Arc;
use url::Url;

/// Where the records of a page live inside the response's `data` object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordsLocation {
    /// Array under the first of these keys that is present
    Keys(Vec<String>),
    /// The `data` object itself is a single record
    Object,
}

impl RecordsLocation {
    /// Records under a single key
    pub fn key(key: impl Into<String>) -> Self {
        Self::Keys(vec![key.into()])
    }
}

/// How the identity filter is expressed in the request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStyle {
    /// `{"username": "<identity>"}`
    Username,
    /// Boolean query with an `EQ` condition on `username`
    VideoQuery,
}

/// Static description of one API endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Short dataset name (used in directory and file names)
    pub name: String,
    /// Endpoint URL without query string
    pub url: String,
    /// Fields requested through the `fields` query parameter
    pub fields: Vec<String>,
    /// Where records are found in the response
    pub records: RecordsLocation,
    /// Identity filter shape
    pub identity: IdentityStyle,
    /// Default page size (`max_count`), `None` for unpaginated endpoints
    pub page_size: Option<u32>,
    /// Whether queries must be sliced into date windows
    pub windowed: bool,
}

impl Endpoint {
    /// Create a new endpoint with no fields, no page size, not windowed
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        records: RecordsLocation,
        identity: IdentityStyle,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            fields: Vec::new(),
            records,
            identity,
            page_size: None,
            windowed: false,
        }
    }

    /// Set the requested fields
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields = fields
            .into_iter()
            .flat_map(|f| parse_field_list(f.as_ref()))
            .collect();
        self
    }

    /// Override the URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the default page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Mark the endpoint as requiring date windows
    #[must_use]
    pub fn windowed(mut self, windowed: bool) -> Self {
        self.windowed = windowed;
        self
    }

    /// Comma-joined field list with all whitespace removed
    pub fn fields_param(&self) -> String {
        self.fields.join(",")
    }

    /// Full request URL, `fields` query included when any are requested
    pub fn request_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.url)?;
        if !url.has_host() {
            return Err(Error::invalid_value("url", format!("{} has no host", self.url)));
        }

        if !self.fields.is_empty() {
            url.set_query(Some(&format!("fields={}", self.fields_param())));
        }

        Ok(url)
    }
}

/// Split a field list like `"id, create_time,\n username"` into clean names
pub fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|f| f.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|f| !f.is_empty())
        .collect()
}

/// One page request: endpoint, identity, optional window and continuation
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    /// Endpoint being queried
    pub endpoint: Arc<Endpoint>,
    /// Account handle being queried
    pub identity: String,
    /// Optional date window
    pub window: Option<TimeWindow>,
    /// Page size bound (`max_count`)
    pub page_size: Option<u32>,
    /// Opaque continuation cursor from the previous page
    pub cursor: Option<JsonValue>,
    /// Secondary continuation token some endpoints require
    pub search_id: Option<String>,
}

impl FetchRequest {
    /// First-page request for an identity
    pub fn new(endpoint: Arc<Endpoint>, identity: impl Into<String>) -> Self {
        let page_size = endpoint.page_size;
        Self {
            endpoint,
            identity: identity.into(),
            window: None,
            page_size,
            cursor: None,
            search_id: None,
        }
    }

    /// Restrict the query to a date window
    #[must_use]
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Override the page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Request for the following page, leaving `self` untouched
    pub fn next_page(&self, cursor: Option<JsonValue>, search_id: Option<String>) -> Self {
        Self {
            cursor,
            search_id,
            ..self.clone()
        }
    }

    /// Request URL
    pub fn url(&self) -> Result<Url> {
        self.endpoint.request_url()
    }

    /// JSON body for this request
    pub fn body(&self) -> JsonValue {
        let mut body = JsonObject::new();

        match self.endpoint.identity {
            IdentityStyle::Username => {
                body.insert("username".into(), json!(self.identity));
            }
            IdentityStyle::VideoQuery => {
                body.insert(
                    "query".into(),
                    json!({
                        "and": [{
                            "operation": "EQ",
                            "field_name": "username",
                            "field_values": [self.identity],
                        }]
                    }),
                );
            }
        }

        if let Some(window) = &self.window {
            body.insert("start_date".into(), json!(window.start_param()));
            body.insert("end_date".into(), json!(window.end_param()));
        }

        if let Some(page_size) = self.page_size {
            body.insert("max_count".into(), json!(page_size));
        }

        if self.endpoint.identity == IdentityStyle::VideoQuery {
            body.insert("is_random".into(), json!(false));
        }

        if let Some(cursor) = &self.cursor {
            body.insert("cursor".into(), cursor.clone());
        }

        if let Some(search_id) = &self.search_id {
            body.insert("search_id".into(), json!(search_id));
        }

        JsonValue::Object(body)
    }

    /// Human-readable label: identity plus window when present
    pub fn describe(&self) -> String {
        match &self.window {
            Some(window) => format!("{} ({window})", self.identity),
            None => self.identity.clone(),
        }
    }
}
