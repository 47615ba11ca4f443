//! Configuration module
//!
//! Run configuration and target lists, both readable from YAML or JSON.

mod targets;
mod types;

pub use targets::{load_targets, parse_targets, Target, DISPLAY_NAME_KEY};
pub use types::{available_datasets, FetchSettings, FieldList, HttpSettings, RunConfig, TargetSource};

use crate::error::Result;

impl RunConfig {
    /// Resolve the configured targets, reading the file when one is named
    pub fn load_targets(&self) -> Result<Vec<Target>> {
        match &self.targets {
            Some(TargetSource::File(path)) => load_targets(path, self.group.as_deref()),
            Some(TargetSource::Inline(doc)) => parse_targets(doc, self.group.as_deref()),
            None => Err(crate::error::Error::missing_field("targets")),
        }
    }
}
