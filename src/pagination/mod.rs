//! Pagination module
//!
//! Cursor pagination as the research API does it: every page carries a
//! `cursor`, a `has_more` flag and sometimes a `search_id`, and the server's
//! signal is the only thing that ends a result set.
//!
//! # Overview
//!
//! - [`PageResult::parse`] defaults every optional field explicitly, so a
//!   sparse payload still yields a complete page.
//! - [`PaginationState::advance`] folds a page in and returns [`NextPage`].

mod types;

pub use types::{NextPage, PageResult, PaginationState, API_OK_CODE};

#[cfg(test)]
mod tests;
