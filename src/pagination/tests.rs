//! Tests for pagination module

use super::*;
use crate::endpoint::RecordsLocation;
use crate::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn videos() -> RecordsLocation {
    RecordsLocation::key("videos")
}

// ============================================================================
// PageResult Tests
// ============================================================================

#[test]
fn test_parse_full_page() {
    let body = json!({
        "data": {
            "videos": [{"id": 1}, {"id": 2}],
            "cursor": 100,
            "has_more": true,
            "search_id": "7201388525814961198"
        },
        "error": {"code": "ok", "message": "", "log_id": "x"}
    });

    let page = PageResult::parse(&body, &videos()).unwrap();
    assert_eq!(page.records, vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(page.cursor, Some(json!(100)));
    assert!(page.has_more);
    assert_eq!(page.search_id, Some("7201388525814961198".to_string()));
    assert_eq!(page.len(), 2);
}

#[test]
fn test_parse_sparse_payload_defaults_everything() {
    for body in [json!({}), json!({"data": {}}), json!({"data": null}), json!([])] {
        let page = PageResult::parse(&body, &videos()).unwrap();
        assert_eq!(page, PageResult::default());
        assert!(page.is_empty());
        assert!(!page.has_more);
    }
}

#[test_case(json!(null); "null")]
#[test_case(json!(""); "empty string")]
#[test_case(json!(0); "zero")]
#[test_case(json!(0.0); "zero float")]
#[test_case(json!(false); "false")]
fn test_parse_falsy_cursor_is_absent(cursor: serde_json::Value) {
    let body = json!({"data": {"videos": [], "cursor": cursor, "has_more": true}});
    assert_eq!(PageResult::parse(&body, &videos()).unwrap().cursor, None);
}

#[test]
fn test_zero_cursor_ends_pagination() {
    let body = json!({"data": {"videos": [{"id": 1}], "cursor": 0, "has_more": true}});
    let page = PageResult::parse(&body, &videos()).unwrap();

    let mut state = PaginationState::new();
    assert_eq!(state.advance(&page), NextPage::Done);
}

#[test]
fn test_parse_records_under_fallback_key() {
    let location = RecordsLocation::Keys(vec![
        "reposted_videos".to_string(),
        "user_reposted_videos".to_string(),
    ]);
    let body = json!({"data": {"user_reposted_videos": [{"id": "a"}], "has_more": false}});

    let page = PageResult::parse(&body, &location).unwrap();
    assert_eq!(page.records, vec![json!({"id": "a"})]);
}

#[test]
fn test_parse_object_location() {
    let body = json!({
        "data": {"display_name": "Partido", "follower_count": 1200},
        "error": {"code": "ok"}
    });

    let page = PageResult::parse(&body, &RecordsLocation::Object).unwrap();
    assert_eq!(
        page.records,
        vec![json!({"display_name": "Partido", "follower_count": 1200})]
    );
    assert!(!page.has_more);

    let empty = PageResult::parse(&json!({"data": {}}), &RecordsLocation::Object).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_parse_records_not_an_array_defaults_to_empty() {
    let body = json!({"data": {"videos": "nope", "has_more": false}});
    assert!(PageResult::parse(&body, &videos()).unwrap().is_empty());
}

#[test]
fn test_parse_error_envelope() {
    let body = json!({
        "data": {},
        "error": {
            "code": "access_token_invalid",
            "message": "The access token is invalid or not found in the request.",
            "log_id": "202207280326050102231031430C7E754E"
        }
    });

    match PageResult::parse(&body, &videos()).unwrap_err() {
        Error::Api {
            code,
            message,
            log_id,
        } => {
            assert_eq!(code, "access_token_invalid");
            assert!(message.contains("access token"));
            assert_eq!(log_id, "202207280326050102231031430C7E754E");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[test]
fn test_parse_error_without_code_is_tolerated() {
    let body = json!({"data": {"videos": [{"id": 1}]}, "error": {}});
    assert_eq!(PageResult::parse(&body, &videos()).unwrap().len(), 1);
}

// ============================================================================
// NextPage Tests
// ============================================================================

#[test]
fn test_next_page_predicates() {
    let next = NextPage::Continue {
        cursor: json!("c1"),
        search_id: None,
    };
    assert!(next.is_continue());
    assert!(!next.is_done());
    assert!(NextPage::Done.is_done());
}

// ============================================================================
// PaginationState Tests
// ============================================================================

fn page(records: usize, cursor: Option<serde_json::Value>, has_more: bool) -> PageResult {
    PageResult {
        records: (0..records).map(|i| json!({"id": i})).collect(),
        cursor,
        has_more,
        search_id: None,
    }
}

#[test]
fn test_pagination_state_default() {
    let state = PaginationState::new();
    assert!(state.cursor.is_none());
    assert!(state.search_id.is_none());
    assert_eq!(state.pages, 0);
    assert_eq!(state.total_fetched, 0);
    assert!(!state.done);
}

#[test]
fn test_advance_continues_with_cursor_and_more() {
    let mut state = PaginationState::new();
    let next = state.advance(&page(2, Some(json!("c1")), true));

    assert_eq!(
        next,
        NextPage::Continue {
            cursor: json!("c1"),
            search_id: None
        }
    );
    assert_eq!(state.pages, 1);
    assert_eq!(state.total_fetched, 2);
    assert!(!state.done);
}

#[test]
fn test_advance_stops_without_more() {
    let mut state = PaginationState::new();
    assert!(state.advance(&page(1, Some(json!("c2")), false)).is_done());
    assert!(state.done);
}

#[test]
fn test_advance_stops_without_cursor_even_if_more() {
    let mut state = PaginationState::new();
    assert!(state.advance(&page(3, None, true)).is_done());
    assert!(state.done);
}

#[test]
fn test_advance_empty_page_with_more_continues() {
    let mut state = PaginationState::new();
    assert!(state.advance(&page(0, Some(json!(5)), true)).is_continue());
    assert_eq!(state.total_fetched, 0);
}

#[test]
fn test_advance_keeps_search_id_when_page_omits_it() {
    let mut state = PaginationState::new();

    let mut first = page(1, Some(json!(100)), true);
    first.search_id = Some("s-1".to_string());
    state.advance(&first);

    let next = state.advance(&page(1, Some(json!(200)), true));
    assert_eq!(
        next,
        NextPage::Continue {
            cursor: json!(200),
            search_id: Some("s-1".to_string())
        }
    );

    let mut third = page(1, Some(json!(300)), true);
    third.search_id = Some("s-2".to_string());
    state.advance(&third);
    assert_eq!(state.search_id, Some("s-2".to_string()));
}
