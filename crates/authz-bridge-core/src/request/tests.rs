// crates/authz-bridge-core/src/request/tests.rs
// ============================================================================
// Module: Request Builder Tests
// Description: Unit tests for request body shapes and size bounds.
// Purpose: Validate key order, escaping, and the body size limit.
// Dependencies: authz-bridge-core, serde_json
// ============================================================================

//! ## Overview
//! Builds both request shapes and checks the exact serialized documents.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::use_debug,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use serde_json::Value;

use super::AclRequest;
use super::AuthRequest;
use super::MAX_REQUEST_BODY_BYTES;
use crate::decision::DecisionError;

/// Parses a body as JSON, failing the test on malformed output.
fn parse(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[test]
fn auth_body_has_fixed_shape() {
    let body = AuthRequest {
        username: Some("alice"),
        password: Some(b"p@ss".as_slice()),
        client_id: Some("dev-1"),
    }
    .to_body()
    .unwrap();
    assert_eq!(
        body.as_bytes(),
        br#"{"username":"alice","password":"p@ss","client_id":"dev-1"}"#.as_slice()
    );
}

#[test]
fn acl_body_has_fixed_shape() {
    let body = AclRequest {
        username: Some("alice"),
        client_id: Some("dev-1"),
        topic: Some("sensors/+/temp"),
        access: 4,
    }
    .to_body()
    .unwrap();
    assert_eq!(
        body.as_bytes(),
        br#"{"username":"alice","client_id":"dev-1","topic":"sensors/+/temp","access":4}"#
            .as_slice()
    );
}

#[test]
fn absent_fields_serialize_as_empty_strings() {
    let body = AuthRequest::default().to_body().unwrap();
    assert_eq!(body.as_bytes(), br#"{"username":"","password":"","client_id":""}"#.as_slice());
    let body = AclRequest {
        access: -1,
        ..AclRequest::default()
    }
    .to_body()
    .unwrap();
    assert_eq!(parse(body.as_bytes())["access"], -1);
}

#[test]
fn embedded_quotes_are_escaped() {
    let body = AuthRequest {
        username: Some("O'Brien \"Test\""),
        password: Some(b"pw\\\"}".as_slice()),
        client_id: Some("c"),
    }
    .to_body()
    .unwrap();
    let text = std::str::from_utf8(body.as_bytes()).unwrap();
    assert!(text.contains(r#"O'Brien \"Test\""#));
    let value = parse(body.as_bytes());
    let object = value.as_object().unwrap();
    assert_eq!(object.len(), 3);
    assert_eq!(object["username"], "O'Brien \"Test\"");
    assert_eq!(object["password"], "pw\\\"}");
}

#[test]
fn injection_attempt_cannot_add_keys() {
    let body = AclRequest {
        username: Some(r#"mallory","admin":"true"#),
        client_id: Some("c"),
        topic: Some("t"),
        access: 2,
    }
    .to_body()
    .unwrap();
    let value = parse(body.as_bytes());
    assert!(value.get("admin").is_none());
    assert_eq!(value["username"], r#"mallory","admin":"true"#);
}

#[test]
fn oversized_body_is_rejected() {
    let topic = "t".repeat(MAX_REQUEST_BODY_BYTES);
    let result = AclRequest {
        topic: Some(&topic),
        ..AclRequest::default()
    }
    .to_body();
    match result {
        Err(DecisionError::BodyTooLarge {
            size,
            limit,
        }) => {
            assert!(size >= limit);
            assert_eq!(limit, MAX_REQUEST_BODY_BYTES);
        }
        other => panic!("expected BodyTooLarge, got {other:?}"),
    }
}

#[test]
fn escaping_growth_counts_toward_limit() {
    // 44 bytes of framing plus 490 quotes doubled to 980 bytes reaches the bound.
    let quotes = "\"".repeat(490);
    let result = AuthRequest {
        username: Some(&quotes),
        ..AuthRequest::default()
    }
    .to_body();
    assert!(matches!(result, Err(DecisionError::BodyTooLarge { .. })));
}

#[test]
fn body_just_below_limit_is_accepted() {
    let framing = AuthRequest::default().to_body().unwrap().len();
    let filler = "a".repeat(MAX_REQUEST_BODY_BYTES - framing - 1);
    let body = AuthRequest {
        username: Some(&filler),
        ..AuthRequest::default()
    }
    .to_body()
    .unwrap();
    assert_eq!(body.len(), MAX_REQUEST_BODY_BYTES - 1);
}
