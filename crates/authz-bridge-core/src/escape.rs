// crates/authz-bridge-core/src/escape.rs
// ============================================================================
// Module: JSON String Escaper
// Description: Narrow escaper for embedding values in JSON string literals.
// Purpose: Keep untrusted field values from altering request body structure.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The escaper rewrites exactly seven characters: `"`, `\`, backspace, form feed,
//! newline, carriage return and tab. Everything else, including other control
//! bytes, passes through untouched. The authorization service expects this
//! exact escape set, so this is not a general JSON string encoder.
//! Invariants:
//! - The operation is total; absent input yields an empty output.
//! - Output length is at most twice the input length.
//! - Only ASCII bytes are rewritten, so valid UTF-8 stays valid UTF-8.

// ============================================================================
// SECTION: Escaping
// ============================================================================

/// Returns the two-byte escape sequence for `byte`, if it needs one.
const fn escape_pair(byte: u8) -> Option<[u8; 2]> {
    match byte {
        b'"' => Some([b'\\', b'"']),
        b'\\' => Some([b'\\', b'\\']),
        0x08 => Some([b'\\', b'b']),
        0x0C => Some([b'\\', b'f']),
        b'\n' => Some([b'\\', b'n']),
        b'\r' => Some([b'\\', b'r']),
        b'\t' => Some([b'\\', b't']),
        _ => None,
    }
}

/// Escapes a byte string for inclusion between double quotes in a JSON document.
///
/// `None` is treated as the empty string rather than a null marker.
#[must_use]
pub fn escape_json_bytes(input: Option<&[u8]>) -> Vec<u8> {
    let input = input.unwrap_or_default();
    let mut escaped = Vec::with_capacity(input.len());
    for &byte in input {
        match escape_pair(byte) {
            Some(pair) => escaped.extend_from_slice(&pair),
            None => escaped.push(byte),
        }
    }
    escaped
}
