// crates/surface-gate-resolver/tests/proptest_abi.rs
// ============================================================================
// Module: ABI Codec Property-Based Tests
// Description: Property tests over hostile return data and token ids.
// Purpose: Detect panics and invariant breaks across wide input ranges.
// ============================================================================

//! Property-based tests for ABI codec invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use surface_gate_core::AgentId;
use surface_gate_resolver::TOKEN_URI_SELECTOR;
use surface_gate_resolver::decode_string_result;
use surface_gate_resolver::encode_token_uri_call;

/// Builds a well-formed dynamic-string return frame for a payload.
fn encode_string_frame(payload: &str) -> String {
    let mut body = hex::encode(payload.as_bytes());
    while body.len() % 64 != 0 {
        body.push('0');
    }
    format!("0x{:064x}{:064x}{body}", 32, payload.len())
}

proptest! {
    #[test]
    fn decode_never_panics_on_arbitrary_strings(data in ".*") {
        let _ = decode_string_result(&data);
    }

    #[test]
    fn decode_never_panics_on_arbitrary_hex(bytes in prop::collection::vec(any::<u8>(), 0 .. 256)) {
        let _ = decode_string_result(&hex::encode(bytes));
    }

    #[test]
    fn every_token_id_encodes_to_a_fixed_width_call(token in any::<u128>()) {
        let encoded = encode_token_uri_call(&AgentId::new(token.to_string())).unwrap();
        prop_assert_eq!(encoded.len(), 2 + 8 + 64);
        prop_assert_eq!(&encoded[2 .. 10], TOKEN_URI_SELECTOR);
        let word = u128::from_str_radix(&encoded[encoded.len() - 32 ..], 16).unwrap();
        prop_assert_eq!(word, token);
        prop_assert!(encoded[10 .. encoded.len() - 32].bytes().all(|byte| byte == b'0'));
    }

    #[test]
    fn well_formed_frames_round_trip(payload in "[ -~]{0,96}") {
        let frame = encode_string_frame(&payload);
        prop_assert_eq!(decode_string_result(&frame).unwrap(), payload);
    }

    #[test]
    fn decoded_strings_never_exceed_the_frame(bytes in prop::collection::vec(any::<u8>(), 64 .. 256)) {
        if let Ok(decoded) = decode_string_result(&hex::encode(&bytes)) {
            prop_assert!(decoded.len() <= bytes.len().saturating_sub(32));
        }
    }
}
