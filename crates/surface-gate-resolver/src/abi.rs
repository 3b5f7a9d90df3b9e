// crates/surface-gate-resolver/src/abi.rs
// ============================================================================
// Module: Token URI ABI Codec
// Description: Encoder/decoder for the tokenURI(uint256) call shape.
// Purpose: Build eth_call data and decode dynamic-string returns safely.
// Dependencies: surface-gate-core, hex, thiserror
// ============================================================================

//! ## Overview
//! This module covers exactly one contract call: `tokenURI(uint256)` and its
//! ABI-encoded dynamic-string return. It is not a general ABI codec. The
//! decoder treats return data as hostile: the frame, the offset word, and the
//! length word are all bounds-checked against the actual buffer before any
//! slice is taken, so forged offsets or lengths fail with a typed error
//! instead of panicking.
//!
//! Security posture: return data comes from an untrusted RPC endpoint
//! relaying an untrusted contract.

// ============================================================================
// SECTION: Imports
// ============================================================================

use surface_gate_core::AgentId;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Four-byte function selector for `tokenURI(uint256)`, hex-encoded.
pub const TOKEN_URI_SELECTOR: &str = "c87b56dd";

/// ABI word size in bytes.
const WORD_BYTES: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// ABI encode/decode errors.
///
/// # Invariants
/// - Every malformed return frame maps to a variant; the decoder never
///   panics on hostile input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    /// The agent id is not a decimal token id within `uint256` range.
    #[error("invalid token id: {0}")]
    InvalidTokenId(String),
    /// The return data is not valid hex.
    #[error("return data is not valid hex")]
    InvalidHex,
    /// The return frame is shorter than the minimum offset+length envelope.
    #[error("return frame too short: {actual} bytes")]
    FrameTooShort {
        /// Actual decoded frame size in bytes.
        actual: usize,
    },
    /// The offset word points outside the buffer.
    #[error("string offset out of bounds")]
    OffsetOutOfBounds,
    /// The length word claims more bytes than the buffer holds.
    #[error("string length out of bounds")]
    LengthOutOfBounds,
    /// The string payload is not valid UTF-8.
    #[error("string payload is not valid utf-8")]
    InvalidUtf8,
}

impl AbiError {
    /// Returns the stable snake_case error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTokenId(_) => "invalid_token_id",
            Self::InvalidHex => "invalid_hex",
            Self::FrameTooShort {
                ..
            } => "frame_too_short",
            Self::OffsetOutOfBounds => "offset_out_of_bounds",
            Self::LengthOutOfBounds => "length_out_of_bounds",
            Self::InvalidUtf8 => "invalid_utf8",
        }
    }
}

// ============================================================================
// SECTION: Encoding
// ============================================================================

/// Encodes the `eth_call` data field for `tokenURI(agent_id)`.
///
/// The agent id must be a decimal token id anywhere in `uint256` range; it is
/// zero-padded big-endian into one ABI word behind the fixed selector.
///
/// # Errors
///
/// Returns [`AbiError::InvalidTokenId`] for non-decimal or out-of-range ids.
pub fn encode_token_uri_call(agent_id: &AgentId) -> Result<String, AbiError> {
    let word = token_id_word(agent_id.as_str())?;
    Ok(format!("0x{TOKEN_URI_SELECTOR}{}", hex::encode(word)))
}

/// Converts a decimal token id into one big-endian ABI word.
///
/// Digits accumulate base-10 into base-256 across the full word, so every id
/// up to `2^256 - 1` encodes. A carry out of the top byte is out of range.
fn token_id_word(decimal: &str) -> Result<[u8; WORD_BYTES], AbiError> {
    if decimal.is_empty() || !decimal.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(AbiError::InvalidTokenId(decimal.to_string()));
    }
    let mut word = [0_u8; WORD_BYTES];
    for digit in decimal.bytes() {
        let mut carry = u16::from(digit - b'0');
        for byte in word.iter_mut().rev() {
            let value = u16::from(*byte) * 10 + carry;
            *byte = value.to_le_bytes()[0];
            carry = value >> 8;
        }
        if carry != 0 {
            return Err(AbiError::InvalidTokenId(decimal.to_string()));
        }
    }
    Ok(word)
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes an ABI-encoded dynamic-string return frame into a string.
///
/// Accepts hex with or without a `0x` prefix. The frame must hold at least
/// the offset and length words; the offset, the length, and the payload slice
/// are each checked against the buffer before use.
///
/// # Errors
///
/// Returns [`AbiError`] for non-hex input, truncated frames, forged offsets
/// or lengths, and non-UTF-8 payloads.
pub fn decode_string_result(data: &str) -> Result<String, AbiError> {
    let stripped = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex::decode(stripped).map_err(|_| AbiError::InvalidHex)?;
    if bytes.len() < WORD_BYTES * 2 {
        return Err(AbiError::FrameTooShort {
            actual: bytes.len(),
        });
    }

    let offset = word_as_usize(&bytes[0 .. WORD_BYTES]).ok_or(AbiError::OffsetOutOfBounds)?;
    let length_end = offset.checked_add(WORD_BYTES).ok_or(AbiError::OffsetOutOfBounds)?;
    if length_end > bytes.len() {
        return Err(AbiError::OffsetOutOfBounds);
    }

    let length = word_as_usize(&bytes[offset .. length_end]).ok_or(AbiError::LengthOutOfBounds)?;
    let payload_end = length_end.checked_add(length).ok_or(AbiError::LengthOutOfBounds)?;
    if payload_end > bytes.len() {
        return Err(AbiError::LengthOutOfBounds);
    }

    String::from_utf8(bytes[length_end .. payload_end].to_vec())
        .map_err(|_| AbiError::InvalidUtf8)
}

/// Interprets one big-endian ABI word as a `usize`.
///
/// Words with any bit set above the `usize` range yield `None`; a word that
/// large can never name a position in a real buffer.
fn word_as_usize(word: &[u8]) -> Option<usize> {
    let split = word.len().checked_sub(size_of::<usize>())?;
    if word[.. split].iter().any(|byte| *byte != 0) {
        return None;
    }
    let mut value: usize = 0;
    for byte in &word[split ..] {
        value = (value << 8) | usize::from(*byte);
    }
    Some(value)
}
