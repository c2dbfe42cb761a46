//! Codec trait and implementations for serializing/deserializing bodies.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The [`ApiClient`](crate::ApiClient) doesn't care HOW bodies are
//! serialized; it just needs something that implements [`Codec`].
//! The arena API speaks JSON, so [`JsonCodec`] is the default.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the client may be shared between tasks.
/// - `'static` → the codec owns everything it needs.
///
/// `DeserializeOwned` (vs plain `Deserialize`) means the result doesn't
/// borrow from the input bytes, so the response buffer can be dropped
/// right after decoding.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use arena_protocol::{Codec, JsonCodec, CreateHeroRequest};
///
/// let codec = JsonCodec;
/// let bytes = codec
///     .encode(&CreateHeroRequest {
///         title: "Dragon Slayer".into(),
///         description: "Conqueror of the northern dragons".into(),
///     })
///     .unwrap();
/// let value: serde_json::Value = codec.decode(&bytes).unwrap();
/// assert_eq!(value["title"], "Dragon Slayer");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hero, HeroId};

    #[test]
    fn test_json_codec_decodes_server_hero() {
        let codec = JsonCodec;
        let bytes = br#"{"ID":"h1","PlayerID":"p1","Title":"T","Description":"D","Country":"NZ","Elo":1000}"#;

        let hero: Hero = codec.decode(bytes).expect("should decode");

        assert_eq!(hero.id, HeroId::new("h1"));
        assert_eq!(hero.rating, 1000);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let codec = JsonCodec;
        let result: Result<Hero, _> = codec.decode(b"<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_missing_field_returns_decode_error() {
        let codec = JsonCodec;
        let result: Result<Hero, _> = codec.decode(br#"{"ID":"h1"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
