//! JSON codec wiring for a single request.
//!
//! [`Decoder`] reads JSON values off the request body one after another:
//! each [`decode`](Decoder::decode) call consumes the next value and leaves
//! the rest in place for the next call, or for [`rest`](Decoder::rest) when
//! the body is not JSON at all. The body is pulled in on first use; a body
//! the handler never touches is drained by the adapter once it returns.

use std::io::Read;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api_error::{ApiError, E400};
use crate::response::ResponseWriter;

/// Sent as a JSON string with status 500 when a successful result fails to
/// serialize.
pub(crate) const ENCODE_FAILURE_MESSAGE: &str =
    "Cannot encode response into JSON format, please contact the administrator.";

/// The request body could not be decoded into the requested type.
///
/// Converts into [`E400`] via `?` inside a business handler.
#[derive(Debug, thiserror::Error)]
#[error("decode request body: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

impl DecodeError {
    /// `true` when the body ended before a complete value was read, which
    /// includes an empty body.
    pub fn is_eof(&self) -> bool {
        self.0.is_eof()
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        tracing::debug!(error = %err, "request body rejected");
        ApiError::Structured(E400)
    }
}

/// JSON decoder over the request body.
pub struct Decoder<'a> {
    body: &'a mut dyn Read,
    buf: Vec<u8>,
    pos: usize,
    filled: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(body: &'a mut dyn Read) -> Self {
        Self { body, buf: Vec::new(), pos: 0, filled: false }
    }

    fn fill(&mut self) -> Result<(), DecodeError> {
        if !self.filled {
            self.body.read_to_end(&mut self.buf).map_err(serde_json::Error::io)?;
            self.filled = true;
        }
        Ok(())
    }

    /// Decodes the next JSON value from the body.
    ///
    /// On failure nothing is consumed.
    pub fn decode<T: DeserializeOwned>(&mut self) -> Result<T, DecodeError> {
        self.fill()?;
        let rest = &self.buf[self.pos..];
        let mut values = serde_json::Deserializer::from_slice(rest).into_iter::<T>();
        match values.next() {
            Some(Ok(value)) => {
                self.pos += values.byte_offset();
                Ok(value)
            }
            Some(Err(e)) => Err(e.into()),
            // Only whitespace left: let the parser report the EOF.
            None => Ok(serde_json::from_slice(rest)?),
        }
    }

    /// Takes every byte not consumed by [`decode`](Self::decode) yet, raw.
    ///
    /// For bodies that are not JSON, e.g. an `application/x-www-form-urlencoded`
    /// post. Later calls return an empty slice.
    pub fn rest(&mut self) -> Result<&[u8], DecodeError> {
        self.fill()?;
        let start = self.pos;
        self.pos = self.buf.len();
        Ok(&self.buf[start..])
    }
}

/// Serializes `value` into memory first, so a failure never leaves a partial
/// body behind.
pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(value)
}

/// JSON string literal for `s`, quotes and escapes included.
pub(crate) fn encode_str(s: &str) -> Vec<u8> {
    serde_json::Value::String(s.to_owned()).to_string().into_bytes()
}

/// Writes `s` as a JSON string body.
pub(crate) fn write_str(w: &mut ResponseWriter, s: &str) {
    w.write(&encode_str(s));
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Args {
        name: String,
    }

    #[test]
    fn decodes_successive_values() {
        let mut body: &[u8] = br#"{"name":"a"} {"name":"b"}"#;
        let mut dec = Decoder::new(&mut body);
        assert_eq!(dec.decode::<Args>().unwrap(), Args { name: "a".into() });
        assert_eq!(dec.decode::<Args>().unwrap(), Args { name: "b".into() });
    }

    #[test]
    fn empty_body_is_eof() {
        let mut body: &[u8] = b"";
        let err = Decoder::new(&mut body).decode::<Args>().unwrap_err();
        assert!(err.is_eof());
        assert_eq!(ApiError::from(err), ApiError::Structured(E400));
    }

    #[test]
    fn malformed_body_is_not_eof() {
        let mut body: &[u8] = b"{name:}";
        let err = Decoder::new(&mut body).decode::<Args>().unwrap_err();
        assert!(!err.is_eof());
    }

    #[test]
    fn rest_returns_what_decode_left() {
        let mut body: &[u8] = br#"{"name":"a"} trailing bytes"#;
        let mut dec = Decoder::new(&mut body);
        assert_eq!(dec.decode::<Args>().unwrap(), Args { name: "a".into() });
        assert_eq!(dec.rest().unwrap(), b" trailing bytes");
        assert_eq!(dec.rest().unwrap(), b"");
    }

    #[test]
    fn top_level_numbers_keep_the_following_value() {
        let mut body: &[u8] = b"12 34";
        let mut dec = Decoder::new(&mut body);
        assert_eq!(dec.decode::<u32>().unwrap(), 12);
        assert_eq!(dec.decode::<u32>().unwrap(), 34);
        assert!(dec.decode::<u32>().unwrap_err().is_eof());
    }

    #[test]
    fn failed_decode_consumes_nothing() {
        let mut body: &[u8] = b"name=John";
        let mut dec = Decoder::new(&mut body);
        assert!(dec.decode::<Args>().is_err());
        assert_eq!(dec.rest().unwrap(), b"name=John");
    }

    #[test]
    fn encode_str_quotes_and_escapes() {
        assert_eq!(encode_str("404: Resource not found"), br#""404: Resource not found""#);
        assert_eq!(encode_str("say \"hi\""), br#""say \"hi\"""#);
    }
}
