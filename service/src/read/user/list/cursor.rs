//! Opaque [`Token`]s representing list [`Cursor`]s.
//!
//! A [`Cursor`] is serialized as `<created_at>,<id>,<offset>` payload, where
//! `created_at` is an unpadded `Y-M-D H:M:S[.micros]` UTC timestamp. The
//! payload is signed with a truncated HMAC-SHA256 tag, and both are encoded
//! as URL-safe base64 joined with a dot.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use derive_more::{AsRef, Debug, Display, Error, From, Into};
use hmac::{Hmac, Mac as _};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::domain::user;

use super::Cursor;

/// Length of a truncated HMAC tag in bytes.
const TAG_LENGTH: usize = 16;

/// Opaque [`Cursor`] representation handed out to clients.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Into,
    PartialEq,
    Serialize,
)]
#[as_ref(str)]
pub struct Token(String);

/// Codec of [`Cursor`]s into [`Token`]s.
#[derive(Clone, Debug)]
pub struct Codec {
    /// HMAC keyed with the secret of this [`Codec`].
    #[debug(skip)]
    mac: Hmac<Sha256>,
}

impl Codec {
    /// Creates a new [`Codec`] signing [`Token`]s with the provided `secret`.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            mac: Hmac::new_from_slice(secret.as_ref())
                .expect("HMAC accepts keys of any length"),
        }
    }

    /// Encodes the provided [`Cursor`] into a [`Token`].
    #[must_use]
    pub fn encode(&self, cursor: &Cursor) -> Token {
        let Cursor {
            key: (created_at, id),
            offset,
        } = cursor;
        self.sign(&format!("{},{id},{offset}", created_at.to_unpadded()))
    }

    /// Decodes a [`Cursor`] out of the provided [`Token`].
    ///
    /// # Errors
    ///
    /// If the [`Token`] is malformed or wasn't issued by this [`Codec`].
    pub fn decode(&self, token: &Token) -> Result<Cursor, DecodeError> {
        use DecodeError as E;

        let (payload, tag) = token.0.split_once('.').ok_or(E::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| E::Malformed)?;
        let tag = URL_SAFE_NO_PAD.decode(tag).map_err(|_| E::Malformed)?;

        if tag.len() != TAG_LENGTH {
            return Err(E::Tampered);
        }
        let mut mac = self.mac.clone();
        mac.update(&payload);
        mac.verify_truncated_left(&tag).map_err(|_| E::Tampered)?;

        let payload = String::from_utf8(payload).map_err(|_| E::Malformed)?;
        let fields = payload.split(',').collect::<Vec<_>>();
        let [created_at, id, offset] = fields[..] else {
            return Err(E::FieldsCount(fields.len()));
        };

        let created_at = user::CreationDateTime::parse_unpadded(created_at)
            .ok_or(E::Timestamp)?;
        let id = id.parse::<user::Id>().map_err(|_| E::Id)?;
        let offset = offset.parse::<i64>().map_err(|_| E::Offset)?;

        Ok(Cursor {
            key: (created_at, id),
            offset,
        })
    }

    /// Signs the provided `payload` into a [`Token`].
    fn sign(&self, payload: &str) -> Token {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let tag = mac.finalize().into_bytes();

        Token(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload),
            URL_SAFE_NO_PAD.encode(&tag[..TAG_LENGTH]),
        ))
    }
}

/// Error of decoding a [`Token`].
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum DecodeError {
    /// [`Token`] is not a dot-separated base64 pair.
    #[display("`Token` is malformed")]
    Malformed,

    /// [`Token`] signature doesn't match its payload.
    #[display("`Token` signature mismatch")]
    Tampered,

    /// [`Token`] payload has wrong number of fields.
    #[display("`Token` has {_0} fields instead of 3")]
    FieldsCount(#[error(not(source))] usize),

    /// [`Token`] payload has invalid timestamp.
    #[display("`Token` has invalid timestamp")]
    Timestamp,

    /// [`Token`] payload has invalid [`user::Id`].
    #[display("`Token` has invalid `user::Id`")]
    Id,

    /// [`Token`] payload has non-integer offset.
    #[display("`Token` has non-integer offset")]
    Offset,
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::user;

    use super::{Codec, Cursor, DecodeError, Token};

    fn cursor(created_at: &str, offset: i64) -> Cursor {
        Cursor {
            key: (
                DateTime::from_rfc3339(created_at).unwrap().coerce(),
                "6f1c9a0e-3c1b-4d0e-9a57-1f2d3c4b5a69".parse().unwrap(),
            ),
            offset,
        }
    }

    #[test]
    fn decodes_encoded() {
        let codec = Codec::new("secret");

        for c in [
            cursor("2024-01-02T03:04:05Z", 0),
            cursor("2024-11-12T13:14:15.000042Z", 100),
            cursor("1999-12-31T23:59:59.5Z", -5),
        ] {
            assert_eq!(codec.decode(&codec.encode(&c)), Ok(c));
        }
    }

    #[test]
    fn encodes_unpadded_payload() {
        let codec = Codec::new("secret");
        let token = codec.encode(&cursor("2024-01-02T03:04:05Z", 7));

        assert_eq!(
            token,
            codec.sign(
                "2024-1-2 3:4:5,6f1c9a0e-3c1b-4d0e-9a57-1f2d3c4b5a69,7",
            ),
        );
    }

    #[test]
    fn rejects_wrong_fields_count() {
        let codec = Codec::new("secret");

        assert_eq!(
            codec.decode(&codec.sign("2024-1-2 3:4:5,7")),
            Err(DecodeError::FieldsCount(2)),
        );
        assert_eq!(
            codec.decode(&codec.sign(
                "2024-1-2 3:4:5,6f1c9a0e-3c1b-4d0e-9a57-1f2d3c4b5a69,7,8",
            )),
            Err(DecodeError::FieldsCount(4)),
        );
    }

    #[test]
    fn rejects_non_integer_offset() {
        let codec = Codec::new("secret");

        assert_eq!(
            codec.decode(&codec.sign(
                "2024-1-2 3:4:5,6f1c9a0e-3c1b-4d0e-9a57-1f2d3c4b5a69,seven",
            )),
            Err(DecodeError::Offset),
        );
    }

    #[test]
    fn rejects_invalid_key() {
        let codec = Codec::new("secret");

        assert_eq!(
            codec.decode(&codec.sign(
                "yesterday,6f1c9a0e-3c1b-4d0e-9a57-1f2d3c4b5a69,7",
            )),
            Err(DecodeError::Timestamp),
        );
        assert_eq!(
            codec.decode(&codec.sign("2024-1-2 3:4:5,user,7")),
            Err(DecodeError::Id),
        );
    }

    #[test]
    fn rejects_foreign_token() {
        let ours = Codec::new("secret");
        let theirs = Codec::new("another");
        let token = theirs.encode(&cursor("2024-01-02T03:04:05Z", 0));

        assert_eq!(ours.decode(&token), Err(DecodeError::Tampered));
    }

    #[test]
    fn rejects_tampered_payload() {
        let codec = Codec::new("secret");
        let token = codec.encode(&cursor("2024-01-02T03:04:05Z", 0));
        let (_, tag) = token.as_ref().split_once('.').unwrap();
        let forged = codec.sign(
            "2024-1-2 3:4:5,6f1c9a0e-3c1b-4d0e-9a57-1f2d3c4b5a69,100",
        );
        let (payload, _) = forged.as_ref().split_once('.').unwrap();

        assert_eq!(
            codec.decode(&Token::from(format!("{payload}.{tag}"))),
            Err(DecodeError::Tampered),
        );
    }

    #[test]
    fn rejects_garbage() {
        let codec = Codec::new("secret");

        for garbage in ["", "abc", "a.b.c", "!!!.???"] {
            assert_eq!(
                codec.decode(&Token::from(garbage.to_owned())),
                Err(DecodeError::Malformed),
                "accepted `{garbage}`",
            );
        }
    }

    #[test]
    fn accepts_ids_as_keys() {
        let codec = Codec::new("secret");
        let id = user::Id::new();
        let c = Cursor {
            key: (user::CreationDateTime::UNIX_EPOCH, id),
            offset: 3,
        };

        assert_eq!(codec.decode(&codec.encode(&c)).unwrap().key.1, id);
    }
}
