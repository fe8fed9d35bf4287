#![cfg_attr(not(feature = "std"), no_std)]

//! A zero-copy token walker for the DER subset of ASN.1 (ITU X.690).
//!
//! The parser turns a fully-resident byte slice into a stream of typed
//! [`Token`]s without allocating: token values are borrowed windows into the
//! input, and every decoder writes into caller-owned storage or returns
//! borrowed slices. All input is treated as adversarial; non-canonical
//! encodings (indefinite lengths, non-minimal length octets, padded OID
//! subidentifiers, sloppy bit-string padding) are rejected rather than
//! normalized.
//!
//! ```
//! use der_walk::{Parser, UniversalTag};
//!
//! // SEQUENCE { INTEGER 42 }
//! let input = [0x30, 0x03, 0x02, 0x01, 0x2A];
//!
//! let mut parser = Parser::new(&input)?;
//! let sequence = parser.next()?.unwrap();
//! assert!(sequence.is_universal(UniversalTag::Sequence));
//!
//! parser.descend()?;
//! let answer = parser.next()?.unwrap();
//! assert_eq!(answer.int()?, 42);
//! # Ok::<(), der_walk::Error>(())
//! ```
//!
//! BER-only constructs are out of scope: indefinite lengths, constructed
//! encodings of primitive types and non-UTC time offsets all decode as
//! [`Error::Invalid`].

use nom::IResult;

mod bitstring;
mod oid;
mod parser;
mod text;
mod time;
mod token;
mod value;


pub use oid::{OID_MAX_ARCS, Oid};
pub use parser::{MAX_DEPTH, Parser};
pub use time::UnixTime;
pub use token::{Class, Token, UniversalTag};

/// Decoding errors.
///
/// `Ok` results carry the decoded value; end of input is signalled by
/// [`Parser::next`] returning `Ok(None)`, not by an error. Once
/// [`Parser::next`] has failed, the parser state is undefined and must not
/// be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Malformed or non-canonical input: structural bounds violations,
    /// forbidden byte values, non-minimal encodings, calendar mismatches.
    Invalid,
    /// A caller-provided output buffer is too small, or an encoded value
    /// does not fit its machine-word target.
    Memory,
    /// A length field is wider than the native length word.
    Unsupported,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Error::Invalid => "malformed DER",
            Error::Memory => "value or output exceeds capacity",
            Error::Unsupported => "unsupported length width",
        })
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl<I> nom::error::ParseError<I> for Error {
    fn from_error_kind(_input: I, _kind: nom::error::ErrorKind) -> Self {
        Error::Invalid
    }

    fn append(_input: I, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

pub(crate) fn map_nom_error<I, T>(result: IResult<I, T, Error>) -> Result<(I, T), Error> {
    match result {
        Ok(output) => Ok(output),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(e),
        Err(nom::Err::Incomplete(_)) => Err(Error::Invalid),
    }
}
