//! Text decoding for the five supported string types.
//!
//! IA5String, VisibleString and T61String are restricted to printable
//! ASCII (`0x20..=0x7F`). X.680 permits control codes in IA5String and
//! code-page switching in T61String, but there is no way to interpret
//! either safely here, so both are rejected. This is a deliberate
//! deviation from the standard.

use core::str;

use crate::{Class, Error, Token, UniversalTag};

// X.680 41.4: letters, digits, space and a small punctuation set
fn printable(byte: u8) -> bool {
    match byte {
        b' ' => true,
        b'*' | b';' | b'<' | b'>' | b'@' => false,
        0x27..=0x7A => true,
        _ => false,
    }
}

impl<'a> Token<'a> {
    /// Decode the token's value as text, borrowed from the input.
    ///
    /// Accepts PrintableString, IA5String, VisibleString, T61String and
    /// UTF8String; every other tag is rejected. UTF-8 content must be
    /// well formed, the other types are validated byte-wise.
    pub fn text(&self) -> Result<&'a str, Error> {
        if self.class() != Class::Universal {
            return Err(Error::Invalid);
        }

        let valid = match UniversalTag::try_from(self.tag()) {
            Ok(UniversalTag::PrintableString) => self.value().iter().all(|&b| printable(b)),
            Ok(UniversalTag::Ia5String | UniversalTag::VisibleString | UniversalTag::T61String) => {
                self.value().iter().all(|&b| (0x20..=0x7F).contains(&b))
            }
            // Checked by the UTF-8 conversion below
            Ok(UniversalTag::Utf8String) => true,
            _ => return Err(Error::Invalid),
        };
        if !valid {
            return Err(Error::Invalid);
        }

        str::from_utf8(self.value()).map_err(|_| Error::Invalid)
    }

    /// True if the token decodes as text equal to `expected`.
    pub fn text_eq(&self, expected: &str) -> bool {
        self.text() == Ok(expected)
    }
}
