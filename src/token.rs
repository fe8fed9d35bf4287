use core::fmt;

use derive_try_from_primitive::TryFromPrimitive;
#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

/// Tag class of a TLV, from the top two bits of the identifier octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    /// Universal (0b00)
    Universal,
    /// Application (0b01)
    Application,
    /// Context-specific (0b10)
    ContextSpecific,
    /// Private (0b11)
    Private,
}

impl Class {
    pub(crate) const fn from_bits(byte: u8) -> Self {
        match byte & 0b11_000000 {
            0b00_000000 => Class::Universal,
            0b01_000000 => Class::Application,
            0b10_000000 => Class::ContextSpecific,
            _ => Class::Private,
        }
    }
}

/// Universal-class tag numbers recognized by the decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u32)]
#[non_exhaustive]
#[rustfmt::skip]
pub enum UniversalTag {
  Bool            =  1,
  Int             =  2,
  BitString       =  3,
  OctetString     =  4,
  Null            =  5,
  Oid             =  6,
  Utf8String      = 12,
  Sequence        = 16,
  Set             = 17,
  PrintableString = 19,
  T61String       = 20,
  Ia5String       = 22,
  UtcTime         = 23,
  GeneralizedTime = 24,
  VisibleString   = 26,
}

impl UniversalTag {
    /// ASN.1 notation name of the type.
    #[rustfmt::skip]
    pub const fn name(self) -> &'static str {
        match self {
            UniversalTag::Bool            => "BOOLEAN",
            UniversalTag::Int             => "INTEGER",
            UniversalTag::BitString       => "BIT STRING",
            UniversalTag::OctetString     => "OCTET STRING",
            UniversalTag::Null            => "NULL",
            UniversalTag::Oid             => "OBJECT IDENTIFIER",
            UniversalTag::Utf8String      => "UTF8String",
            UniversalTag::Sequence        => "SEQUENCE",
            UniversalTag::Set             => "SET",
            UniversalTag::PrintableString => "PrintableString",
            UniversalTag::T61String       => "T61String",
            UniversalTag::Ia5String       => "IA5String",
            UniversalTag::UtcTime         => "UTCTime",
            UniversalTag::GeneralizedTime => "GeneralizedTime",
            UniversalTag::VisibleString   => "VisibleString",
        }
    }
}

impl fmt::Display for UniversalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "serde")]
impl Serialize for UniversalTag {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

/// A single TLV view into a DER input.
///
/// The value is a borrowed window over the parsed input; tokens own no
/// storage and stay valid for as long as the input slice does.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub(crate) class: Class,
    pub(crate) tag: u32,
    pub(crate) primitive: bool,
    pub(crate) value: &'a [u8],
    /// Offset of the first byte past the value, within the parser input.
    pub(crate) end: usize,
}

impl<'a> Token<'a> {
    pub const fn class(&self) -> Class {
        self.class
    }

    /// Raw tag number within the token's class.
    pub const fn tag(&self) -> u32 {
        self.tag
    }

    /// True if the value is final content, false if it holds nested TLVs.
    pub const fn is_primitive(&self) -> bool {
        self.primitive
    }

    /// Content bytes of the token. Empty for zero-length tokens.
    pub const fn value(&self) -> &'a [u8] {
        self.value
    }

    pub const fn len(&self) -> usize {
        self.value.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn is(&self, class: Class, tag: u32) -> bool {
        self.class == class && self.tag == tag
    }

    pub fn is_universal(&self, tag: UniversalTag) -> bool {
        self.class == Class::Universal && self.tag == tag as u32
    }

    pub fn is_int(&self) -> bool {
        self.is_universal(UniversalTag::Int)
    }

    pub fn is_bool(&self) -> bool {
        self.is_universal(UniversalTag::Bool)
    }

    pub fn is_oid(&self) -> bool {
        self.is_universal(UniversalTag::Oid)
    }

    /// True for both time types, UTCTime and GeneralizedTime.
    pub fn is_time(&self) -> bool {
        self.is_universal(UniversalTag::UtcTime) || self.is_universal(UniversalTag::GeneralizedTime)
    }

    /// True for the five decodable string types.
    pub fn is_string(&self) -> bool {
        self.class == Class::Universal
            && matches!(
                UniversalTag::try_from(self.tag),
                Ok(UniversalTag::PrintableString
                    | UniversalTag::Ia5String
                    | UniversalTag::Utf8String
                    | UniversalTag::VisibleString
                    | UniversalTag::T61String)
            )
    }

    /// Name of the token's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        if self.class != Class::Universal {
            return "NON-UNIVERSAL";
        }
        match UniversalTag::try_from(self.tag) {
            Ok(tag) => tag.name(),
            Err(_) => "UNKNOWN",
        }
    }
}

impl PartialEq for Token<'_> {
    /// Structural equality: class, tag, primitive flag and value bytes.
    /// Position within the input does not participate.
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class
            && self.tag == other.tag
            && self.primitive == other.primitive
            && self.value == other.value
    }
}

impl Eq for Token<'_> {}
