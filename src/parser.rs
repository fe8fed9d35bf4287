use nom::{IResult, Parser as _, bytes::complete::take, number::complete::u8};

use crate::{Class, Error, Token, map_nom_error};

/// Maximum TLV nesting depth the parser will follow.
pub const MAX_DEPTH: usize = 12;

// X.690 8.1.2: identifier octet layout
const CONSTRUCTED_BIT: u8 = 1 << 5;
const TAG_MASK: u8 = (1 << 5) - 1;
const MULTIPART_TAG: u32 = 31;
const MULTIPART_VALUE_MASK: u8 = (1 << 7) - 1;
const MULTIPART_CONTINUATION: u8 = 1 << 7;

// X.690 8.1.3.5: length octet layout
const LENGTH_LONG_FORM: u8 = 1 << 7;
const LENGTH_MASK: u8 = (1 << 7) - 1;
const LENGTH_LONG_RESERVED: usize = (1 << 7) - 1;

/// Identifier octets: class, primitive flag and tag number (8.1.2).
fn identifier(input: &[u8]) -> IResult<&[u8], (Class, bool, u32), Error> {
    let (mut input, lead) = u8(input)?;

    let class = Class::from_bits(lead);
    let primitive = lead & CONSTRUCTED_BIT == 0;

    let mut tag = u32::from(lead & TAG_MASK);
    if tag == MULTIPART_TAG {
        // 8.1.2.4.2: seven bits per subsequent octet, high bit set on all
        // but the last
        tag = 0;
        let mut bits = 0;
        loop {
            let (rest, byte) = u8(input)?;
            input = rest;

            bits += 7;
            if bits > u32::BITS {
                return Err(nom::Err::Failure(Error::Memory));
            }
            tag = (tag << 7) | u32::from(byte & MULTIPART_VALUE_MASK);

            if byte & MULTIPART_CONTINUATION == 0 {
                break;
            }
        }
    }

    Ok((input, (class, primitive, tag)))
}

/// Length octets, definite form only (8.1.3).
fn content_length(input: &[u8]) -> IResult<&[u8], usize, Error> {
    let (input, lead) = u8(input)?;

    if lead & LENGTH_LONG_FORM == 0 {
        return Ok((input, usize::from(lead & LENGTH_MASK)));
    }

    let count = usize::from(lead & LENGTH_MASK);
    if count == LENGTH_LONG_RESERVED {
        // 8.1.3.5 (c)
        return Err(nom::Err::Failure(Error::Invalid));
    }
    if count == 0 {
        // 8.1.3.6: indefinite form, forbidden in DER
        return Err(nom::Err::Failure(Error::Invalid));
    }
    if count > size_of::<usize>() {
        return Err(nom::Err::Failure(Error::Unsupported));
    }

    let (input, octets) = take(count).parse(input)?;

    let mut length = 0usize;
    for &byte in octets {
        length = (length << 8) | usize::from(byte);
    }
    // 10.1: the minimum number of octets, so no leading zero and no long
    // form for lengths a single short-form octet could carry
    if octets[0] == 0 || length < 0x80 {
        return Err(nom::Err::Failure(Error::Invalid));
    }

    Ok((input, length))
}

/// Streaming DER token parser.
///
/// The parser walks the input depth first. Emitting a constructed token
/// positions the cursor on its first child; [`Parser::descend`] declares
/// that the caller intends to read those children, and
/// [`Parser::skip_children`] jumps over them instead. Whenever the cursor
/// reaches the end of a parent value the parser ascends automatically.
#[derive(Debug)]
pub struct Parser<'a> {
    input: &'a [u8],
    /// Offset of the next byte to decode.
    pos: usize,
    /// End offsets of the enclosing values; `parents[0]` is the input end.
    parents: [usize; MAX_DEPTH],
    depth: usize,
    /// Depth the caller has committed to via `descend`/`ascend`.
    constraint: usize,
}

impl<'a> Parser<'a> {
    /// Create a parser over `input`. Empty input is rejected.
    pub fn new(input: &'a [u8]) -> Result<Self, Error> {
        if input.is_empty() {
            return Err(Error::Invalid);
        }

        let mut parents = [0; MAX_DEPTH];
        parents[0] = input.len();

        Ok(Self { input, pos: 0, parents, depth: 0, constraint: 0 })
    }

    /// Emit the next token, or `None` once the current level is exhausted.
    ///
    /// After any error the parser state is undefined and the parser must
    /// not be used further.
    pub fn next(&mut self) -> Result<Option<Token<'a>>, Error> {
        let parent = self.parents[self.depth];

        if self.pos == parent {
            return Ok(None);
        }
        if self.pos > parent {
            return Err(Error::Invalid);
        }
        // A pending descent must be consumed at the declared depth
        if self.constraint > 0 && self.constraint != self.depth {
            return Err(Error::Invalid);
        }

        let window = &self.input[self.pos..parent];
        let (rest, (class, primitive, tag)) = map_nom_error(identifier(window))?;
        let (rest, length) = map_nom_error(content_length(rest))?;
        self.pos += window.len() - rest.len();

        let end = self.pos.checked_add(length).ok_or(Error::Invalid)?;

        // A top-level token must fill the whole input; nested tokens must
        // stay inside their parent
        if self.depth == 0 && end != parent {
            return Err(Error::Invalid);
        }
        if end > parent {
            return Err(Error::Invalid);
        }

        let token = Token { class, tag, primitive, value: &self.input[self.pos..end], end };

        if primitive {
            self.pos = end;
        } else {
            self.depth += 1;
            if self.depth >= MAX_DEPTH {
                return Err(Error::Invalid);
            }
            self.parents[self.depth] = end;
        }

        self.update_depth();

        Ok(Some(token))
    }

    /// Declare that the next token is to be read one level deeper than the
    /// previously declared level.
    pub fn descend(&mut self) -> Result<(), Error> {
        if self.constraint >= MAX_DEPTH {
            return Err(Error::Invalid);
        }
        self.constraint += 1;
        Ok(())
    }

    /// Release `levels` levels of previous descents. Ascending past the
    /// root is rejected.
    pub fn ascend(&mut self, levels: usize) -> Result<(), Error> {
        if levels > self.constraint {
            return Err(Error::Invalid);
        }
        self.constraint -= levels;
        Ok(())
    }

    /// Jump over the children of `token`, which must be the most recently
    /// emitted token. Primitive tokens have no children to skip.
    pub fn skip_children(&mut self, token: &Token<'a>) {
        if !token.primitive {
            self.pos = token.end;
            self.update_depth();
        }
    }

    /// True while the cursor is inside `token`'s value.
    pub fn is_within(&self, token: &Token<'a>) -> bool {
        self.pos < token.end
    }

    fn update_depth(&mut self) {
        // Ascend out of every parent that ends exactly here
        while self.depth > 1 && self.pos == self.parents[self.depth] {
            self.depth -= 1;
        }
    }
}
