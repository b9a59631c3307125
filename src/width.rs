// Copyright 2016 The Fancy Regex Authors.
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE.

//! Character widths a pattern can be expressed in.
//!
//! A width fixes the code unit of the pattern text and of the name table. Only
//! two are supported: UTF-8 ([`Narrow`]) and UTF-16 ([`Wide`]).

use std::borrow::{Borrow, Cow};
use std::fmt;

mod private {
    pub trait Sealed {}

    impl Sealed for super::Narrow {}
    impl Sealed for super::Wide {}
}

/// A supported character width.
///
/// This trait is sealed; it is implemented by [`Narrow`] and [`Wide`] only.
pub trait CharWidth: private::Sealed + fmt::Debug + Send + Sync + Sized + 'static {
    /// A single code unit.
    type Unit: Copy + Ord + Default + fmt::Debug + Send + Sync + 'static;
    /// Borrowed pattern text or group name.
    type Str: ?Sized + ToOwned<Owned = Self::Text> + fmt::Debug + 'static;
    /// Owned pattern text or group name.
    type Text: Borrow<Self::Str> + Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    /// Number of units the index field occupies at the start of each name
    /// table entry.
    const TABLE_OFFSET: usize;

    /// View text as its code units.
    fn units(s: &Self::Str) -> &[Self::Unit];

    /// Build owned text from units, `None` if they are not valid in this width.
    fn text_from_units(units: &[Self::Unit]) -> Option<Self::Text>;

    /// Convert text to UTF-8. On failure returns the unit offset of the first
    /// invalid unit.
    fn to_utf8(s: &Self::Str) -> ::std::result::Result<Cow<'_, str>, usize>;

    /// Translate a byte offset into `s` into a unit offset in this width.
    fn offset_from_utf8(s: &str, byte_offset: usize) -> usize;

    /// Append the units of `name`.
    fn push_name(name: &str, out: &mut Vec<Self::Unit>);

    /// Append a name table index field.
    fn push_index(index: u16, out: &mut Vec<Self::Unit>);

    /// Read a name table index field. `field` is `TABLE_OFFSET` units long.
    fn read_index(field: &[Self::Unit]) -> usize;
}

/// UTF-8 text, one byte per unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Narrow;

impl CharWidth for Narrow {
    type Unit = u8;
    type Str = str;
    type Text = String;

    const TABLE_OFFSET: usize = 2;

    #[inline]
    fn units(s: &str) -> &[u8] {
        s.as_bytes()
    }

    fn text_from_units(units: &[u8]) -> Option<String> {
        std::str::from_utf8(units).ok().map(str::to_owned)
    }

    #[inline]
    fn to_utf8(s: &str) -> ::std::result::Result<Cow<'_, str>, usize> {
        Ok(Cow::Borrowed(s))
    }

    #[inline]
    fn offset_from_utf8(_s: &str, byte_offset: usize) -> usize {
        byte_offset
    }

    fn push_name(name: &str, out: &mut Vec<u8>) {
        out.extend_from_slice(name.as_bytes());
    }

    fn push_index(index: u16, out: &mut Vec<u8>) {
        out.extend_from_slice(&index.to_be_bytes());
    }

    #[inline]
    fn read_index(field: &[u8]) -> usize {
        (usize::from(field[0]) << 8) | usize::from(field[1])
    }
}

/// UTF-16 text, one 16-bit code unit per unit.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Wide;

impl CharWidth for Wide {
    type Unit = u16;
    type Str = [u16];
    type Text = Vec<u16>;

    const TABLE_OFFSET: usize = 1;

    #[inline]
    fn units(s: &[u16]) -> &[u16] {
        s
    }

    fn text_from_units(units: &[u16]) -> Option<Vec<u16>> {
        char::decode_utf16(units.iter().copied())
            .all(|c| c.is_ok())
            .then(|| units.to_vec())
    }

    fn to_utf8(s: &[u16]) -> ::std::result::Result<Cow<'_, str>, usize> {
        let mut out = String::with_capacity(s.len());
        let mut offset = 0;
        for c in char::decode_utf16(s.iter().copied()) {
            let c = c.map_err(|_| offset)?;
            offset += c.len_utf16();
            out.push(c);
        }
        Ok(Cow::Owned(out))
    }

    fn offset_from_utf8(s: &str, byte_offset: usize) -> usize {
        s.get(..byte_offset)
            .unwrap_or(s)
            .encode_utf16()
            .count()
    }

    fn push_name(name: &str, out: &mut Vec<u16>) {
        out.extend(name.encode_utf16());
    }

    fn push_index(index: u16, out: &mut Vec<u16>) {
        out.push(index);
    }

    #[inline]
    fn read_index(field: &[u16]) -> usize {
        usize::from(field[0])
    }
}
