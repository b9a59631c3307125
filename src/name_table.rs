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

//! The group name table.
//!
//! A name table is a flat array of code units holding one fixed-width entry
//! per named group:
//!
//! ```text
//! | index field (TABLE_OFFSET units) | name units ... | NUL | NUL padding |
//! |<----------------------------- stride ------------------------------>|
//! ```
//!
//! The index field is big-endian for narrow tables and a single unit for wide
//! ones. Entries are sorted by their name units, so lookups can bisect and the
//! names come out in alphabetical order rather than in group order.

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::slice::ChunksExact;

use crate::error::{CompileError, CompileErrorKind, QueryError};
use crate::width::CharWidth;

/// Collects named groups and lays them out as a name table.
#[derive(Debug)]
pub struct NameTableBuilder<W: CharWidth> {
    entries: Vec<(Vec<W::Unit>, u16)>,
}

impl<W: CharWidth> Default for NameTableBuilder<W> {
    fn default() -> Self {
        NameTableBuilder {
            entries: Vec::new(),
        }
    }
}

impl<W: CharWidth> NameTableBuilder<W> {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the group `index` named `name`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileErrorKind::NameTableOverflow`] error if `index` does
    /// not fit in the index field.
    pub fn push(&mut self, index: usize, name: &str) -> Result<&mut Self, CompileError> {
        let index = u16::try_from(index).map_err(|_| {
            CompileError::new(
                CompileErrorKind::NameTableOverflow,
                None,
                Some(format!("group {index} ('{name}') cannot be stored in the name table")),
            )
        })?;
        let mut units = Vec::with_capacity(name.len());
        W::push_name(name, &mut units);
        self.entries.push((units, index));
        Ok(self)
    }

    /// Lay out the table.
    #[must_use]
    pub fn build(mut self) -> NameTableBuf<W> {
        self.entries.sort();
        let count = self.entries.len();
        let stride = self
            .entries
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .map_or(0, |longest| W::TABLE_OFFSET + longest + 1);

        let mut data = Vec::with_capacity(count * stride);
        for (name, index) in &self.entries {
            let start = data.len();
            W::push_index(*index, &mut data);
            data.extend_from_slice(name);
            data.resize(start + stride, W::Unit::default());
        }
        NameTableBuf {
            data,
            stride,
            count,
        }
    }
}

/// An owned, laid out name table.
#[derive(Debug, Clone)]
pub struct NameTableBuf<W: CharWidth> {
    data: Vec<W::Unit>,
    stride: usize,
    count: usize,
}

impl<W: CharWidth> NameTableBuf<W> {
    /// The raw table.
    #[must_use]
    pub fn as_units(&self) -> &[W::Unit] {
        &self.data
    }

    /// Width of one entry, 0 for an empty table.
    #[must_use]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Borrow as a [`NameTable`].
    #[must_use]
    pub fn as_table(&self) -> NameTable<'_, W> {
        NameTable {
            data: &self.data,
            stride: self.stride,
            count: self.count,
        }
    }
}

/// A validated view of a name table.
///
/// Every entry is known to lie within the table and to hold a non-empty,
/// NUL-terminated name.
#[derive(Debug)]
pub struct NameTable<'t, W: CharWidth> {
    data: &'t [W::Unit],
    stride: usize,
    count: usize,
}

impl<'t, W: CharWidth> Clone for NameTable<'t, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'t, W: CharWidth> Copy for NameTable<'t, W> {}

impl<'t, W: CharWidth> NameTable<'t, W> {
    /// Check that `data` holds `count` entries of `stride` units each.
    ///
    /// Units past the last entry are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MalformedNameTable`] if the entries overrun
    /// `data`, if `stride` leaves no room for a name, or if an entry has no
    /// NUL-terminated name.
    pub fn new(data: &'t [W::Unit], stride: usize, count: usize) -> Result<Self, QueryError> {
        if count == 0 {
            return Ok(NameTable {
                data: &data[..0],
                stride,
                count,
            });
        }
        if stride <= W::TABLE_OFFSET {
            return Err(QueryError::MalformedNameTable(format!(
                "entry size {stride} leaves no room for a name"
            )));
        }
        let len = count
            .checked_mul(stride)
            .filter(|&len| len <= data.len())
            .ok_or_else(|| {
                QueryError::MalformedNameTable(format!(
                    "{count} entries of {stride} units overrun a table of {} units",
                    data.len()
                ))
            })?;

        let table = NameTable {
            data: &data[..len],
            stride,
            count,
        };
        for (i, raw) in table.chunks().enumerate() {
            match name_len::<W>(&raw[W::TABLE_OFFSET..]) {
                Some(n) if n > 0 => {}
                Some(_) => {
                    return Err(QueryError::MalformedNameTable(format!(
                        "entry {i} has an empty name"
                    )))
                }
                None => {
                    return Err(QueryError::MalformedNameTable(format!(
                        "entry {i} is not NUL-terminated"
                    )))
                }
            }
        }
        Ok(table)
    }

    /// Number of entries.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the table has no entries.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Width of one entry.
    #[must_use]
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Iterate over the entries in table order.
    #[must_use]
    pub fn iter(&self) -> NameEntries<'t, W> {
        NameEntries {
            chunks: self.chunks(),
            _width: PhantomData,
        }
    }

    /// The entry at position `i` in table order.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<NameEntry<'t, W>> {
        if i >= self.count {
            return None;
        }
        Some(NameEntry::parse(
            &self.data[i * self.stride..(i + 1) * self.stride],
        ))
    }

    /// Look up the group index for `name` by bisecting the table.
    #[must_use]
    pub fn find(&self, name: &[W::Unit]) -> Option<usize> {
        let (mut lo, mut hi) = (0, self.count);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let entry = self.get(mid)?;
            match entry.name.cmp(name) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Some(entry.index),
            }
        }
        None
    }

    /// Decode every name, in table order.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::MalformedNameTable`] if a name is not valid text
    /// in this width.
    pub fn names(&self) -> Result<Vec<W::Text>, QueryError> {
        self.iter()
            .map(|entry| {
                entry.to_text().ok_or_else(|| {
                    QueryError::MalformedNameTable(format!(
                        "name of group {} is not valid text",
                        entry.index
                    ))
                })
            })
            .collect()
    }

    fn chunks(&self) -> ChunksExact<'t, W::Unit> {
        // stride is only 0 for an empty table, and chunks_exact rejects 0
        self.data.chunks_exact(self.stride.max(1))
    }
}

impl<'a, 't, W: CharWidth> IntoIterator for &'a NameTable<'t, W> {
    type Item = NameEntry<'t, W>;
    type IntoIter = NameEntries<'t, W>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn name_len<W: CharWidth>(units: &[W::Unit]) -> Option<usize> {
    units.iter().position(|&u| u == W::Unit::default())
}

/// One entry of a [`NameTable`].
#[derive(Debug)]
pub struct NameEntry<'t, W: CharWidth> {
    index: usize,
    name: &'t [W::Unit],
}

impl<'t, W: CharWidth> Clone for NameEntry<'t, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'t, W: CharWidth> Copy for NameEntry<'t, W> {}

impl<'t, W: CharWidth> NameEntry<'t, W> {
    fn parse(raw: &'t [W::Unit]) -> Self {
        let (field, rest) = raw.split_at(W::TABLE_OFFSET);
        let len = name_len::<W>(rest).unwrap_or(rest.len());
        NameEntry {
            index: W::read_index(field),
            name: &rest[..len],
        }
    }

    /// The 1-based index of the group.
    #[must_use]
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The name's units, without the terminating NUL.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'t [W::Unit] {
        self.name
    }

    /// The name as owned text, `None` if it is not valid in this width.
    #[must_use]
    pub fn to_text(&self) -> Option<W::Text> {
        W::text_from_units(self.name)
    }
}

/// Iterator over the entries of a [`NameTable`].
#[derive(Debug)]
pub struct NameEntries<'t, W: CharWidth> {
    chunks: ChunksExact<'t, W::Unit>,
    _width: PhantomData<W>,
}

impl<'t, W: CharWidth> Iterator for NameEntries<'t, W> {
    type Item = NameEntry<'t, W>;

    fn next(&mut self) -> Option<Self::Item> {
        self.chunks.next().map(NameEntry::parse)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<'t, W: CharWidth> DoubleEndedIterator for NameEntries<'t, W> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.chunks.next_back().map(NameEntry::parse)
    }
}

impl<'t, W: CharWidth> ExactSizeIterator for NameEntries<'t, W> {
    fn len(&self) -> usize {
        self.chunks.len()
    }
}

impl<'t, W: CharWidth> FusedIterator for NameEntries<'t, W> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::width::{Narrow, Wide};
    use matches::assert_matches;

    fn narrow(entries: &[(usize, &str)]) -> NameTableBuf<Narrow> {
        let mut builder = NameTableBuilder::new();
        for &(index, name) in entries {
            builder.push(index, name).unwrap();
        }
        builder.build()
    }

    #[test]
    fn layout() {
        let buf = narrow(&[(2, "bb"), (1, "a")]);
        assert_eq!(buf.stride(), 2 + 2 + 1);
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.as_units(), b"\x00\x01a\x00\x00\x00\x02bb\x00");
    }

    #[test]
    fn empty_table() {
        let buf = narrow(&[]);
        assert_eq!(buf.stride(), 0);
        assert!(buf.is_empty());
        let table = buf.as_table();
        assert!(table.is_empty());
        assert_eq!(table.iter().count(), 0);
        assert_eq!(table.find(b"a"), None);
        assert_eq!(table.names().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn sorted_by_name() {
        let buf = narrow(&[(1, "zeta"), (2, "alpha"), (3, "mu")]);
        let table = buf.as_table();
        assert_eq!(table.names().unwrap(), ["alpha", "mu", "zeta"]);
        let indices: Vec<_> = table.iter().map(|e| e.index()).collect();
        assert_eq!(indices, [2, 3, 1]);
        assert_eq!(table.iter().rev().next().unwrap().index(), 1);
    }

    #[test]
    fn find_bisects() {
        let buf = narrow(&[(4, "d"), (1, "a"), (3, "c"), (2, "b"), (5, "e")]);
        let table = buf.as_table();
        for (name, index) in [("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5)].iter() {
            assert_eq!(table.find(name.as_bytes()), Some(*index));
        }
        assert_eq!(table.find(b"ab"), None);
        assert_eq!(table.find(b""), None);
        assert_eq!(table.find(b"f"), None);
    }

    #[test]
    fn wide_layout() {
        let mut builder = NameTableBuilder::<Wide>::new();
        builder.push(1, "b").unwrap().push(2, "a").unwrap();
        let buf = builder.build();
        assert_eq!(buf.stride(), 1 + 1 + 1);
        assert_eq!(buf.as_units(), [2, 'a' as u16, 0, 1, 'b' as u16, 0]);
        let names = buf.as_table().names().unwrap();
        assert_eq!(names, [vec!['a' as u16], vec!['b' as u16]]);
    }

    #[test]
    fn index_overflow() {
        let mut builder = NameTableBuilder::<Narrow>::new();
        let err = builder.push(70_000, "big").unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::NameTableOverflow);
    }

    #[test]
    fn overrun_is_rejected() {
        let buf = narrow(&[(1, "a"), (2, "b")]);
        let result = NameTable::<Narrow>::new(buf.as_units(), buf.stride(), 3);
        assert_matches!(result, Err(QueryError::MalformedNameTable(_)));
    }

    #[test]
    fn fewer_entries_than_table() {
        let buf = narrow(&[(1, "a"), (2, "b")]);
        let table = NameTable::<Narrow>::new(buf.as_units(), buf.stride(), 1).unwrap();
        assert_eq!(table.names().unwrap(), ["a"]);
    }

    #[test]
    fn tiny_stride_is_rejected() {
        let result = NameTable::<Narrow>::new(b"\x00\x01", 2, 1);
        assert_matches!(result, Err(QueryError::MalformedNameTable(_)));
    }

    #[test]
    fn unterminated_name_is_rejected() {
        let result = NameTable::<Narrow>::new(b"\x00\x01ab", 4, 1);
        assert_matches!(result, Err(QueryError::MalformedNameTable(_)));
    }

    #[test]
    fn empty_name_is_rejected() {
        let result = NameTable::<Narrow>::new(b"\x00\x01\x00\x00", 4, 1);
        assert_matches!(result, Err(QueryError::MalformedNameTable(_)));
    }

    #[test]
    fn invalid_utf8_name() {
        let table = NameTable::<Narrow>::new(b"\x00\x01\xff\x00", 4, 1).unwrap();
        assert_matches!(table.names(), Err(QueryError::MalformedNameTable(_)));
    }
}
