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

//! The contract a matching engine fulfils for [`BasicPattern`](crate::BasicPattern).
//!
//! An engine compiles pattern text into an opaque handle, answers questions
//! about the handle, and takes the handle back when the pattern is dropped.
//! Matching is the engine's business and is not part of this contract.

use crate::error::{CompileError, QueryError};
use crate::width::CharWidth;
use crate::Options;

/// Integer properties of a compiled pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Info {
    /// Number of capturing groups, not counting the implicit whole match.
    CaptureCount,
    /// Number of entries in the name table, i.e. the number of named groups.
    NameCount,
    /// Width of one name table entry, in code units.
    NameEntrySize,
}

/// A regex engine that hands out compiled pattern handles.
///
/// Handles are released exactly once through [`Engine::release`]. Queries
/// never mutate a handle, so an engine whose queries are reentrant can be
/// shared across threads together with its handles.
pub trait Engine<W: CharWidth> {
    /// The compiled pattern.
    type Handle;

    /// Compile `text` with `options`.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileError`] if the engine rejects the pattern.
    fn compile(&self, text: &W::Str, options: &Options) -> Result<Self::Handle, CompileError>;

    /// Give a handle back to the engine.
    fn release(&self, handle: Self::Handle);

    /// Answer an integer property of a compiled pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the property is unknown to the engine or
    /// could not be determined.
    fn query_int(&self, handle: &Self::Handle, what: Info) -> Result<usize, QueryError>;

    /// The raw name table of a compiled pattern, see
    /// [`NameTable`](crate::NameTable) for its layout.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the table is not available.
    fn name_table<'h>(&self, handle: &'h Self::Handle) -> Result<&'h [W::Unit], QueryError>;

    /// Resolve a group name to its 1-based index, `Ok(None)` if no group has
    /// that name.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if the lookup itself failed.
    fn resolve_name(&self, handle: &Self::Handle, name: &W::Str)
        -> Result<Option<usize>, QueryError>;
}
