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

//! The default engine, built on the [regex] crate.
//!
//! [regex]: https://crates.io/crates/regex

use regex::{Regex, RegexBuilder};
use regex_syntax::ParserBuilder;

use crate::engine::{Engine, Info};
use crate::error::{CompileError, CompileErrorKind, QueryError};
use crate::name_table::{NameTableBuf, NameTableBuilder};
use crate::width::CharWidth;
use crate::Options;

/// An [`Engine`] that compiles patterns with the `regex` crate.
///
/// Syntax is checked with `regex-syntax` first so that errors carry the
/// position where parsing stopped.
#[derive(Copy, Clone, Debug, Default)]
pub struct RegexEngine;

/// A pattern compiled by [`RegexEngine`].
#[derive(Debug)]
pub struct Compiled<W: CharWidth> {
    regex: Regex,
    names: NameTableBuf<W>,
}

impl<W: CharWidth> Compiled<W> {
    /// The compiled regex, for matching.
    #[must_use]
    #[inline]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl<W: CharWidth> Engine<W> for RegexEngine {
    type Handle = Compiled<W>;

    fn compile(&self, text: &W::Str, options: &Options) -> Result<Compiled<W>, CompileError> {
        let pattern = W::to_utf8(text).map_err(|offset| {
            CompileError::new(
                CompileErrorKind::InvalidEncoding,
                Some(offset),
                Some("pattern contains an unpaired surrogate".to_string()),
            )
        })?;

        check_syntax::<W>(&pattern, options)?;
        let regex = regex_builder(&pattern, options)
            .build()
            .map_err(|err| match err {
                regex::Error::CompiledTooBig(limit) => CompileError::new(
                    CompileErrorKind::SizeLimit,
                    None,
                    Some(format!("compiled pattern exceeds size limit of {limit}")),
                ),
                regex::Error::Syntax(message) => {
                    CompileError::new(CompileErrorKind::Syntax, None, Some(message))
                }
                err => CompileError::new(CompileErrorKind::Other, None, Some(err.to_string())),
            })?;

        let mut names = NameTableBuilder::new();
        for (index, name) in regex.capture_names().enumerate() {
            if let Some(name) = name {
                names.push(index, name)?;
            }
        }
        let names = names.build();
        log::trace!(
            "compiled {:?}: {} groups, {} named",
            pattern,
            regex.captures_len() - 1,
            names.len()
        );

        Ok(Compiled { regex, names })
    }

    fn release(&self, handle: Compiled<W>) {
        log::trace!("releasing {:?}", handle.regex.as_str());
        drop(handle);
    }

    fn query_int(&self, handle: &Compiled<W>, what: Info) -> Result<usize, QueryError> {
        Ok(match what {
            // the regex crate counts the implicit group for the whole match
            Info::CaptureCount => handle.regex.captures_len() - 1,
            Info::NameCount => handle.names.len(),
            Info::NameEntrySize => handle.names.stride(),
        })
    }

    fn name_table<'h>(&self, handle: &'h Compiled<W>) -> Result<&'h [W::Unit], QueryError> {
        Ok(handle.names.as_units())
    }

    fn resolve_name(
        &self,
        handle: &Compiled<W>,
        name: &W::Str,
    ) -> Result<Option<usize>, QueryError> {
        Ok(handle.names.as_table().find(W::units(name)))
    }
}

fn check_syntax<W: CharWidth>(pattern: &str, options: &Options) -> Result<(), CompileError> {
    let mut builder = ParserBuilder::new();
    builder
        .case_insensitive(options.case_insensitive)
        .multi_line(options.multi_line)
        .dot_matches_new_line(options.dot_matches_new_line)
        .ignore_whitespace(options.ignore_whitespace)
        .swap_greed(options.swap_greed)
        .unicode(options.unicode);
    if let Some(limit) = options.nest_limit {
        builder.nest_limit(limit);
    }

    builder.build().parse(pattern).map(drop).map_err(|err| {
        let (offset, message) = match &err {
            regex_syntax::Error::Parse(err) => (Some(err.span().start.offset), err.kind().to_string()),
            regex_syntax::Error::Translate(err) => {
                (Some(err.span().start.offset), err.kind().to_string())
            }
            _ => (None, err.to_string()),
        };
        CompileError::new(
            CompileErrorKind::Syntax,
            offset.map(|offset| W::offset_from_utf8(pattern, offset)),
            Some(message),
        )
    })
}

fn regex_builder(pattern: &str, options: &Options) -> RegexBuilder {
    let mut builder = RegexBuilder::new(pattern);
    builder
        .case_insensitive(options.case_insensitive)
        .multi_line(options.multi_line)
        .dot_matches_new_line(options.dot_matches_new_line)
        .ignore_whitespace(options.ignore_whitespace)
        .swap_greed(options.swap_greed)
        .unicode(options.unicode);
    if let Some(limit) = options.size_limit {
        builder.size_limit(limit);
    }
    if let Some(limit) = options.nest_limit {
        builder.nest_limit(limit);
    }
    builder
}
