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

/*!
Owned handles to compiled regular expressions, with capture group introspection.

A [`BasicPattern`] compiles its text through an [`Engine`] and holds the resulting
handle until it is dropped, at which point the handle goes back to the engine
exactly once. While alive it answers how many capturing groups the pattern has,
which of them are named, and which index a name refers to.

Matching is not done here. Collaborators that need to match get the engine's
handle through [`BasicPattern::handle()`]; with the default [`RegexEngine`] that
is a [`Compiled`] wrapping a [`regex::Regex`].

# Usage

```rust
use pattern_handle::Pattern;

let pattern = Pattern::new(r"(?<year>\d{4})-(?<month>\d{2})-(\d{2})");

assert_eq!(pattern.capture_count(), 3);
assert_eq!(pattern.group_names(), ["month", "year"]);
assert_eq!(pattern.group_index("year"), Some(1));
assert_eq!(pattern.group_index("day"), None);
```

Group names come out in name table order, which is sorted by name, not in the
order the groups appear in the pattern.

## Failed compilation

[`Pattern::new()`] never fails. A pattern the engine rejects is kept without a
handle, the failure is logged and every query on it comes back empty:

```rust
use pattern_handle::Pattern;

let pattern = Pattern::new("a(b");
assert!(pattern.handle().is_none());
assert_eq!(pattern.capture_count(), 0);
assert!(pattern.group_names().is_empty());
assert_eq!(pattern.compile_error().unwrap().offset(), Some(1));
```

Use [`Pattern::try_new()`] and the `try_` queries to get the errors as values:

```rust
use pattern_handle::{Error, Pattern};

assert!(matches!(Pattern::try_new("a(b"), Err(Error::Compile(_))));

let pattern = Pattern::new("a(b");
assert_eq!(pattern.try_capture_count(), Err(Error::NotCompiled));
```

## Wide patterns

[`WidePattern`] takes UTF-16 text and reports names as UTF-16:

```rust
use pattern_handle::WidePattern;

let text: Vec<u16> = "(?<b>x)(?<a>y)".encode_utf16().collect();
let pattern = WidePattern::new(text);
let a: Vec<u16> = "a".encode_utf16().collect();
assert_eq!(pattern.group_index(&a), Some(2));
```
*/

#![doc(html_root_url = "https://docs.rs/pattern-handle/0.1.0")]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::struct_excessive_bools)]

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

mod engine;
mod error;
mod name_table;
mod regex_engine;
mod width;

pub use crate::engine::{Engine, Info};
pub use crate::error::{CompileError, CompileErrorKind, Error, QueryError, Result};
pub use crate::name_table::{NameEntries, NameEntry, NameTable, NameTableBuf, NameTableBuilder};
pub use crate::regex_engine::{Compiled, RegexEngine};
pub use crate::width::{CharWidth, Narrow, Wide};

/// A pattern over UTF-8 text.
pub type Pattern<E = RegexEngine> = BasicPattern<Narrow, E>;

/// A pattern over UTF-16 text.
pub type WidePattern<E = RegexEngine> = BasicPattern<Wide, E>;

/// Options passed to the engine when compiling a pattern.
///
/// See [`PatternBuilder`] for a fluent way to set them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Options {
    /// Match letters regardless of case.
    pub case_insensitive: bool,
    /// `^` and `$` match at line boundaries.
    pub multi_line: bool,
    /// `.` matches `\n`.
    pub dot_matches_new_line: bool,
    /// Ignore whitespace and allow `#` comments in the pattern.
    pub ignore_whitespace: bool,
    /// Swap the meaning of greedy and lazy repetition.
    pub swap_greed: bool,
    /// Unicode-aware classes and case folding.
    pub unicode: bool,
    /// Approximate size limit of the compiled program, in bytes.
    pub size_limit: Option<usize>,
    /// Limit on the nesting depth of the pattern.
    pub nest_limit: Option<u32>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            case_insensitive: false,
            multi_line: false,
            dot_matches_new_line: false,
            ignore_whitespace: false,
            swap_greed: false,
            unicode: true,
            size_limit: None,
            nest_limit: None,
        }
    }
}

/// A builder for a [`BasicPattern`] to allow configuring options.
#[derive(Debug, Copy, Clone, Default)]
pub struct PatternBuilder(Options);

impl PatternBuilder {
    /// Create a new pattern builder with default options.
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The options built so far.
    #[must_use]
    #[inline]
    pub fn options(&self) -> &Options {
        &self.0
    }

    /// Build a pattern with the default engine. Compilation failures are
    /// logged and leave the pattern without a handle, see [`BasicPattern::new()`].
    pub fn build<W: CharWidth>(&self, text: impl Into<W::Text>) -> BasicPattern<W> {
        BasicPattern::with_engine(RegexEngine, text, &self.0)
    }

    /// Build a pattern with the default engine.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Compile`] if the pattern could not be compiled.
    pub fn try_build<W: CharWidth>(&self, text: impl Into<W::Text>) -> Result<BasicPattern<W>> {
        BasicPattern::try_with_engine(RegexEngine, text, &self.0)
    }

    /// Build a pattern with `engine`, see [`BasicPattern::with_engine()`].
    pub fn build_with_engine<W: CharWidth, E: Engine<W>>(
        &self,
        engine: E,
        text: impl Into<W::Text>,
    ) -> BasicPattern<W, E> {
        BasicPattern::with_engine(engine, text, &self.0)
    }

    /// Build a pattern with `engine`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Compile`] if the pattern could not be compiled.
    pub fn try_build_with_engine<W: CharWidth, E: Engine<W>>(
        &self,
        engine: E,
        text: impl Into<W::Text>,
    ) -> Result<BasicPattern<W, E>> {
        BasicPattern::try_with_engine(engine, text, &self.0)
    }

    /// Match letters regardless of case.
    ///
    /// Default is `false`.
    #[inline]
    pub fn case_insensitive(&mut self, yes: bool) -> &mut Self {
        self.0.case_insensitive = yes;
        self
    }

    /// Let `^` and `$` match at the start and end of lines.
    ///
    /// Default is `false`.
    #[inline]
    pub fn multi_line(&mut self, yes: bool) -> &mut Self {
        self.0.multi_line = yes;
        self
    }

    /// Let `.` match `\n`.
    ///
    /// Default is `false`.
    #[inline]
    pub fn dot_matches_new_line(&mut self, yes: bool) -> &mut Self {
        self.0.dot_matches_new_line = yes;
        self
    }

    /// Ignore whitespace in the pattern and allow `#` line comments.
    ///
    /// Default is `false`.
    #[inline]
    pub fn ignore_whitespace(&mut self, yes: bool) -> &mut Self {
        self.0.ignore_whitespace = yes;
        self
    }

    /// Make repetitions lazy by default and `?`-suffixed ones greedy.
    ///
    /// Default is `false`.
    #[inline]
    pub fn swap_greed(&mut self, yes: bool) -> &mut Self {
        self.0.swap_greed = yes;
        self
    }

    /// Use Unicode-aware classes and case folding.
    ///
    /// Default is `true`.
    #[inline]
    pub fn unicode(&mut self, yes: bool) -> &mut Self {
        self.0.unicode = yes;
        self
    }

    /// Set the approximate size limit of the compiled program. Exceeding it
    /// fails compilation with [`CompileErrorKind::SizeLimit`].
    ///
    /// This option is forwarded to the engine; the default engine passes it
    /// on to the `regex` crate.
    #[inline]
    pub fn size_limit(&mut self, limit: usize) -> &mut Self {
        self.0.size_limit = Some(limit);
        self
    }

    /// Limit how deeply the pattern may nest groups and repetitions.
    #[inline]
    pub fn nest_limit(&mut self, limit: u32) -> &mut Self {
        self.0.nest_limit = Some(limit);
        self
    }
}

/// A compiled pattern that owns its engine handle.
///
/// The handle is acquired when the pattern is constructed and released when it
/// is dropped. A pattern whose compilation failed holds no handle; its queries
/// return [`Error::NotCompiled`], or an empty result for the lenient variants.
///
/// Patterns cannot be cloned: each handle has exactly one owner.
pub struct BasicPattern<W: CharWidth, E: Engine<W> = RegexEngine> {
    text: W::Text,
    handle: Option<E::Handle>,
    failure: Option<CompileError>,
    options: Options,
    engine: E,
}

impl<W: CharWidth> BasicPattern<W> {
    /// Compile a pattern with default options and the default engine.
    ///
    /// Compilation failures do not panic or return an error: they are logged,
    /// kept in [`compile_error()`](Self::compile_error), and leave the pattern
    /// without a handle.
    pub fn new(text: impl Into<W::Text>) -> Self {
        Self::with_engine(RegexEngine, text, &Options::default())
    }

    /// Compile a pattern with default options and the default engine.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Compile`] if the pattern could not be compiled.
    pub fn try_new(text: impl Into<W::Text>) -> Result<Self> {
        Self::try_with_engine(RegexEngine, text, &Options::default())
    }
}

impl<W: CharWidth, E: Engine<W>> BasicPattern<W, E> {
    /// Compile a pattern with `engine`. Failures are handled as in
    /// [`BasicPattern::new()`].
    pub fn with_engine(engine: E, text: impl Into<W::Text>, options: &Options) -> Self {
        let text = text.into();
        let (handle, failure) = match engine.compile(text.borrow(), options) {
            Ok(handle) => {
                log::debug!("compiled pattern {:?}", text);
                (Some(handle), None)
            }
            Err(err) => {
                log::warn!("failed to compile pattern {:?}: {}", text, err);
                (None, Some(err))
            }
        };
        BasicPattern {
            text,
            handle,
            failure,
            options: *options,
            engine,
        }
    }

    /// Compile a pattern with `engine`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Compile`] if the pattern could not be compiled.
    pub fn try_with_engine(engine: E, text: impl Into<W::Text>, options: &Options) -> Result<Self> {
        let text = text.into();
        let handle = engine.compile(text.borrow(), options)?;
        log::debug!("compiled pattern {:?}", text);
        Ok(BasicPattern {
            text,
            handle: Some(handle),
            failure: None,
            options: *options,
            engine,
        })
    }

    /// The engine handle, `None` if compilation failed.
    #[must_use]
    #[inline]
    pub fn handle(&self) -> Option<&E::Handle> {
        self.handle.as_ref()
    }

    /// Whether compilation succeeded.
    #[must_use]
    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.handle.is_some()
    }

    /// Why compilation failed, if it did.
    #[must_use]
    #[inline]
    pub fn compile_error(&self) -> Option<&CompileError> {
        self.failure.as_ref()
    }

    /// Returns the original pattern text.
    #[must_use]
    #[inline]
    pub fn text(&self) -> &W::Str {
        self.text.borrow()
    }

    /// The options the pattern was compiled with.
    #[must_use]
    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The engine that owns the handle.
    #[must_use]
    #[inline]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    fn compiled(&self) -> Result<&E::Handle> {
        self.handle.as_ref().ok_or(Error::NotCompiled)
    }

    /// Number of capturing groups, not counting the implicit whole match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCompiled`] if there is no handle, or an
    /// [`Error::Query`] if the engine could not answer.
    pub fn try_capture_count(&self) -> Result<usize> {
        let handle = self.compiled()?;
        Ok(self.engine.query_int(handle, Info::CaptureCount)?)
    }

    /// Number of capturing groups. Failures are logged and give 0, so a
    /// pattern without groups cannot be told apart from a failed query; use
    /// [`try_capture_count()`](Self::try_capture_count) when that matters.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        self.try_capture_count().unwrap_or_else(|err| {
            log::warn!("failed to count groups of {:?}: {}", self.text, err);
            0
        })
    }

    /// The 1-based index of the group called `name`, `Ok(None)` if there is
    /// no such group.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCompiled`] if there is no handle, or an
    /// [`Error::Query`] if the engine could not answer.
    pub fn try_group_index(&self, name: &W::Str) -> Result<Option<usize>> {
        let handle = self.compiled()?;
        Ok(self.engine.resolve_name(handle, name)?)
    }

    /// The 1-based index of the group called `name`.
    ///
    /// An unknown name gives `None` without logging. Other failures are logged
    /// and also give `None`.
    #[must_use]
    pub fn group_index(&self, name: &W::Str) -> Option<usize> {
        self.try_group_index(name).unwrap_or_else(|err| {
            log::warn!("failed to look up group {:?} in {:?}: {}", name, self.text, err);
            None
        })
    }

    /// The name table of the compiled pattern.
    ///
    /// The walk is bounded by the engine's name count, never by the capture
    /// count, and checked against the length of the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCompiled`] if there is no handle, or an
    /// [`Error::Query`] if the engine could not answer or its table is
    /// malformed.
    pub fn name_table(&self) -> Result<NameTable<'_, W>> {
        let handle = self.compiled()?;
        let count = self.engine.query_int(handle, Info::NameCount)?;
        let stride = self.engine.query_int(handle, Info::NameEntrySize)?;
        let table = self.engine.name_table(handle)?;
        Ok(NameTable::new(table, stride, count)?)
    }

    /// Names of the named capturing groups, in name table order (sorted by
    /// name). Unnamed groups are left out.
    ///
    /// # Errors
    ///
    /// See [`name_table()`](Self::name_table).
    pub fn try_group_names(&self) -> Result<Vec<W::Text>> {
        Ok(self.name_table()?.names()?)
    }

    /// Names of the named capturing groups, sorted by name. Failures are
    /// logged and give an empty list.
    #[must_use]
    pub fn group_names(&self) -> Vec<W::Text> {
        self.try_group_names().unwrap_or_else(|err| {
            log::warn!("failed to fetch group names of {:?}: {}", self.text, err);
            Vec::new()
        })
    }
}

impl<W: CharWidth, E: Engine<W>> Drop for BasicPattern<W, E> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            log::debug!("releasing pattern {:?}", self.text);
            self.engine.release(handle);
        }
    }
}

impl<W: CharWidth, E: Engine<W>> fmt::Debug for BasicPattern<W, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicPattern")
            .field("text", &self.text)
            .field("compiled", &self.is_compiled())
            .field("failure", &self.failure)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FromStr for Pattern {
    type Err = Error;

    /// Attempts to compile a string into a pattern
    fn from_str(s: &str) -> Result<Pattern> {
        Pattern::try_new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matches::assert_matches;

    #[ctor::ctor]
    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn utf16(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn text_is_kept() {
        let text = r"(?<a>x)(?<b>y)(z)";
        assert_eq!(Pattern::new(text).text(), text);
        assert_eq!(Pattern::new("(").text(), "(");
    }

    #[test]
    fn named_and_unnamed_groups() {
        let pattern = Pattern::new(r"(?<a>x)(?<b>y)(z)");
        assert!(pattern.is_compiled());
        assert_eq!(pattern.capture_count(), 3);
        assert_eq!(pattern.group_names(), ["a", "b"]);
        assert_eq!(pattern.group_index("a"), Some(1));
        assert_eq!(pattern.group_index("b"), Some(2));
        assert_eq!(pattern.group_index("nonexistent"), None);
    }

    #[test]
    fn names_sorted_alphabetically() {
        let pattern = Pattern::new(r"(?<zulu>a)(?<alpha>b)(?<mike>c)");
        assert_eq!(pattern.group_names(), ["alpha", "mike", "zulu"]);
        assert_eq!(pattern.group_index("zulu"), Some(1));
        assert_eq!(pattern.group_index("alpha"), Some(2));
    }

    #[test]
    fn no_groups() {
        let pattern = Pattern::new("abc");
        assert_eq!(pattern.try_capture_count(), Ok(0));
        assert_eq!(pattern.try_group_names(), Ok(Vec::new()));
        assert_eq!(pattern.try_group_index("a"), Ok(None));
    }

    #[test]
    fn nested_groups() {
        let pattern = Pattern::new(r"(?<outer>a(?<inner>b)(c))");
        assert_eq!(pattern.capture_count(), 3);
        assert_eq!(pattern.group_names(), ["inner", "outer"]);
        assert_eq!(pattern.group_index("inner"), Some(2));
    }

    #[test]
    fn failed_compile() {
        let pattern = Pattern::new("a(b");
        assert!(pattern.handle().is_none());
        assert!(!pattern.is_compiled());
        assert_eq!(pattern.capture_count(), 0);
        assert!(pattern.group_names().is_empty());
        assert_eq!(pattern.group_index("a"), None);

        let err = pattern.compile_error().unwrap();
        assert_eq!(err.kind(), CompileErrorKind::Syntax);
        assert_eq!(err.offset(), Some(1));

        assert_eq!(pattern.try_capture_count(), Err(Error::NotCompiled));
        assert_eq!(pattern.try_group_names(), Err(Error::NotCompiled));
        assert_eq!(pattern.try_group_index("a"), Err(Error::NotCompiled));
        assert_matches!(pattern.name_table(), Err(Error::NotCompiled));
    }

    #[test]
    fn try_new() {
        assert_matches!(Pattern::try_new("a(b"), Err(Error::Compile(_)));
        let pattern = Pattern::try_new("(a)").unwrap();
        assert!(pattern.compile_error().is_none());
        assert_eq!(pattern.capture_count(), 1);
    }

    #[test]
    fn from_str() {
        let s = r"(?<a>x)\d+";
        let pattern = s.parse::<Pattern>().unwrap();
        assert_eq!(pattern.text(), s);
        assert!("(".parse::<Pattern>().is_err());
    }

    #[test]
    fn handle_matches() {
        let pattern = Pattern::new(r"(?<word>\w+)");
        let regex = pattern.handle().unwrap().regex();
        let caps = regex.captures("hello world").unwrap();
        assert_eq!(&caps["word"], "hello");
    }

    #[test]
    fn name_table_entries() {
        let pattern = Pattern::new(r"(?<b>x)(?<a>y)");
        let table = pattern.name_table().unwrap();
        assert_eq!(table.len(), 2);
        let entries: Vec<_> = table.iter().map(|e| (e.index(), e.name())).collect();
        assert_eq!(entries, [(2, &b"a"[..]), (1, &b"b"[..])]);
    }

    #[test]
    fn wide_pattern() {
        let text = utf16(r"(?<b>x)(?<a>y)(z)");
        let pattern = WidePattern::new(text.clone());
        assert_eq!(pattern.text(), &text[..]);
        assert_eq!(pattern.capture_count(), 3);
        assert_eq!(pattern.group_names(), [utf16("a"), utf16("b")]);
        assert_eq!(pattern.group_index(&utf16("a")), Some(2));
        assert_eq!(pattern.group_index(&utf16("c")), None);
    }

    #[test]
    fn wide_names_sort_by_unit() {
        let pattern = WidePattern::new(utf16("(?<zeta>\u{e9})(?<Alpha>y)"));
        assert_eq!(pattern.group_names(), [utf16("Alpha"), utf16("zeta")]);
        assert_eq!(pattern.group_index(&utf16("zeta")), Some(1));
    }

    #[test]
    fn builder_options() {
        let pattern: Pattern = PatternBuilder::new()
            .case_insensitive(true)
            .multi_line(true)
            .build("^(?<x>abc)$");
        assert!(pattern.options().case_insensitive);
        assert!(pattern.options().multi_line);
        assert!(pattern.handle().unwrap().regex().is_match("x\nABC\ny"));

        let pattern = PatternBuilder::new()
            .ignore_whitespace(true)
            .try_build::<Narrow>("(?<a> x ) # comment")
            .unwrap();
        assert_eq!(pattern.group_names(), ["a"]);
    }

    #[test]
    fn builder_size_limit() {
        let result = PatternBuilder::new()
            .size_limit(100)
            .try_build::<Narrow>(r"\w{1000}");
        assert_matches!(result, Err(Error::Compile(ref err)) if err.kind() == CompileErrorKind::SizeLimit);
    }

    #[test]
    fn repeated_queries_agree() {
        let pattern = Pattern::new(r"(?<x>a)(?<y>b)");
        let names = pattern.group_names();
        let count = pattern.capture_count();
        for _ in 0..3 {
            assert_eq!(pattern.group_names(), names);
            assert_eq!(pattern.capture_count(), count);
        }
    }

    #[test]
    fn debug_output() {
        let pattern = Pattern::new("(a");
        let debug = format!("{:?}", pattern);
        assert!(debug.contains("compiled: false"));
    }
}
