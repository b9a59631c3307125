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

//! Error types for compilation and introspection.

use std::fmt;

use thiserror::Error;

use crate::engine::Info;

/// Result type for this crate with specific error enum.
pub type Result<T> = ::std::result::Result<T, Error>;

/// An error as the result of compiling a pattern or querying a compiled one.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// The pattern failed to compile, so there is no handle to query.
    #[error("pattern was not compiled")]
    NotCompiled,
    /// The engine rejected the pattern text.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// The engine failed to answer a query on a compiled pattern.
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// What went wrong while compiling a pattern.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CompileErrorKind {
    /// The pattern is not valid regex syntax.
    Syntax,
    /// The pattern text is not valid in its character width, e.g. an unpaired
    /// UTF-16 surrogate.
    InvalidEncoding,
    /// The compiled program exceeds the configured size limit.
    SizeLimit,
    /// A named group index does not fit in the name table's index field.
    NameTableOverflow,
    /// Any other failure reported by the engine.
    Other,
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompileErrorKind::Syntax => "syntax error",
            CompileErrorKind::InvalidEncoding => "invalid encoding",
            CompileErrorKind::SizeLimit => "size limit exceeded",
            CompileErrorKind::NameTableOverflow => "name table overflow",
            CompileErrorKind::Other => "compile error",
        };
        f.write_str(s)
    }
}

/// A compilation failure reported by an engine.
///
/// The offset, when present, counts code units of the pattern's character
/// width (bytes for narrow patterns, UTF-16 units for wide ones).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileError {
    kind: CompileErrorKind,
    offset: Option<usize>,
    message: Option<String>,
}

impl CompileError {
    /// Create a new compile error.
    #[must_use]
    pub fn new(kind: CompileErrorKind, offset: Option<usize>, message: Option<String>) -> Self {
        CompileError {
            kind,
            offset,
            message,
        }
    }

    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> CompileErrorKind {
        self.kind
    }

    /// Position in the pattern text where the engine gave up, if it knows.
    #[must_use]
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Diagnostic message from the engine.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to compile pattern: {}", self.kind)?;
        if let Some(offset) = self.offset {
            write!(f, " at offset {offset}")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}

/// An introspection query on a compiled pattern failed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The engine does not answer this query.
    #[error("unsupported query: {0:?}")]
    Unsupported(Info),
    /// The name table does not have the layout its stride and count describe.
    #[error("malformed name table: {0}")]
    MalformedNameTable(String),
    /// Any other failure reported by the engine.
    #[error("engine error: {0}")]
    Engine(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_display() {
        let err = CompileError::new(
            CompileErrorKind::Syntax,
            Some(3),
            Some("unclosed group".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "failed to compile pattern: syntax error at offset 3: unclosed group"
        );

        let err = CompileError::new(CompileErrorKind::SizeLimit, None, None);
        assert_eq!(err.to_string(), "failed to compile pattern: size limit exceeded");
    }

    #[test]
    fn compile_error_converts() {
        let err: Error = CompileError::new(CompileErrorKind::Other, None, None).into();
        assert!(matches!(err, Error::Compile(_)));
        assert_eq!(err.to_string(), "failed to compile pattern: compile error");
    }

    #[test]
    fn query_error_display() {
        let err = Error::from(QueryError::Unsupported(Info::NameCount));
        assert_eq!(err.to_string(), "unsupported query: NameCount");
    }
}
