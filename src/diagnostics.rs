//! Structured diagnostics. Every error the compiler raises carries a
//! [`SourceRange`] alongside its message, following the same `Display` +
//! `std::error::Error` shape the rest of this family of compilers uses for
//! user-facing errors.

use crate::source::Position;

/// A closed `(line, column)` interval, 1-based on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRange {
	pub start: Position,
	pub end: Position,
}

impl SourceRange {
	#[must_use]
	pub const fn new(start: Position, end: Position) -> Self {
		Self { start, end }
	}

	/// A zero-width range at a single position, used for errors detected
	/// exactly at the cursor (e.g. an unrecognized byte).
	#[must_use]
	pub const fn at(position: Position) -> Self {
		Self { start: position, end: position }
	}

	/// The smallest range enclosing both `self` and `other`.
	#[must_use]
	pub const fn to(self, other: Self) -> Self {
		Self { start: self.start, end: other.end }
	}
}

/// The category of a compiler-raised error. Kept distinct from the message
/// so callers can match on it without string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Raised by the lexer: malformed tokens, bad escapes, unterminated
	/// literals or comments, out-of-range integer literals.
	Lexical,
	/// Raised by the parser: a required token kind was not found.
	Syntax,
	/// Raised by the parser once it resolves a declaration: undefined
	/// types, or a violation of the "statements after `main`" rule.
	Semantic,
}

impl std::fmt::Display for ErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Lexical => "lexical error",
			Self::Syntax => "syntax error",
			Self::Semantic => "semantic error",
		};
		write!(f, "{name}")
	}
}

/// The single error type raised anywhere in the compilation pipeline. No
/// local recovery is attempted: the first `Error` produced aborts the
/// compile and is handed back to the caller unmodified.
#[derive(Debug, Clone)]
pub struct Error {
	pub kind: ErrorKind,
	pub message: String,
	pub range: SourceRange,
}

impl Error {
	#[must_use]
	pub fn new(kind: ErrorKind, message: impl Into<String>, range: SourceRange) -> Self {
		Self { kind, message: message.into(), range }
	}

	#[must_use]
	pub fn lexical(message: impl Into<String>, range: SourceRange) -> Self {
		Self::new(ErrorKind::Lexical, message, range)
	}

	#[must_use]
	pub fn syntax(message: impl Into<String>, range: SourceRange) -> Self {
		Self::new(ErrorKind::Syntax, message, range)
	}

	#[must_use]
	pub fn semantic(message: impl Into<String>, range: SourceRange) -> Self {
		Self::new(ErrorKind::Semantic, message, range)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.message)
	}
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn range_to_spans_start_and_end() {
		let a = SourceRange::at(Position { line: 1, column: 1 });
		let b = SourceRange::at(Position { line: 1, column: 5 });
		let spanned = a.to(b);
		assert_eq!(spanned.start, a.start);
		assert_eq!(spanned.end, b.end);
	}

	#[test]
	fn error_display_is_just_the_message() {
		let error = Error::syntax("expected ';'", SourceRange::at(Position::start()));
		assert_eq!(error.to_string(), "expected ';'");
	}
}
