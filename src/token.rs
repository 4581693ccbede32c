//! Token kinds produced by the lexer.

use crate::diagnostics::SourceRange;

/// The kind of a single lexical token. Literal and identifier kinds carry
/// their value separately on [`Token`] rather than in the variant, so that
/// matching on a `TokenKind` never needs to ignore a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	Identifier,
	Integer,
	String,

	KeywordFor,
	KeywordIf,
	KeywordElse,
	KeywordReturn,
	KeywordBreak,

	Semicolon,
	Comma,
	LeftParenthesis,
	RightParenthesis,
	LeftBrace,
	RightBrace,
	Scope,
	Colon,

	Assign,
	MulAssign,
	DivAssign,
	ModAssign,
	AddAssign,
	SubAssign,
	ShlAssign,
	ShrAssign,
	AndAssign,
	XorAssign,
	OrAssign,

	Plus,
	Minus,
	Star,
	Slash,
	Percent,
	Ampersand,
	Caret,
	Pipe,
	Bang,

	Equal,
	NotEqual,
	Less,
	LessEqual,
	Greater,
	GreaterEqual,
	Shl,
	Shr,

	Eof,
}

impl std::fmt::Display for TokenKind {
	/// Renders the canonical name used in `SyntaxError` messages
	/// (`expected '<name>'`). Identifiers get their own phrasing to match
	/// `expected unqualified-id`.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			Self::Identifier => "unqualified-id",
			Self::Integer => "INTEGER",
			Self::String => "STRING",
			Self::KeywordFor => "for",
			Self::KeywordIf => "if",
			Self::KeywordElse => "else",
			Self::KeywordReturn => "return",
			Self::KeywordBreak => "break",
			Self::Semicolon => ";",
			Self::Comma => ",",
			Self::LeftParenthesis => "(",
			Self::RightParenthesis => ")",
			Self::LeftBrace => "{",
			Self::RightBrace => "}",
			Self::Scope => "::",
			Self::Colon => ":",
			Self::Assign => "=",
			Self::MulAssign => "*=",
			Self::DivAssign => "/=",
			Self::ModAssign => "%=",
			Self::AddAssign => "+=",
			Self::SubAssign => "-=",
			Self::ShlAssign => "<<=",
			Self::ShrAssign => ">>=",
			Self::AndAssign => "&=",
			Self::XorAssign => "^=",
			Self::OrAssign => "|=",
			Self::Plus => "+",
			Self::Minus => "-",
			Self::Star => "*",
			Self::Slash => "/",
			Self::Percent => "%",
			Self::Ampersand => "&",
			Self::Caret => "^",
			Self::Pipe => "|",
			Self::Bang => "!",
			Self::Equal => "==",
			Self::NotEqual => "!=",
			Self::Less => "<",
			Self::LessEqual => "<=",
			Self::Greater => ">",
			Self::GreaterEqual => ">=",
			Self::Shl => "<<",
			Self::Shr => ">>",
			Self::Eof => "end of file",
		};
		write!(f, "{name}")
	}
}

/// The decoded payload of a token, for the handful of kinds that carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValue {
	None,
	Identifier(String),
	Integer(u64),
	String(Vec<u8>),
}

/// A single lexical atom: its kind, source range, and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
	pub kind: TokenKind,
	pub range: SourceRange,
	pub value: TokenValue,
}

impl Token {
	#[must_use]
	pub const fn new(kind: TokenKind, range: SourceRange, value: TokenValue) -> Self {
		Self { kind, range, value }
	}

	/// The decoded identifier name. Panics if this token is not an
	/// `Identifier` token; callers only call this after matching the kind.
	#[must_use]
	pub fn identifier_name(&self) -> &str {
		match &self.value {
			TokenValue::Identifier(name) => name,
			_ => unreachable!("identifier_name() called on a non-identifier token"),
		}
	}
}
