//! Hand-rolled byte-level lexer. Unlike a whole-token regex scanner, this
//! walks the input one byte at a time so it can implement nestable block
//! comments and precise escape-sequence diagnostics.

use std::collections::VecDeque;

use crate::{
	diagnostics::{Error, SourceRange},
	source::{Position, SourceReader},
	token::{Token, TokenKind, TokenValue},
};

/// A lexer over a source string. Tokens can be peeked without consuming and
/// pushed back once consumed, which the parser relies on for speculative
/// parses (e.g. trying a declaration and backing out to an expression).
pub struct Lexer<'source> {
	reader: SourceReader<'source>,
	lookahead: VecDeque<Token>,
}

impl<'source> Lexer<'source> {
	#[must_use]
	pub const fn new(source: &'source str) -> Self {
		Self { reader: SourceReader::new(source), lookahead: VecDeque::new() }
	}

	/// Consumes and returns the next token.
	pub fn next(&mut self) -> Result<Token, Error> {
		if let Some(token) = self.lookahead.pop_front() {
			return Ok(token);
		}
		self.scan_token()
	}

	/// Returns the next token without consuming it.
	pub fn peek(&mut self) -> Result<&Token, Error> {
		if self.lookahead.is_empty() {
			let token = self.scan_token()?;
			self.lookahead.push_back(token);
		}
		Ok(&self.lookahead[0])
	}

	/// Returns the token after the next one without consuming anything.
	pub fn peek2(&mut self) -> Result<&Token, Error> {
		while self.lookahead.len() < 2 {
			let token = self.scan_token()?;
			self.lookahead.push_back(token);
		}
		Ok(&self.lookahead[1])
	}

	/// Pushes a previously-consumed token back onto the front of the queue.
	pub fn putback(&mut self, token: Token) {
		self.lookahead.push_front(token);
	}

	fn scan_token(&mut self) -> Result<Token, Error> {
		self.skip_trivia()?;

		let start = self.reader.position();
		let Some(byte) = self.reader.peek() else {
			return Ok(Token::new(TokenKind::Eof, SourceRange::at(start), TokenValue::None));
		};

		if byte.is_ascii_alphabetic() || byte == b'_' {
			return Ok(self.scan_identifier_or_keyword(start));
		}
		if byte.is_ascii_digit() {
			return self.scan_integer(start);
		}
		if byte == b'"' {
			return self.scan_string(start);
		}

		self.reader.advance();
		let single = |kind: TokenKind, end: Position| Token::new(kind, SourceRange::new(start, end), TokenValue::None);

		match byte {
			b':' => {
				if self.reader.peek() == Some(b':') {
					self.reader.advance();
					Ok(single(TokenKind::Scope, self.reader.position()))
				} else {
					Ok(single(TokenKind::Colon, self.reader.position()))
				}
			},
			b'<' => self.scan_angle(start, TokenKind::Less, TokenKind::LessEqual, TokenKind::Shl, TokenKind::ShlAssign, b'<'),
			b'>' => self.scan_angle(start, TokenKind::Greater, TokenKind::GreaterEqual, TokenKind::Shr, TokenKind::ShrAssign, b'>'),
			b'*' => self.scan_compound(start, TokenKind::Star, TokenKind::MulAssign),
			b'%' => self.scan_compound(start, TokenKind::Percent, TokenKind::ModAssign),
			b'+' => self.scan_compound(start, TokenKind::Plus, TokenKind::AddAssign),
			b'-' => self.scan_compound(start, TokenKind::Minus, TokenKind::SubAssign),
			b'&' => self.scan_compound(start, TokenKind::Ampersand, TokenKind::AndAssign),
			b'^' => self.scan_compound(start, TokenKind::Caret, TokenKind::XorAssign),
			b'|' => self.scan_compound(start, TokenKind::Pipe, TokenKind::OrAssign),
			b'/' => self.scan_compound(start, TokenKind::Slash, TokenKind::DivAssign),
			b'=' => self.scan_compound(start, TokenKind::Assign, TokenKind::Equal),
			b'!' => self.scan_compound(start, TokenKind::Bang, TokenKind::NotEqual),
			b'(' => Ok(single(TokenKind::LeftParenthesis, self.reader.position())),
			b')' => Ok(single(TokenKind::RightParenthesis, self.reader.position())),
			b'{' => Ok(single(TokenKind::LeftBrace, self.reader.position())),
			b'}' => Ok(single(TokenKind::RightBrace, self.reader.position())),
			b';' => Ok(single(TokenKind::Semicolon, self.reader.position())),
			b',' => Ok(single(TokenKind::Comma, self.reader.position())),
			_ => Err(Error::lexical("unexpected input", SourceRange::new(start, self.reader.position()))),
		}
	}

	/// `=`-suffixed compound assignment, e.g. `+` / `+=`. `/` and `=` and
	/// `!` are handled by their own callers above and share this helper for
	/// the trailing-`=` shape only (comments are stripped out in
	/// `skip_trivia` before this is ever reached for `/`).
	fn scan_compound(&mut self, start: Position, plain: TokenKind, assign: TokenKind) -> Result<Token, Error> {
		if self.reader.peek() == Some(b'=') {
			self.reader.advance();
			Ok(Token::new(assign, SourceRange::new(start, self.reader.position()), TokenValue::None))
		} else {
			Ok(Token::new(plain, SourceRange::new(start, self.reader.position()), TokenValue::None))
		}
	}

	/// Handles `<`/`>` which have three tiers: plain, `<=`, `<<`, `<<=`.
	#[allow(clippy::too_many_arguments)]
	fn scan_angle(&mut self, start: Position, plain: TokenKind, with_equal: TokenKind, doubled: TokenKind, doubled_assign: TokenKind, repeat: u8) -> Result<Token, Error> {
		if self.reader.peek() == Some(b'=') {
			self.reader.advance();
			return Ok(Token::new(with_equal, SourceRange::new(start, self.reader.position()), TokenValue::None));
		}
		if self.reader.peek() == Some(repeat) {
			self.reader.advance();
			if self.reader.peek() == Some(b'=') {
				self.reader.advance();
				return Ok(Token::new(doubled_assign, SourceRange::new(start, self.reader.position()), TokenValue::None));
			}
			return Ok(Token::new(doubled, SourceRange::new(start, self.reader.position()), TokenValue::None));
		}
		Ok(Token::new(plain, SourceRange::new(start, self.reader.position()), TokenValue::None))
	}

	fn scan_identifier_or_keyword(&mut self, start: Position) -> Token {
		let mut name = String::new();
		while let Some(byte) = self.reader.peek() {
			if byte.is_ascii_alphanumeric() || byte == b'_' {
				name.push(byte as char);
				self.reader.advance();
			} else {
				break;
			}
		}
		let range = SourceRange::new(start, self.reader.position());
		let kind = match name.as_str() {
			"for" => TokenKind::KeywordFor,
			"if" => TokenKind::KeywordIf,
			"else" => TokenKind::KeywordElse,
			"return" => TokenKind::KeywordReturn,
			"break" => TokenKind::KeywordBreak,
			_ => return Token::new(TokenKind::Identifier, range, TokenValue::Identifier(name)),
		};
		Token::new(kind, range, TokenValue::None)
	}

	fn scan_integer(&mut self, start: Position) -> Result<Token, Error> {
		let mut value: u64 = 0;
		while let Some(byte) = self.reader.peek() {
			if !byte.is_ascii_digit() {
				break;
			}
			self.reader.advance();
			let digit = u64::from(byte - b'0');
			value = value
				.checked_mul(10)
				.and_then(|value| value.checked_add(digit))
				.ok_or_else(|| Error::lexical("integer literal out of range", SourceRange::new(start, self.reader.position())))?;
		}
		let range = SourceRange::new(start, self.reader.position());
		Ok(Token::new(TokenKind::Integer, range, TokenValue::Integer(value)))
	}

	fn scan_string(&mut self, start: Position) -> Result<Token, Error> {
		self.reader.advance(); // opening quote
		let mut bytes = Vec::new();
		loop {
			let Some(byte) = self.reader.peek() else {
				return Err(Error::lexical("missing terminating '\"' character", SourceRange::new(start, self.reader.position())));
			};
			if byte == b'"' {
				self.reader.advance();
				break;
			}
			if byte == b'\n' {
				return Err(Error::lexical("missing terminating '\"' character", SourceRange::new(start, self.reader.position())));
			}
			if byte == b'\\' {
				self.reader.advance();
				bytes.push(self.scan_escape(start)?);
				continue;
			}
			self.reader.advance();
			bytes.push(byte);
		}
		let range = SourceRange::new(start, self.reader.position());
		Ok(Token::new(TokenKind::String, range, TokenValue::String(bytes)))
	}

	fn scan_escape(&mut self, literal_start: Position) -> Result<u8, Error> {
		let escape_start = self.reader.position();
		let Some(byte) = self.reader.peek() else {
			return Err(Error::lexical("missing terminating escape sequence", SourceRange::new(literal_start, escape_start)));
		};

		if byte.is_ascii_digit() && byte <= b'7' {
			let mut value: u32 = 0;
			let mut count = 0;
			while count < 3 {
				match self.reader.peek() {
					Some(digit) if (b'0'..=b'7').contains(&digit) => {
						self.reader.advance();
						value = value * 8 + u32::from(digit - b'0');
						count += 1;
					},
					_ => break,
				}
			}
			return u8::try_from(value).map_err(|_| Error::lexical("octal escape sequence out of range", SourceRange::new(escape_start, self.reader.position())));
		}

		if byte == b'x' {
			self.reader.advance();
			let mut value: u32 = 0;
			let mut count = 0;
			let mut overflowed = false;
			while let Some(digit) = self.reader.peek() {
				if !digit.is_ascii_hexdigit() {
					break;
				}
				self.reader.advance();
				let digit_value = u32::from((digit as char).to_digit(16).unwrap_or(0));
				value = value.checked_mul(16).and_then(|value| value.checked_add(digit_value)).unwrap_or_else(|| {
					overflowed = true;
					0
				});
				count += 1;
			}
			if count == 0 {
				return Err(Error::lexical("'\\x' used with no following hex digits", SourceRange::new(escape_start, self.reader.position())));
			}
			if overflowed {
				return Err(Error::lexical("hex escape sequence out of range", SourceRange::new(escape_start, self.reader.position())));
			}
			return u8::try_from(value).map_err(|_| Error::lexical("hex escape sequence out of range", SourceRange::new(escape_start, self.reader.position())));
		}

		self.reader.advance();
		let decoded = match byte {
			b'\'' => 0x27,
			b'"' => 0x22,
			b'?' => 0x3F,
			b'\\' => 0x5C,
			b'a' => 0x07,
			b'b' => 0x08,
			b'f' => 0x0C,
			b'n' => 0x0A,
			b'r' => 0x0D,
			b't' => 0x09,
			b'v' => 0x0B,
			_ => return Err(Error::lexical("Unknown missing terminating escape sequence", SourceRange::new(escape_start, self.reader.position()))),
		};
		Ok(decoded)
	}

	/// Skips whitespace and every comment form, leaving the cursor at the
	/// start of the next real token (or at EOF).
	fn skip_trivia(&mut self) -> Result<(), Error> {
		loop {
			match self.reader.peek() {
				Some(byte) if byte.is_ascii_whitespace() => {
					self.reader.advance();
				},
				Some(b'#') => self.skip_hash_comment()?,
				Some(b'/') if self.reader.peek2() == Some(b'/') => {
					self.reader.advance();
					self.reader.advance();
					while let Some(byte) = self.reader.peek() {
						if byte == b'\n' {
							break;
						}
						self.reader.advance();
					}
				},
				Some(b'/') if self.reader.peek2() == Some(b'*') => self.skip_block_comment()?,
				_ => break,
			}
		}
		Ok(())
	}

	fn skip_hash_comment(&mut self) -> Result<(), Error> {
		self.reader.advance(); // '#'
		let after_hash = self.reader.position();
		match self.reader.peek() {
			None | Some(b'\n') => {},
			Some(byte) if byte.is_ascii_whitespace() || byte == b'!' => {},
			_ => return Err(Error::lexical("'#' comment must be followed by a whitespace character", SourceRange::at(after_hash))),
		}
		while let Some(byte) = self.reader.peek() {
			if byte == b'\n' {
				break;
			}
			self.reader.advance();
		}
		Ok(())
	}

	fn skip_block_comment(&mut self) -> Result<(), Error> {
		let start = self.reader.position();
		self.reader.advance(); // '/'
		self.reader.advance(); // '*'
		let mut depth = 1usize;
		loop {
			match (self.reader.peek(), self.reader.peek2()) {
				(Some(b'/'), Some(b'*')) => {
					self.reader.advance();
					self.reader.advance();
					depth += 1;
				},
				(Some(b'*'), Some(b'/')) => {
					self.reader.advance();
					self.reader.advance();
					depth -= 1;
					if depth == 0 {
						return Ok(());
					}
				},
				(Some(_), _) => {
					self.reader.advance();
				},
				(None, _) => return Err(Error::lexical("unterminated /* comment", SourceRange::at(start))),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kinds(source: &str) -> Vec<TokenKind> {
		let mut lexer = Lexer::new(source);
		let mut kinds = Vec::new();
		loop {
			let token = lexer.next().expect("lex ok");
			if token.kind == TokenKind::Eof {
				break;
			}
			kinds.push(token.kind);
		}
		kinds
	}

	#[test]
	fn skips_whitespace_and_line_comments() {
		assert_eq!(kinds("  // hi\nfor"), vec![TokenKind::KeywordFor]);
		assert_eq!(kinds("# note\nfor"), vec![TokenKind::KeywordFor]);
	}

	#[test]
	fn nested_block_comments() {
		assert_eq!(kinds("/* outer /* inner */ still outer */ for"), vec![TokenKind::KeywordFor]);
	}

	#[test]
	fn hash_without_whitespace_is_an_error() {
		let mut lexer = Lexer::new("#bad");
		let err = lexer.next().expect_err("should fail");
		assert_eq!(err.kind, crate::diagnostics::ErrorKind::Lexical);
	}

	#[test]
	fn hash_comment_error_points_after_the_hash() {
		let mut lexer = Lexer::new("#bad");
		let err = lexer.next().expect_err("should fail");
		assert_eq!(err.range.start.column, 2);
	}

	#[test]
	fn oversized_hex_escape_is_an_error_not_a_panic() {
		let mut lexer = Lexer::new(r#""\xffffffffff""#);
		let err = lexer.next().expect_err("should overflow");
		assert_eq!(err.kind, crate::diagnostics::ErrorKind::Lexical);
		assert!(err.message.contains("hex escape sequence out of range"));
	}

	#[test]
	fn compound_assignment_operators() {
		assert_eq!(kinds("+="), vec![TokenKind::AddAssign]);
		assert_eq!(kinds("<<="), vec![TokenKind::ShlAssign]);
		assert_eq!(kinds("<<"), vec![TokenKind::Shl]);
		assert_eq!(kinds("<="), vec![TokenKind::LessEqual]);
		assert_eq!(kinds("<"), vec![TokenKind::Less]);
	}

	#[test]
	fn decodes_string_escapes() {
		let mut lexer = Lexer::new(r#""a\tb\101\x41""#);
		let token = lexer.next().expect("lex ok");
		assert_eq!(token.value, TokenValue::String(vec![b'a', b'\t', b'b', b'A', b'A']));
	}

	#[test]
	fn integer_overflow_is_a_hard_error() {
		let mut lexer = Lexer::new("99999999999999999999999999");
		let err = lexer.next().expect_err("should overflow");
		assert_eq!(err.kind, crate::diagnostics::ErrorKind::Lexical);
		assert!(err.message.contains("out of range"));
	}

	#[test]
	fn unterminated_block_comment_is_an_error() {
		let mut lexer = Lexer::new("/* never closes");
		let err = lexer.next().expect_err("should fail");
		assert!(err.message.contains("unterminated"));
	}

	#[test]
	fn peek_does_not_consume_and_putback_replays() {
		let mut lexer = Lexer::new("for if");
		assert_eq!(lexer.peek().expect("peek").kind, TokenKind::KeywordFor);
		let token = lexer.next().expect("next");
		assert_eq!(token.kind, TokenKind::KeywordFor);
		lexer.putback(token);
		assert_eq!(lexer.next().expect("next again").kind, TokenKind::KeywordFor);
		assert_eq!(lexer.next().expect("next").kind, TokenKind::KeywordIf);
	}
}
