//! Recursive-descent parser. Builds the AST and resolves every type name
//! against the live scope chain as it goes — there is no separate semantic
//! analysis pass.

use crate::{
	ast::{BinaryOperator, Expression, Statement, VariableDeclaration},
	diagnostics::{Error, SourceRange},
	lexer::Lexer,
	scope::{Scope, ScopeStack},
	token::{Token, TokenKind, TokenValue},
};

/// Parses `source` into `scope`, which should come from [`crate::new_compile_unit`]
/// (or otherwise already carry the built-in types). On success `scope` holds
/// the fully populated global scope; on error, `scope` is left in the
/// unspecified partial state it was in when parsing aborted.
pub fn parse_into(scope: &mut Scope, source: &str) -> Result<(), Error> {
	let placeholder = Scope::new(scope.id, scope.parent);
	let global = std::mem::replace(scope, placeholder);
	let mut parser = Parser { lexer: Lexer::new(source), scopes: ScopeStack::with_global(global) };
	parser.parse_compile_unit()?;
	let finished = parser.scopes.into_global();
	check_global_main_rule(&finished)?;
	*scope = finished;
	Ok(())
}

struct Parser<'source> {
	lexer: Lexer<'source>,
	scopes: ScopeStack,
}

/// Renders the message half of a `SyntaxError`: `expected unqualified-id`
/// for an identifier, `expected '<name>'` for everything else.
fn expected_message(kind: TokenKind) -> String {
	if kind == TokenKind::Identifier {
		format!("expected {kind}")
	} else {
		format!("expected '{kind}'")
	}
}

/// Enforces the rule that once a `main` function is defined at global
/// scope, no non-declaration statement may remain there. Checked once,
/// after the whole file has been parsed, against the assembled scope.
fn check_global_main_rule(global: &Scope) -> Result<(), Error> {
	if global.query_function_local("main").is_none() {
		return Ok(());
	}
	for statement in &global.statements {
		match statement {
			Statement::VariableDefinition { .. } | Statement::FunctionDefinition { .. } => {},
			other => {
				let range = other.range();
				return Err(Error::semantic(
					format!("unexpected global statement when 'main' function is defined ({}:{})", range.start.line, range.start.column),
					range,
				));
			},
		}
	}
	Ok(())
}

impl<'source> Parser<'source> {
	fn bump(&mut self) -> Result<Token, Error> {
		self.lexer.next()
	}

	fn peek_kind(&mut self) -> Result<TokenKind, Error> {
		Ok(self.lexer.peek()?.kind)
	}

	fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
		let token = self.bump()?;
		if token.kind == kind {
			Ok(token)
		} else {
			Err(Error::syntax(expected_message(kind), token.range))
		}
	}

	fn parse_compile_unit(&mut self) -> Result<(), Error> {
		while self.peek_kind()? != TokenKind::Eof {
			self.parse_one_statement()?;
		}
		Ok(())
	}

	/// Parses one statement at the current position, pushing whatever it
	/// produces (zero, one, or several nodes, for a multi-declarator
	/// statement) directly onto the currently open scope.
	fn parse_one_statement(&mut self) -> Result<(), Error> {
		match self.peek_kind()? {
			TokenKind::Semicolon => {
				self.bump()?;
				Ok(())
			},
			TokenKind::KeywordFor => {
				let statement = self.parse_for()?;
				self.scopes.current_mut().statements.push(statement);
				Ok(())
			},
			TokenKind::KeywordIf => {
				let statement = self.parse_if()?;
				self.scopes.current_mut().statements.push(statement);
				Ok(())
			},
			TokenKind::KeywordReturn => {
				let statement = self.parse_return()?;
				self.scopes.current_mut().statements.push(statement);
				Ok(())
			},
			TokenKind::KeywordBreak => {
				let statement = self.parse_break()?;
				self.scopes.current_mut().statements.push(statement);
				Ok(())
			},
			TokenKind::Identifier => self.parse_identifier_led_statement_into_current(),
			_ => {
				let token = self.lexer.peek()?;
				Err(Error::syntax(expected_message(TokenKind::Identifier), token.range))
			},
		}
	}

	/// Parses `{ statement* }`, opening a child scope for its contents and
	/// returning that scope together with the source range of the whole
	/// braced block.
	fn parse_block(&mut self) -> Result<(Scope, SourceRange), Error> {
		let open = self.expect(TokenKind::LeftBrace)?;
		self.scopes.push_child();
		loop {
			let kind = self.peek_kind()?;
			if kind == TokenKind::RightBrace {
				break;
			}
			if kind == TokenKind::Eof {
				return Err(Error::syntax(expected_message(TokenKind::RightBrace), open.range));
			}
			self.parse_one_statement()?;
		}
		let close = self.expect(TokenKind::RightBrace)?;
		let scope = self.scopes.pop();
		Ok((scope, open.range.to(close.range)))
	}

	fn parse_for(&mut self) -> Result<Statement, Error> {
		let for_token = self.expect(TokenKind::KeywordFor)?;
		self.expect(TokenKind::LeftParenthesis)?;
		self.scopes.push_child();

		if self.peek_kind()? == TokenKind::Semicolon {
			self.bump()?;
		} else {
			self.parse_identifier_led_statement_into_current()?;
		}

		let condition = if self.peek_kind()? == TokenKind::Semicolon { None } else { Some(self.parse_assignment(None)?) };
		self.expect(TokenKind::Semicolon)?;

		let iteration = if self.peek_kind()? == TokenKind::RightParenthesis { None } else { Some(self.parse_assignment(None)?) };
		self.expect(TokenKind::RightParenthesis)?;

		let (body_scope, body_range) = self.parse_block()?;
		let init_scope = self.scopes.pop();
		let range = for_token.range.to(body_range);
		Ok(Statement::ForLoop { init_scope: Box::new(init_scope), condition, iteration, body_scope: Box::new(body_scope), range })
	}

	fn parse_if(&mut self) -> Result<Statement, Error> {
		let if_token = self.expect(TokenKind::KeywordIf)?;
		self.expect(TokenKind::LeftParenthesis)?;
		let condition = self.parse_assignment(None)?;
		self.expect(TokenKind::RightParenthesis)?;
		let (true_scope, true_range) = self.parse_block()?;

		let (false_scope, end_range) = if self.peek_kind()? == TokenKind::KeywordElse {
			self.bump()?;
			if self.peek_kind()? == TokenKind::KeywordIf {
				self.scopes.push_child();
				let nested = self.parse_if()?;
				let nested_range = nested.range();
				self.scopes.current_mut().statements.push(nested);
				(self.scopes.pop(), nested_range)
			} else {
				self.parse_block()?
			}
		} else {
			self.scopes.push_child();
			(self.scopes.pop(), true_range)
		};

		let range = if_token.range.to(end_range);
		Ok(Statement::Conditional { condition, true_scope: Box::new(true_scope), false_scope: Box::new(false_scope), range })
	}

	fn parse_return(&mut self) -> Result<Statement, Error> {
		let return_token = self.expect(TokenKind::KeywordReturn)?;
		let value = if self.peek_kind()? == TokenKind::Semicolon { None } else { Some(self.parse_assignment(None)?) };
		let semicolon = self.expect(TokenKind::Semicolon)?;
		Ok(Statement::Return { value, range: return_token.range.to(semicolon.range) })
	}

	fn parse_break(&mut self) -> Result<Statement, Error> {
		let break_token = self.expect(TokenKind::KeywordBreak)?;
		let semicolon = self.expect(TokenKind::Semicolon)?;
		Ok(Statement::Break { range: break_token.range.to(semicolon.range) })
	}

	/// Consumes `IDENT ('::' IDENT)*`, the grammar's `identifier_expr`.
	fn parse_qualified_identifier(&mut self) -> Result<(String, SourceRange), Error> {
		let first = self.expect(TokenKind::Identifier)?;
		let mut name = first.identifier_name().to_owned();
		let mut range = first.range;
		while self.peek_kind()? == TokenKind::Scope {
			self.bump()?;
			let next = self.expect(TokenKind::Identifier)?;
			name.push_str("::");
			name.push_str(next.identifier_name());
			range = range.to(next.range);
		}
		Ok((name, range))
	}

	/// The context-sensitive heart of the parser: having just read a
	/// qualified identifier at statement position, decide whether it names
	/// a type (function definition or variable declaration) or is the
	/// start of an expression, by asking the live scope chain.
	fn parse_identifier_led_statement_into_current(&mut self) -> Result<(), Error> {
		let (name, name_range) = self.parse_qualified_identifier()?;
		let is_type = self.scopes.query_type(&name).is_some();

		if is_type {
			if self.peek_kind()? == TokenKind::Identifier && self.lexer.peek2()?.kind == TokenKind::LeftParenthesis {
				let statement = self.parse_function_definition(name, name_range)?;
				let index = self.scopes.current().statements.len();
				let function_name = match &statement {
					Statement::FunctionDefinition { name, .. } => name.clone(),
					_ => unreachable!("parse_function_definition always returns a FunctionDefinition"),
				};
				self.scopes.current_mut().statements.push(statement);
				self.scopes.current_mut().add_function(function_name, index);
				return Ok(());
			}
			return self.parse_variable_declaration_tail(name, name_range);
		}

		let pre = Expression::Identifier { full_name: name, range: name_range };
		let expr = self.parse_assignment(Some(pre))?;
		let semicolon = self.expect(TokenKind::Semicolon)?;
		let range = expr.range().to(semicolon.range);
		self.scopes.current_mut().statements.push(Statement::Expression { expr, range });
		Ok(())
	}

	fn parse_function_definition(&mut self, return_type: String, return_type_range: SourceRange) -> Result<Statement, Error> {
		let name_token = self.expect(TokenKind::Identifier)?;
		let name = name_token.identifier_name().to_owned();
		self.expect(TokenKind::LeftParenthesis)?;
		self.scopes.push_child();

		if self.peek_kind()? != TokenKind::RightParenthesis {
			loop {
				let param_type_token = self.expect(TokenKind::Identifier)?;
				let param_type = param_type_token.identifier_name().to_owned();
				if self.scopes.query_type(&param_type).is_none() {
					return Err(Error::semantic(format!("Undefined type '{param_type}'"), param_type_token.range));
				}
				let param_name_token = self.expect(TokenKind::Identifier)?;
				let param_name = param_name_token.identifier_name().to_owned();
				let range = param_type_token.range.to(param_name_token.range);
				self.scopes.current_mut().variable_declarations.push(VariableDeclaration {
					type_name: param_type,
					name: param_name,
					initializer: None,
					range,
				});
				if self.peek_kind()? == TokenKind::Comma {
					self.bump()?;
					continue;
				}
				break;
			}
		}
		self.expect(TokenKind::RightParenthesis)?;

		let (body_scope, body_range) = self.parse_block()?;
		let header_scope = self.scopes.pop();
		let range = return_type_range.to(body_range);
		Ok(Statement::FunctionDefinition { return_type_name: return_type, name, header_scope: Box::new(header_scope), body_scope: Box::new(body_scope), range })
	}

	fn parse_declarator(&mut self, type_name: &str, type_range: SourceRange, name: String, name_range: SourceRange) -> Result<(), Error> {
		let mut range = type_range.to(name_range);
		let initializer = if self.peek_kind()? == TokenKind::Assign {
			self.bump()?;
			let init = self.parse_assignment(None)?;
			range = range.to(init.range());
			Some(init)
		} else {
			None
		};
		let declaration = VariableDeclaration { type_name: type_name.to_owned(), name, initializer, range };
		self.scopes.current_mut().variable_declarations.push(declaration.clone());
		self.scopes.current_mut().statements.push(Statement::VariableDefinition { declaration, range });
		Ok(())
	}

	/// Parses the rest of `TYPE IDENT ('=' expr)? (',' (TYPE IDENT | IDENT) ('=' expr)?)* ';'`
	/// after the leading `TYPE` has already been consumed.
	fn parse_variable_declaration_tail(&mut self, first_type: String, type_range: SourceRange) -> Result<(), Error> {
		let first_name = self.expect(TokenKind::Identifier)?;
		let first_name_value = first_name.identifier_name().to_owned();
		self.parse_declarator(&first_type, type_range, first_name_value, first_name.range)?;

		let mut current_type = first_type;
		let mut current_type_range = type_range;

		while self.peek_kind()? == TokenKind::Comma {
			self.bump()?;
			let ident_token = self.expect(TokenKind::Identifier)?;
			let ident_name = ident_token.identifier_name().to_owned();
			let ident_range = ident_token.range;

			if self.scopes.query_type(&ident_name).is_some() && self.peek_kind()? == TokenKind::Identifier {
				current_type = ident_name;
				current_type_range = ident_range;
				let var_token = self.expect(TokenKind::Identifier)?;
				let var_name = var_token.identifier_name().to_owned();
				self.parse_declarator(&current_type, current_type_range, var_name, var_token.range)?;
			} else {
				self.parse_declarator(&current_type, current_type_range, ident_name, ident_range)?;
			}
		}

		self.expect(TokenKind::Semicolon)?;
		Ok(())
	}

	fn match_assign_op(&mut self) -> Result<Option<BinaryOperator>, Error> {
		let op = match self.peek_kind()? {
			TokenKind::Assign => BinaryOperator::Assign,
			TokenKind::MulAssign => BinaryOperator::MulAssign,
			TokenKind::DivAssign => BinaryOperator::DivAssign,
			TokenKind::ModAssign => BinaryOperator::ModAssign,
			TokenKind::AddAssign => BinaryOperator::AddAssign,
			TokenKind::SubAssign => BinaryOperator::SubAssign,
			TokenKind::ShlAssign => BinaryOperator::ShlAssign,
			TokenKind::ShrAssign => BinaryOperator::ShrAssign,
			TokenKind::AndAssign => BinaryOperator::AndAssign,
			TokenKind::XorAssign => BinaryOperator::XorAssign,
			TokenKind::OrAssign => BinaryOperator::OrAssign,
			_ => return Ok(None),
		};
		self.bump()?;
		Ok(Some(op))
	}

	/// `assignment := equality ( assign_op assignment )?` — right-associative,
	/// the only level that isn't a left-associative chain.
	fn parse_assignment(&mut self, pre: Option<Expression>) -> Result<Expression, Error> {
		let left = self.parse_equality(pre)?;
		if let Some(op) = self.match_assign_op()? {
			let right = self.parse_assignment(None)?;
			let range = left.range().to(right.range());
			return Ok(Expression::Binary { left: Box::new(left), op, right: Box::new(right), range });
		}
		Ok(left)
	}

	fn parse_equality(&mut self, pre: Option<Expression>) -> Result<Expression, Error> {
		let mut left = self.parse_relational(pre)?;
		loop {
			let op = match self.peek_kind()? {
				TokenKind::Equal => BinaryOperator::Equal,
				TokenKind::NotEqual => BinaryOperator::NotEqual,
				_ => break,
			};
			self.bump()?;
			let right = self.parse_relational(None)?;
			let range = left.range().to(right.range());
			left = Expression::Binary { left: Box::new(left), op, right: Box::new(right), range };
		}
		Ok(left)
	}

	fn parse_relational(&mut self, pre: Option<Expression>) -> Result<Expression, Error> {
		let mut left = self.parse_additive(pre)?;
		loop {
			let op = match self.peek_kind()? {
				TokenKind::Less => BinaryOperator::Less,
				TokenKind::LessEqual => BinaryOperator::LessEqual,
				TokenKind::Greater => BinaryOperator::Greater,
				TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
				_ => break,
			};
			self.bump()?;
			let right = self.parse_additive(None)?;
			let range = left.range().to(right.range());
			left = Expression::Binary { left: Box::new(left), op, right: Box::new(right), range };
		}
		Ok(left)
	}

	fn parse_additive(&mut self, pre: Option<Expression>) -> Result<Expression, Error> {
		let mut left = self.parse_multiplicative(pre)?;
		loop {
			let op = match self.peek_kind()? {
				TokenKind::Plus => BinaryOperator::Add,
				TokenKind::Minus => BinaryOperator::Sub,
				_ => break,
			};
			self.bump()?;
			let right = self.parse_multiplicative(None)?;
			let range = left.range().to(right.range());
			left = Expression::Binary { left: Box::new(left), op, right: Box::new(right), range };
		}
		Ok(left)
	}

	fn parse_multiplicative(&mut self, pre: Option<Expression>) -> Result<Expression, Error> {
		let mut left = self.parse_primary(pre)?;
		loop {
			let op = match self.peek_kind()? {
				TokenKind::Star => BinaryOperator::Mul,
				TokenKind::Slash => BinaryOperator::Div,
				TokenKind::Percent => BinaryOperator::Mod,
				_ => break,
			};
			self.bump()?;
			let right = self.parse_primary(None)?;
			let range = left.range().to(right.range());
			left = Expression::Binary { left: Box::new(left), op, right: Box::new(right), range };
		}
		Ok(left)
	}

	/// `primary := INTEGER | STRING | '(' expr ')' | call`. When `pre` is
	/// supplied (an identifier already consumed for disambiguation at
	/// statement position), it stands in for the `call` alternative instead
	/// of re-reading a token.
	fn parse_primary(&mut self, pre: Option<Expression>) -> Result<Expression, Error> {
		if let Some(expr) = pre {
			return self.parse_call_suffix(expr);
		}
		match self.peek_kind()? {
			TokenKind::Integer => {
				let token = self.bump()?;
				let TokenValue::Integer(value) = token.value else {
					unreachable!("Integer token always carries a TokenValue::Integer")
				};
				Ok(Expression::IntegerLiteral { value, range: token.range })
			},
			TokenKind::String => {
				let token = self.bump()?;
				let TokenValue::String(bytes) = token.value else {
					unreachable!("String token always carries a TokenValue::String")
				};
				Ok(Expression::StringLiteral { bytes, range: token.range })
			},
			TokenKind::LeftParenthesis => {
				let open = self.bump()?;
				let inner = self.parse_assignment(None)?;
				let close = self.expect(TokenKind::RightParenthesis)?;
				Ok(Expression::Parenthesized { inner: Box::new(inner), range: open.range.to(close.range) })
			},
			TokenKind::Identifier => {
				let (name, range) = self.parse_qualified_identifier()?;
				self.parse_call_suffix(Expression::Identifier { full_name: name, range })
			},
			_ => {
				let token = self.lexer.peek()?;
				Err(Error::syntax(expected_message(TokenKind::Identifier), token.range))
			},
		}
	}

	fn parse_call_suffix(&mut self, callee: Expression) -> Result<Expression, Error> {
		if self.peek_kind()? != TokenKind::LeftParenthesis {
			return Ok(callee);
		}
		self.bump()?;
		let mut arguments = Vec::new();
		if self.peek_kind()? != TokenKind::RightParenthesis {
			loop {
				arguments.push(self.parse_assignment(None)?);
				if self.peek_kind()? == TokenKind::Comma {
					self.bump()?;
					continue;
				}
				break;
			}
		}
		let close = self.expect(TokenKind::RightParenthesis)?;
		let range = callee.range().to(close.range);
		Ok(Expression::Call { callee: Box::new(callee), arguments, range })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::scope::Scope as GlobalScope;

	fn parse(source: &str) -> Result<GlobalScope, Error> {
		let mut scope = GlobalScope::global();
		parse_into(&mut scope, source)?;
		Ok(scope)
	}

	#[test]
	fn empty_input_parses_to_no_statements() {
		let scope = parse("").expect("parses");
		assert!(scope.statements.is_empty());
	}

	#[test]
	fn disambiguates_declaration_from_expression_statement() {
		let scope = parse("int x = 5; x = 6;").expect("parses");
		assert_eq!(scope.statements.len(), 2);
		assert!(matches!(scope.statements[0], Statement::VariableDefinition { .. }));
		assert!(matches!(scope.statements[1], Statement::Expression { .. }));
	}

	#[test]
	fn multi_declaration_reuses_previous_type() {
		let scope = parse("int x, y = 2;").expect("parses");
		assert_eq!(scope.variable_declarations.len(), 2);
		assert_eq!(scope.variable_declarations[0].type_name, "int");
		assert_eq!(scope.variable_declarations[1].type_name, "int");
		assert!(scope.variable_declarations[1].initializer.is_some());
	}

	#[test]
	fn multi_declaration_with_fresh_type() {
		let scope = parse("int x, void y;").expect("parses");
		assert_eq!(scope.variable_declarations[0].type_name, "int");
		assert_eq!(scope.variable_declarations[1].type_name, "void");
	}

	#[test]
	fn for_loop_builds_init_and_body_scopes() {
		let scope = parse("for (int i = 0; i; i = i) { }").expect("parses");
		let Statement::ForLoop { init_scope, body_scope, .. } = &scope.statements[0] else {
			panic!("expected a for loop");
		};
		assert_eq!(init_scope.variable_declarations.len(), 1);
		assert!(body_scope.statements.is_empty());
	}

	#[test]
	fn else_if_chain_nests_conditionals() {
		let scope = parse("if (x) { } else if (y) { } else { }").expect("parses");
		let Statement::Conditional { false_scope, .. } = &scope.statements[0] else {
			panic!("expected a conditional");
		};
		assert_eq!(false_scope.statements.len(), 1);
		assert!(matches!(false_scope.statements[0], Statement::Conditional { .. }));
	}

	#[test]
	fn function_definition_is_recognized_by_type_lookahead() {
		let scope = parse("int add(int a, int b) { return a + b; }").expect("parses");
		assert!(scope.query_function_local("add").is_some());
	}

	#[test]
	fn main_plus_global_statement_is_rejected() {
		let err = parse("int main() { return 0; } x = 1;").expect_err("should fail");
		assert_eq!(err.kind, crate::diagnostics::ErrorKind::Semantic);
	}

	#[test]
	fn undefined_type_in_declaration_is_a_semantic_error() {
		let err = parse("Widget thing;").expect_err("should fail");
		assert_eq!(err.kind, crate::diagnostics::ErrorKind::Semantic);
	}

	#[test]
	fn call_expression_parses_arguments() {
		let scope = parse("print(1, 2);").expect("parses");
		let Statement::Expression { expr: Expression::Call { arguments, .. }, .. } = &scope.statements[0] else {
			panic!("expected a call expression statement");
		};
		assert_eq!(arguments.len(), 2);
	}

	#[test]
	fn assignment_is_right_associative() {
		let scope = parse("int x = 0; int y = 0; x = y = 1;").expect("parses");
		let Statement::Expression { expr: Expression::Binary { op, right, .. }, .. } = &scope.statements[2] else {
			panic!("expected an assignment expression statement");
		};
		assert_eq!(*op, BinaryOperator::Assign);
		assert!(matches!(**right, Expression::Binary { op: BinaryOperator::Assign, .. }));
	}

	#[test]
	fn leading_minus_is_a_syntax_error() {
		let err = parse("int x = -1;").expect_err("unary minus is not supported");
		assert_eq!(err.kind, crate::diagnostics::ErrorKind::Syntax);
	}
}
