//! The abstract syntax tree. Every node is a plain tagged sum type matched
//! exhaustively by the parser's callers and by the emitter — there is no
//! visitor trait and no virtual dispatch; adding a variant is a compile
//! error everywhere it isn't handled.

use crate::{diagnostics::SourceRange, scope::Scope};

/// A binary operator, covering both arithmetic/comparison and the
/// compound-assignment family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
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
	Mul,
	Div,
	Mod,
	Add,
	Sub,
	Equal,
	NotEqual,
	Less,
	LessEqual,
	Greater,
	GreaterEqual,
}

impl BinaryOperator {
	/// The textual form the emitter prints between operands.
	#[must_use]
	pub const fn as_str(self) -> &'static str {
		match self {
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
			Self::Mul => "*",
			Self::Div => "/",
			Self::Mod => "%",
			Self::Add => "+",
			Self::Sub => "-",
			Self::Equal => "==",
			Self::NotEqual => "!=",
			Self::Less => "<",
			Self::LessEqual => "<=",
			Self::Greater => ">",
			Self::GreaterEqual => ">=",
		}
	}
}

/// An expression. Composite variants own their children outright
/// (`Box<Expression>`); there are no shared or back-references anywhere in
/// the tree.
#[derive(Debug, Clone)]
pub enum Expression {
	Binary {
		left: Box<Expression>,
		op: BinaryOperator,
		right: Box<Expression>,
		range: SourceRange,
	},
	/// An explicitly parenthesized expression. Tracked as its own node
	/// (rather than discarded) so the emitter can restore the parentheses.
	Parenthesized {
		inner: Box<Expression>,
		range: SourceRange,
	},
	Identifier {
		full_name: String,
		range: SourceRange,
	},
	IntegerLiteral {
		value: u64,
		range: SourceRange,
	},
	StringLiteral {
		bytes: Vec<u8>,
		range: SourceRange,
	},
	Call {
		callee: Box<Expression>,
		arguments: Vec<Expression>,
		range: SourceRange,
	},
}

impl Expression {
	#[must_use]
	pub const fn range(&self) -> SourceRange {
		match self {
			Self::Binary { range, .. }
			| Self::Parenthesized { range, .. }
			| Self::Identifier { range, .. }
			| Self::IntegerLiteral { range, .. }
			| Self::StringLiteral { range, .. }
			| Self::Call { range, .. } => *range,
		}
	}
}

/// A named, typed variable declaration, with an optional initializer.
#[derive(Debug, Clone)]
pub struct VariableDeclaration {
	pub type_name: String,
	pub name: String,
	pub initializer: Option<Expression>,
	pub range: SourceRange,
}

/// A statement. Loop/conditional/function bodies own their child [`Scope`]
/// by value: once a scope is done being parsed it is popped off the
/// parser's scope stack and moved here, never referenced again by id.
#[derive(Debug, Clone)]
pub enum Statement {
	Expression {
		expr: Expression,
		range: SourceRange,
	},
	/// Declares and immediately defines a variable in the enclosing scope.
	/// The declaration itself also lives in `Scope::variable_declarations`
	/// at the same index as this statement occupies among declarations,
	/// per the one-to-one invariant between the two lists.
	VariableDefinition {
		declaration: VariableDeclaration,
		range: SourceRange,
	},
	ForLoop {
		init_scope: Box<Scope>,
		condition: Option<Expression>,
		iteration: Option<Expression>,
		body_scope: Box<Scope>,
		range: SourceRange,
	},
	Conditional {
		condition: Expression,
		true_scope: Box<Scope>,
		false_scope: Box<Scope>,
		range: SourceRange,
	},
	Return {
		value: Option<Expression>,
		range: SourceRange,
	},
	Break {
		range: SourceRange,
	},
	FunctionDefinition {
		return_type_name: String,
		name: String,
		header_scope: Box<Scope>,
		body_scope: Box<Scope>,
		range: SourceRange,
	},
}

impl Statement {
	#[must_use]
	pub const fn range(&self) -> SourceRange {
		match self {
			Self::Expression { range, .. }
			| Self::VariableDefinition { range, .. }
			| Self::ForLoop { range, .. }
			| Self::Conditional { range, .. }
			| Self::Return { range, .. }
			| Self::Break { range, .. }
			| Self::FunctionDefinition { range, .. } => *range,
		}
	}
}
