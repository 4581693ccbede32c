//! Scopes and the symbol table. Each [`Scope`] owns its statements and
//! declarations; resolution during parsing walks the parser's live stack of
//! open scopes rather than re-deriving a parent chain from stored ids, so
//! lookups never need a back-reference into a partially built tree.

use std::collections::HashMap;

use crate::ast::{Statement, VariableDeclaration};

/// Identity of a scope, assigned in creation order. Stored on `Scope` for
/// data-model fidelity; not used to walk the parent chain (see module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub usize);

/// A named, built-in or user-visible type. This system has no type
/// inference: a `TypeInfo` is only ever constructed for `int` and `void`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
	pub full_name: String,
}

/// A lexical region: a sequence of statements plus the names it binds.
#[derive(Debug, Clone)]
pub struct Scope {
	pub id: ScopeId,
	pub parent: Option<ScopeId>,
	pub statements: Vec<Statement>,
	pub variable_declarations: Vec<VariableDeclaration>,
	types: HashMap<String, TypeInfo>,
	functions: Vec<(String, usize)>,
}

impl Scope {
	#[must_use]
	pub fn new(id: ScopeId, parent: Option<ScopeId>) -> Self {
		Self {
			id,
			parent,
			statements: Vec::new(),
			variable_declarations: Vec::new(),
			types: HashMap::new(),
			functions: Vec::new(),
		}
	}

	/// The global scope, pre-populated with the built-in `int` and `void`
	/// types.
	#[must_use]
	pub fn global() -> Self {
		let mut scope = Self::new(ScopeId(0), None);
		scope.define_type("int");
		scope.define_type("void");
		scope
	}

	pub fn define_type(&mut self, name: impl Into<String>) {
		let name = name.into();
		self.types.insert(name.clone(), TypeInfo { full_name: name });
	}

	#[must_use]
	pub fn query_type_local(&self, name: &str) -> Option<&TypeInfo> {
		self.types.get(name)
	}

	pub fn add_function(&mut self, name: impl Into<String>, statement_index: usize) {
		self.functions.push((name.into(), statement_index));
	}

	#[must_use]
	pub fn query_function_local(&self, name: &str) -> Option<usize> {
		self.functions.iter().find(|(existing, _)| existing == name).map(|(_, index)| *index)
	}

	/// Function bindings in the order they were declared.
	pub fn functions(&self) -> impl Iterator<Item = &(String, usize)> {
		self.functions.iter()
	}
}

/// The parser's live stack of currently-open scopes; `last()` is the
/// innermost scope enclosing the cursor. Lookups scan from the top down,
/// which is exactly the lexical parent chain at the current parse point.
#[derive(Debug, Default)]
pub struct ScopeStack {
	scopes: Vec<Scope>,
	next_id: usize,
}

impl ScopeStack {
	#[must_use]
	pub fn new() -> Self {
		Self::with_global(Scope::global())
	}

	/// Builds a stack whose sole open scope is an already-constructed
	/// global scope (as returned by [`crate::new_compile_unit`]).
	#[must_use]
	pub fn with_global(global: Scope) -> Self {
		Self { scopes: vec![global], next_id: 1 }
	}

	/// Opens a new child scope of the current top-of-stack scope and makes
	/// it current.
	pub fn push_child(&mut self) -> ScopeId {
		let parent = self.current_id();
		let id = ScopeId(self.next_id);
		self.next_id += 1;
		self.scopes.push(Scope::new(id, Some(parent)));
		id
	}

	/// Pops and returns the current scope, restoring its parent as current.
	/// Panics if called with only the global scope left open, which would
	/// indicate a parser bug (every push has a matching pop before parsing
	/// completes).
	pub fn pop(&mut self) -> Scope {
		assert!(self.scopes.len() > 1, "internal error: popped the global scope");
		self.scopes.pop().unwrap_or_else(|| unreachable!("length just checked"))
	}

	#[must_use]
	pub fn current_id(&self) -> ScopeId {
		self.current().id
	}

	#[must_use]
	pub fn current(&self) -> &Scope {
		self.scopes.last().unwrap_or_else(|| unreachable!("global scope is never popped"))
	}

	#[must_use]
	pub fn current_mut(&mut self) -> &mut Scope {
		self.scopes.last_mut().unwrap_or_else(|| unreachable!("global scope is never popped"))
	}

	/// Walks from the innermost open scope outward, returning the first
	/// type binding found.
	#[must_use]
	pub fn query_type(&self, name: &str) -> Option<&TypeInfo> {
		self.scopes.iter().rev().find_map(|scope| scope.query_type_local(name))
	}

	/// True once the global scope (and only the global scope) remains open.
	#[must_use]
	pub fn at_global_scope(&self) -> bool {
		self.scopes.len() == 1
	}

	/// Takes ownership of the global scope. Only valid once every child
	/// scope has been popped back in (i.e. parsing has finished).
	#[must_use]
	pub fn into_global(mut self) -> Scope {
		assert!(self.at_global_scope(), "internal error: global scope requested before parsing finished");
		self.scopes.pop().unwrap_or_else(|| unreachable!("length just checked"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn global_scope_has_builtin_types() {
		let stack = ScopeStack::new();
		assert!(stack.query_type("int").is_some());
		assert!(stack.query_type("void").is_some());
		assert!(stack.query_type("nonexistent").is_none());
	}

	#[test]
	fn lookup_walks_parent_chain() {
		let mut stack = ScopeStack::new();
		stack.push_child();
		assert!(stack.query_type("int").is_some(), "child scope should see global types");
	}

	#[test]
	fn pop_restores_parent_as_current() {
		let mut stack = ScopeStack::new();
		let global = stack.current_id();
		let child = stack.push_child();
		assert_eq!(stack.current_id(), child);
		stack.pop();
		assert_eq!(stack.current_id(), global);
	}
}
