//! Library surface for the `scc` source-to-source translator: a lexer, a
//! recursive-descent parser with inline scope resolution, and an emitter
//! that prints an equivalent program with C-family surface syntax. The
//! `scc` binary (see `src/main.rs`) is a thin CLI collaborator built on
//! top of exactly this interface.

pub mod ast;
pub mod diagnostics;
pub mod emitter;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod source;
pub mod token;

pub use diagnostics::Error;
pub use emitter::emit;
pub use parser::parse_into;
use scope::Scope;

/// Returns a fresh global scope with the built-in types (`int`, `void`)
/// already bound, ready to be passed to [`parse_into`].
#[must_use]
pub fn new_compile_unit() -> Scope {
	Scope::global()
}
