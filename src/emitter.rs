//! Translates a parsed [`Scope`] into the target language's source text.
//!
//! Uses an indenting writer: a stack of indent strings plus a
//! start-of-line flag, so indentation is only ever written once, lazily,
//! at the first byte of a line.

use std::fmt::{self, Write};

use crate::{
	ast::{Expression, Statement},
	scope::Scope,
};

const INDENT_STEP: &str = "    ";

struct IndentingWriter<W: Write> {
	sink: W,
	indent: String,
	at_line_start: bool,
}

impl<W: Write> IndentingWriter<W> {
	fn new(sink: W) -> Self {
		Self { sink, indent: String::new(), at_line_start: true }
	}

	fn push_indent(&mut self) {
		self.indent.push_str(INDENT_STEP);
	}

	fn pop_indent(&mut self) {
		let new_len = self.indent.len().saturating_sub(INDENT_STEP.len());
		self.indent.truncate(new_len);
	}

	fn write_str(&mut self, text: &str) -> fmt::Result {
		for (index, line) in text.split('\n').enumerate() {
			if index > 0 {
				self.sink.write_char('\n')?;
				self.at_line_start = true;
			}
			if line.is_empty() {
				continue;
			}
			if self.at_line_start {
				self.sink.write_str(&self.indent)?;
				self.at_line_start = false;
			}
			self.sink.write_str(line)?;
		}
		Ok(())
	}

	fn writeln(&mut self, text: &str) -> fmt::Result {
		self.write_str(text)?;
		self.sink.write_char('\n')?;
		self.at_line_start = true;
		Ok(())
	}
}

/// Writes the translated program for `scope` (expected to be the finished
/// global scope returned by [`crate::parse_into`]) to `sink`.
pub fn emit(scope: &Scope, sink: &mut impl Write) -> fmt::Result {
	let mut writer = IndentingWriter::new(sink);
	emit_global_scope(&mut writer, scope)
}

fn emit_global_scope(writer: &mut IndentingWriter<impl Write>, scope: &Scope) -> fmt::Result {
	let has_user_main = scope.query_function_local("main").is_some();

	writer.writeln("// scc autogenerated file.")?;
	writer.writeln("")?;
	writer.writeln("import scc.std;")?;
	writer.writeln("")?;

	// Forward declarations: every user function except `main`, which is
	// declared once below regardless of whether it's user-defined or the
	// autogenerated entry point (nothing ever calls `main` forward).
	for statement in &scope.statements {
		if let Statement::FunctionDefinition { return_type_name, name, header_scope, .. } = statement {
			if name != "main" {
				writer.writeln(&format!("{} {};", return_type_name, function_signature(name, header_scope)))?;
			}
		}
	}
	if has_user_main {
		let main_definition = scope.statements.iter().find(|statement| matches!(statement, Statement::FunctionDefinition { name, .. } if name == "main"));
		if let Some(Statement::FunctionDefinition { return_type_name, name, header_scope, .. }) = main_definition {
			writer.writeln(&format!("{} {};", return_type_name, function_signature(name, header_scope)))?;
		}
	} else {
		writer.writeln("int main();")?;
	}
	writer.writeln("")?;

	for statement in &scope.statements {
		if matches!(statement, Statement::FunctionDefinition { .. }) {
			emit_statement(writer, statement)?;
			writer.writeln("")?;
		}
	}

	if !has_user_main {
		writer.writeln("int main()")?;
		writer.writeln("{")?;
		writer.push_indent();
		for statement in &scope.statements {
			if !matches!(statement, Statement::FunctionDefinition { .. }) {
				emit_statement(writer, statement)?;
			}
		}
		writer.writeln("return 0;")?;
		writer.pop_indent();
		writer.writeln("}")?;
	}

	Ok(())
}

fn function_signature(name: &str, header_scope: &Scope) -> String {
	let params = header_scope
		.variable_declarations
		.iter()
		.map(|declaration| format!("{} {}", declaration.type_name, declaration.name))
		.collect::<Vec<_>>()
		.join(", ");
	format!("{name}({params})")
}

fn emit_scope_block(writer: &mut IndentingWriter<impl Write>, scope: &Scope) -> fmt::Result {
	writer.writeln("{")?;
	writer.push_indent();
	for statement in &scope.statements {
		emit_statement(writer, statement)?;
	}
	writer.pop_indent();
	writer.writeln("}")
}

fn emit_statement(writer: &mut IndentingWriter<impl Write>, statement: &Statement) -> fmt::Result {
	match statement {
		Statement::Expression { expr, .. } => {
			writer.writeln(&format!("{};", emit_expression(expr)))?;
		},
		Statement::VariableDefinition { declaration, .. } => {
			let braced = declaration.initializer.as_ref().map_or_else(|| "{}".to_owned(), |expr| format!("{{ {} }}", emit_expression(expr)));
			writer.writeln(&format!("{} {} {braced};", declaration.type_name, declaration.name))?;
		},
		Statement::ForLoop { init_scope, condition, iteration, body_scope, .. } => {
			writer.writeln("{")?;
			writer.push_indent();
			for init_statement in &init_scope.statements {
				emit_statement(writer, init_statement)?;
			}
			writer.writeln("")?;
			let condition = condition.as_ref().map_or_else(String::new, |expr| emit_expression(expr));
			let iteration = iteration.as_ref().map_or_else(String::new, |expr| emit_expression(expr));
			writer.writeln(&format!("for (; {condition}; {iteration})"))?;
			emit_scope_block(writer, body_scope)?;
			writer.pop_indent();
			writer.writeln("}")?;
		},
		Statement::Conditional { condition, true_scope, false_scope, .. } => {
			writer.writeln(&format!("if ({})", emit_expression(condition)))?;
			emit_scope_block(writer, true_scope)?;
			writer.writeln("else")?;
			emit_scope_block(writer, false_scope)?;
		},
		Statement::Return { value, .. } => {
			let value = value.as_ref().map_or_else(String::new, |expr| format!(" {}", emit_expression(expr)));
			writer.writeln(&format!("return{value};"))?;
		},
		Statement::Break { .. } => {
			writer.writeln("break;")?;
		},
		Statement::FunctionDefinition { return_type_name, name, header_scope, body_scope, .. } => {
			writer.writeln(&format!("{} {}", return_type_name, function_signature(name, header_scope)))?;
			emit_scope_block(writer, body_scope)?;
		},
	}
	Ok(())
}

fn emit_expression(expr: &Expression) -> String {
	match expr {
		Expression::Binary { left, op, right, .. } => {
			format!("{} {} {}", emit_expression(left), op.as_str(), emit_expression(right))
		},
		Expression::Parenthesized { inner, .. } => format!("({})", emit_expression(inner)),
		Expression::Identifier { full_name, .. } => emit_identifier(full_name),
		Expression::IntegerLiteral { value, .. } => value.to_string(),
		Expression::StringLiteral { bytes, .. } => emit_string_literal(bytes),
		Expression::Call { callee, arguments, .. } => {
			let args = arguments.iter().map(emit_expression).collect::<Vec<_>>().join(", ");
			format!("{}({args})", emit_expression(callee))
		},
	}
}

/// Rewrites any identifier beginning with `std::` to `scc::std::…`, leaving
/// every other identifier untouched.
fn emit_identifier(full_name: &str) -> String {
	full_name.strip_prefix("std::").map_or_else(|| full_name.to_owned(), |rest| format!("scc::std::{rest}"))
}

fn emit_string_literal(bytes: &[u8]) -> String {
	let mut out = String::from("\"");
	for &byte in bytes {
		if byte == b'"' {
			out.push_str("\\\"");
		} else if byte == b'\\' {
			out.push_str("\\\\");
		} else if (0x20..0x7F).contains(&byte) {
			out.push(byte as char);
		} else {
			out.push_str(&format!("\\{byte:03o}"));
		}
	}
	out.push('"');
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::parser::parse_into;

	fn emit_source(source: &str) -> String {
		let mut scope = crate::new_compile_unit();
		parse_into(&mut scope, source).expect("parses");
		let mut out = String::new();
		emit(&scope, &mut out).expect("emits");
		out
	}

	#[test]
	fn empty_program_still_gets_the_wrapping_main() {
		let output = emit_source("");
		assert!(output.contains("int main()"));
		assert!(output.contains("return 0;"));
	}

	#[test]
	fn rewrites_std_prefixed_identifiers() {
		let output = emit_source(r#"std::print("hi");"#);
		assert!(output.contains("scc::std::print"));
		assert!(!output.contains("std::print(\"hi\")"));
	}

	#[test]
	fn escapes_non_printable_bytes_as_octal() {
		let output = emit_source(r#"std::print("a\tb");"#);
		assert!(output.contains("\\011"));
	}

	#[test]
	fn break_emits_a_break_statement() {
		let output = emit_source("for (int i = 0; i; i = i) { break; }");
		assert!(output.contains("break;"));
	}

	#[test]
	fn user_defined_main_suppresses_the_autogenerated_wrapper() {
		let output = emit_source("int main() { return 0; }");
		assert_eq!(output.matches("return 0;").count(), 1);
	}

	#[test]
	fn uninitialized_definition_emits_empty_braces_with_no_interior_spaces() {
		let output = emit_source("int x;");
		assert!(output.contains("int x {};"));
		assert!(!output.contains("{  }"));
	}

	#[test]
	fn initialized_definition_emits_braced_initializer() {
		let output = emit_source("int x = 5;");
		assert!(output.contains("int x { 5 };"));
	}
}
