//! The CLI front end. A thin `clap`-derived binary driving the library
//! through exactly the interface in [`scc::parse_into`] / [`scc::emit`] —
//! none of the compilation logic lives here.

pub mod check;
pub mod run;
pub mod transpile;

use colored::Colorize as _;

/// Implemented by each subcommand's argument struct.
pub trait Command {
	fn execute(self) -> anyhow::Result<()>;
}

#[derive(clap::Subcommand)]
pub enum SubCommand {
	/// Tokenize and parse a file, reporting diagnostics without emitting anything.
	Check(check::CheckCommand),
	/// Tokenize, parse, and emit the translated program.
	Transpile(transpile::TranspileCommand),
	/// Transpile, compile with the configured toolchain, and run the result.
	Run(run::RunCommand),
}

impl SubCommand {
	pub fn execute(self) -> anyhow::Result<()> {
		match self {
			Self::Check(command) => command.execute(),
			Self::Transpile(command) => command.execute(),
			Self::Run(command) => command.execute(),
		}
	}
}

/// Renders a structured [`scc::Error`] as `path:line:column: error: message`
/// followed by the offending line and a caret underline, colored the way
/// terminal diagnostics in this family of compilers are colored.
#[must_use]
pub fn render_diagnostic(path: &str, source: &str, error: &scc::Error) -> String {
	let range = error.range;
	let line_text = source.lines().nth(range.start.line.saturating_sub(1)).unwrap_or("");
	let prefix = format!("{} | ", range.start.line);

	let underline_end_column = if range.end.line == range.start.line { range.end.column } else { line_text.len() + 1 };
	let width = underline_end_column.saturating_sub(range.start.column).max(1);
	let gutter = " ".repeat(prefix.len() + range.start.column.saturating_sub(1));

	format!(
		"{path}:{}:{}: {} {}\n{prefix}{line_text}\n{gutter}{}\n",
		range.start.line,
		range.start.column,
		"error:".red().bold(),
		error.message,
		"^".repeat(width).red(),
	)
}
