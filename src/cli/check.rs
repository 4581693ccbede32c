use std::path::PathBuf;

use colored::Colorize as _;

use super::Command;

/// Tokenizes and parses a file without emitting anything, reporting the
/// first diagnostic encountered.
#[derive(clap::Args)]
pub struct CheckCommand {
	/// The source file to check.
	pub file: PathBuf,
}

impl Command for CheckCommand {
	fn execute(self) -> anyhow::Result<()> {
		let source = std::fs::read_to_string(&self.file)?;
		let path = self.file.display().to_string();

		let mut scope = scc::new_compile_unit();
		match scc::parse_into(&mut scope, &source) {
			Ok(()) => {
				println!("{}", "no errors found".green());
				Ok(())
			},
			Err(error) => {
				eprint!("{}", super::render_diagnostic(&path, &source, &error));
				std::process::exit(1);
			},
		}
	}
}
