use std::path::PathBuf;

use super::Command;

/// Tokenizes, parses, and emits the translated program, either to stdout
/// or to a given output file.
#[derive(clap::Args)]
pub struct TranspileCommand {
	/// The source file to transpile.
	pub file: PathBuf,

	/// Where to write the translated program. Defaults to stdout.
	#[arg(short, long)]
	pub output: Option<PathBuf>,
}

impl Command for TranspileCommand {
	fn execute(self) -> anyhow::Result<()> {
		let source = std::fs::read_to_string(&self.file)?;
		let path = self.file.display().to_string();

		let mut scope = scc::new_compile_unit();
		if let Err(error) = scc::parse_into(&mut scope, &source) {
			eprint!("{}", super::render_diagnostic(&path, &source, &error));
			std::process::exit(1);
		}

		let mut emitted = String::new();
		scc::emit(&scope, &mut emitted).expect("writing to a String cannot fail");

		match self.output {
			Some(output_path) => std::fs::write(output_path, emitted)?,
			None => print!("{emitted}"),
		}
		Ok(())
	}
}
