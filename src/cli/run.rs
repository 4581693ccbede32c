use std::{env, path::PathBuf};

use super::Command;
use crate::toolchain;

/// Transpiles a file, compiles the result with the configured external
/// toolchain, and runs the produced executable.
#[derive(clap::Args)]
pub struct RunCommand {
	/// The source file to run.
	pub file: PathBuf,

	/// Overrides the external toolchain binary (otherwise `SCC_TOOLCHAIN`, then `cc`).
	#[arg(long)]
	pub toolchain: Option<String>,

	/// Keeps the intermediate emitted file instead of deleting it after compiling.
	#[arg(long)]
	pub keep: bool,
}

impl Command for RunCommand {
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

		let emitted_path = env::temp_dir().join("scc_emitted.scc");
		std::fs::write(&emitted_path, &emitted)?;

		let toolchain_path = toolchain::resolve(self.toolchain.as_deref())?;
		let executable_path = env::temp_dir().join("scc_executable");
		toolchain::compile(&toolchain_path, &emitted_path, &executable_path)?;

		if !self.keep {
			std::fs::remove_file(&emitted_path).ok();
		}

		toolchain::run(&executable_path)
	}
}
