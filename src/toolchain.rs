//! Locates and invokes the external toolchain that turns an emitted
//! program into a running executable. This module is a thin collaborator,
//! not a compiler backend: it knows how to find a configured binary and
//! hand it two paths, nothing about what that binary actually does.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

const DEFAULT_TOOLCHAIN: &str = "cc";
const TOOLCHAIN_ENV_VAR: &str = "SCC_TOOLCHAIN";

/// Resolves which external toolchain binary to invoke: an explicit
/// `--toolchain` flag wins, then the `SCC_TOOLCHAIN` environment
/// variable, then the default. The name is checked against `PATH` so a
/// missing toolchain fails immediately with an actionable message instead
/// of a cryptic spawn error later.
pub fn resolve(explicit: Option<&str>) -> anyhow::Result<PathBuf> {
	let name = explicit.map(str::to_owned).or_else(|| std::env::var(TOOLCHAIN_ENV_VAR).ok()).unwrap_or_else(|| DEFAULT_TOOLCHAIN.to_owned());
	which::which(&name).with_context(|| format!("could not find '{name}' on your PATH; pass --toolchain or set {TOOLCHAIN_ENV_VAR}"))
}

/// Invokes the resolved toolchain on the emitted source, producing
/// `output_path`.
pub fn compile(toolchain: &Path, emitted_path: &Path, output_path: &Path) -> anyhow::Result<()> {
	let status = std::process::Command::new(toolchain)
		.arg(emitted_path)
		.arg("-o")
		.arg(output_path)
		.status()
		.with_context(|| format!("failed to invoke {}", toolchain.display()))?;
	anyhow::ensure!(status.success(), "{} exited with a failure status", toolchain.display());
	Ok(())
}

/// Runs a previously compiled executable to completion.
pub fn run(executable_path: &Path) -> anyhow::Result<()> {
	let status = std::process::Command::new(executable_path).status().with_context(|| format!("failed to run {}", executable_path.display()))?;
	anyhow::ensure!(status.success(), "program exited with a failure status");
	Ok(())
}
