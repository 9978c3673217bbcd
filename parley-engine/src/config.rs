use std::path::PathBuf;

use clap::Parser;

use crate::persistence::DEFAULT_STORE_FILE;
use crate::session::{SessionConfig, DEFAULT_MATCH_THRESHOLD};

#[derive(Parser, Debug)]
#[command(name = "parley-engine", about = "Keyword-retrieval chat engine over JSON-RPC / NDJSON stdio")]
pub struct CliArgs {
	/// Path of the JSON vocabulary store (created on first teach)
	#[arg(long, default_value = DEFAULT_STORE_FILE, env = "PARLEY_STORE")]
	pub store: PathBuf,

	/// Keep the vocabulary in memory only; nothing is read or written
	#[arg(long)]
	pub ephemeral: bool,

	/// Similarity a match must exceed (strictly) to be answered
	#[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD, env = "PARLEY_THRESHOLD", value_parser = parse_threshold)]
	pub threshold: f64,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "PARLEY_LOG_LEVEL")]
	pub log_level: String,
}

/// Cosine scores lie in [0, 1], so the threshold must too.
fn parse_threshold(raw: &str) -> Result<f64, String> {
	let value: f64 = raw.parse().map_err(|e| format!("`{raw}` is not a number: {e}"))?;
	if (0.0..=1.0).contains(&value) {
		Ok(value)
	} else {
		Err(format!("`{raw}` is outside [0, 1]"))
	}
}

impl CliArgs {
	pub fn session_config(&self) -> SessionConfig {
		SessionConfig {
			storage_path: (!self.ephemeral).then(|| self.store.clone()),
			match_threshold: self.threshold,
		}
	}
}
