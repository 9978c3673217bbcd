// ---------------------------------------------------------------------------
// Store persistence -- single JSON record on disk
// ---------------------------------------------------------------------------
//
// File format: one pretty-printed JSON object (4-space indent)
//
//   { "greetings": [..], "goodbyes": [..], "keywords": [..], "responses": [..] }
//
// Writes go to a sibling `<name>.tmp` file first and are renamed over the
// target, so a failed or interrupted write leaves the previous file intact.
// On Unix the parent directory is synced afterwards so the rename is durable.
// ---------------------------------------------------------------------------

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

pub const DEFAULT_STORE_FILE: &str = "chat_data.json";

pub const DEFAULT_GREETINGS: [&str; 3] = ["Hello!", "Hi!", "Hey!"];
pub const DEFAULT_GOODBYES: [&str; 3] = ["Goodbye!", "See you!", "Take care!"];

/// The on-disk record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
	#[serde(default = "default_greetings")]
	pub greetings: Vec<String>,
	#[serde(default = "default_goodbyes")]
	pub goodbyes: Vec<String>,
	#[serde(default)]
	pub keywords: Vec<String>,
	#[serde(default)]
	pub responses: Vec<String>,
}

impl Default for PersistedState {
	fn default() -> Self {
		Self {
			greetings: default_greetings(),
			goodbyes: default_goodbyes(),
			keywords: Vec::new(),
			responses: Vec::new(),
		}
	}
}

fn default_greetings() -> Vec<String> {
	DEFAULT_GREETINGS.iter().map(|s| s.to_string()).collect()
}

fn default_goodbyes() -> Vec<String> {
	DEFAULT_GOODBYES.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Read the persisted record at `path`.
///
/// Returns `Ok(None)` when no file exists; that is the normal first-run state.
/// Unparseable content is reported as `CorruptStore`.
pub fn load_state(path: &Path) -> Result<Option<PersistedState>, ChatError> {
	let raw = match fs::read(path) {
		Ok(bytes) => bytes,
		Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
		Err(e) => return Err(ChatError::Io(e)),
	};

	let state: PersistedState = serde_json::from_slice(&raw).map_err(|e| {
		ChatError::CorruptStore(format!("Invalid store JSON in {}: {}", path.display(), e))
	})?;

	Ok(Some(state))
}

/// Overwrite `path` with `state`, creating parent directories as needed.
pub fn save_state(path: &Path, state: &PersistedState) -> Result<(), ChatError> {
	let json = to_pretty_json(state)?;

	let parent = path
		.parent()
		.filter(|p| !p.as_os_str().is_empty())
		.unwrap_or(Path::new("."));
	fs::create_dir_all(parent)?;

	let tmp = temp_path(path);
	let written = write_synced(&tmp, &json).and_then(|()| fs::rename(&tmp, path));
	if let Err(e) = written {
		let _ = fs::remove_file(&tmp);
		return Err(ChatError::Io(e));
	}

	sync_dir(parent)?;
	Ok(())
}

fn to_pretty_json(state: &PersistedState) -> Result<Vec<u8>, ChatError> {
	let mut buf = Vec::new();
	let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
	let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
	state
		.serialize(&mut ser)
		.map_err(|e| ChatError::Serialization(format!("Failed to serialize store: {}", e)))?;
	Ok(buf)
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
	let mut file = File::create(path)?;
	file.write_all(data)?;
	file.sync_all()
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
	File::open(dir)?.sync_all()
}

// Directories cannot be opened as files here.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
	Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
	let mut name = path
		.file_name()
		.map(|n| n.to_os_string())
		.unwrap_or_else(|| OsString::from(DEFAULT_STORE_FILE));
	name.push(".tmp");
	path.with_file_name(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
