// ---------------------------------------------------------------------------
// VocabularyStore -- learned (keyword, response) pairs plus greeting pools
// ---------------------------------------------------------------------------

use std::path::Path;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::error::ChatError;
use crate::normalize::normalized_tokens;
use crate::persistence::{self, PersistedState};

/// Ordered keyword/response pairs and the greeting/goodbye pools.
///
/// `keywords[i]` always pairs with `responses[i]`. Pairs can only be
/// appended, never edited or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyStore {
	greetings: Vec<String>,
	goodbyes: Vec<String>,
	keywords: Vec<String>,
	responses: Vec<String>,
}

impl Default for VocabularyStore {
	fn default() -> Self {
		let state = PersistedState::default();
		Self {
			greetings: state.greetings,
			goodbyes: state.goodbyes,
			keywords: Vec::new(),
			responses: Vec::new(),
		}
	}
}

impl VocabularyStore {
	/// An empty store with custom pools.
	pub fn with_pools(greetings: Vec<String>, goodbyes: Vec<String>) -> Self {
		Self {
			greetings,
			goodbyes,
			keywords: Vec::new(),
			responses: Vec::new(),
		}
	}

	/// Validate a persisted record and adopt it.
	pub fn from_state(state: PersistedState) -> Result<Self, ChatError> {
		if state.keywords.len() != state.responses.len() {
			return Err(ChatError::CorruptStore(format!(
				"{} keywords but {} responses",
				state.keywords.len(),
				state.responses.len()
			)));
		}
		Ok(Self {
			greetings: state.greetings,
			goodbyes: state.goodbyes,
			keywords: state.keywords,
			responses: state.responses,
		})
	}

	pub fn to_state(&self) -> PersistedState {
		PersistedState {
			greetings: self.greetings.clone(),
			goodbyes: self.goodbyes.clone(),
			keywords: self.keywords.clone(),
			responses: self.responses.clone(),
		}
	}

	/// Load the store at `path`, or the defaults if nothing has been saved yet.
	pub fn load(path: &Path) -> Result<Self, ChatError> {
		match persistence::load_state(path)? {
			Some(state) => Self::from_state(state),
			None => {
				tracing::debug!(path = %path.display(), "No store on disk, using defaults");
				Ok(Self::default())
			}
		}
	}

	/// Write the full store to `path`.
	pub fn persist(&self, path: &Path) -> Result<(), ChatError> {
		persistence::save_state(path, &self.to_state())
	}

	/// Append one pair. Blank keywords or responses are rejected and leave the
	/// store untouched.
	pub fn append(
		&mut self,
		keyword: impl Into<String>,
		response: impl Into<String>,
	) -> Result<(), ChatError> {
		let keyword = keyword.into();
		let response = response.into();
		if keyword.trim().is_empty() {
			return Err(ChatError::Validation("keyword must not be blank".into()));
		}
		if normalized_tokens(&keyword).is_empty() {
			return Err(ChatError::Validation("keyword has no words".into()));
		}
		if response.trim().is_empty() {
			return Err(ChatError::Validation("response must not be blank".into()));
		}
		self.keywords.push(keyword);
		self.responses.push(response);
		Ok(())
	}

	pub fn keywords(&self) -> &[String] {
		&self.keywords
	}

	pub fn responses(&self) -> &[String] {
		&self.responses
	}

	pub fn response(&self, index: usize) -> Option<&str> {
		self.responses.get(index).map(String::as_str)
	}

	pub fn greetings(&self) -> &[String] {
		&self.greetings
	}

	pub fn goodbyes(&self) -> &[String] {
		&self.goodbyes
	}

	/// Number of keyword/response pairs.
	pub fn len(&self) -> usize {
		self.keywords.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keywords.is_empty()
	}

	// ── Pools ─────────────────────────────────────────────────────────────

	pub fn greeting(&self) -> Result<&str, ChatError> {
		self.greeting_with(&mut rand::rng())
	}

	pub fn goodbye(&self) -> Result<&str, ChatError> {
		self.goodbye_with(&mut rand::rng())
	}

	pub fn greeting_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str, ChatError> {
		pick(&self.greetings, "greetings", rng)
	}

	pub fn goodbye_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&str, ChatError> {
		pick(&self.goodbyes, "goodbyes", rng)
	}
}

fn pick<'a, R: Rng + ?Sized>(
	pool: &'a [String],
	name: &'static str,
	rng: &mut R,
) -> Result<&'a str, ChatError> {
	pool.choose(rng)
		.map(String::as_str)
		.ok_or(ChatError::EmptyPool(name))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
