// ---------------------------------------------------------------------------
// ChatSession -- retrieval and online learning over one vocabulary
// ---------------------------------------------------------------------------
//
// Owns the loaded `VocabularyStore` and the `SimilarityIndex` fitted over its
// keywords. `respond` is read-only; `teach` is the only mutation path and
// rebuilds the index in full after every accepted pair.
// ---------------------------------------------------------------------------

use std::path::PathBuf;

use crate::error::ChatError;
use crate::index::{ScoredPhrase, SimilarityIndex};
use crate::normalize::normalize;
use crate::vocabulary::VocabularyStore;

/// Best score must be strictly above this for a match.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a `ChatSession`.
#[derive(Debug, Clone)]
pub struct SessionConfig {
	/// Where the store lives. `None` keeps everything in memory.
	pub storage_path: Option<PathBuf>,
	pub match_threshold: f64,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			storage_path: None,
			match_threshold: DEFAULT_MATCH_THRESHOLD,
		}
	}
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of looking up a user utterance.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
	Matched(String),
	Unmatched,
}

/// Result of a teach request.
#[derive(Debug, Clone, PartialEq)]
pub enum TeachOutcome {
	/// The pair was stored. Carries the new response when the taught keyword
	/// already answers the query that triggered the teach flow.
	Taught(Option<String>),
	/// Blank keyword or response, or a keyword with no words; nothing changed.
	Rejected,
}

/// Strict threshold test: a score equal to the threshold does not match.
pub fn accepts(score: f64, threshold: f64) -> bool {
	score > threshold
}

// ---------------------------------------------------------------------------
// ChatSession
// ---------------------------------------------------------------------------

pub struct ChatSession {
	store: VocabularyStore,
	index: SimilarityIndex,
	config: SessionConfig,
}

impl ChatSession {
	/// Load the store named by `config` (defaults if absent) and fit the index.
	pub fn open(config: SessionConfig) -> Result<Self, ChatError> {
		let store = match &config.storage_path {
			Some(path) => VocabularyStore::load(path)?,
			None => VocabularyStore::default(),
		};
		tracing::info!(
			path = ?config.storage_path,
			keywords = store.len(),
			"Vocabulary loaded"
		);
		Ok(Self::new(store, config))
	}

	/// Wrap an already-loaded store.
	pub fn new(store: VocabularyStore, config: SessionConfig) -> Self {
		let index = SimilarityIndex::build(store.keywords());
		Self {
			store,
			index,
			config,
		}
	}

	pub fn store(&self) -> &VocabularyStore {
		&self.store
	}

	pub fn index(&self) -> &SimilarityIndex {
		&self.index
	}

	pub fn greeting(&self) -> Result<&str, ChatError> {
		self.store.greeting()
	}

	pub fn goodbye(&self) -> Result<&str, ChatError> {
		self.store.goodbye()
	}

	// ── Retrieval ─────────────────────────────────────────────────────────

	/// Highest-scoring keyword for `query`, regardless of threshold.
	pub fn best_match(&self, query: &str) -> Option<ScoredPhrase> {
		self.index.best(query)
	}

	/// Up to `limit` candidates, best first.
	pub fn rank(&self, query: &str, limit: usize) -> Vec<ScoredPhrase> {
		let mut results = self.index.query(query);
		results.truncate(limit);
		results
	}

	/// Look up the canned response for `query`.
	pub fn respond(&self, query: &str) -> Outcome {
		let Some(hit) = self.best_match(query) else {
			return Outcome::Unmatched;
		};
		if !accepts(hit.score, self.config.match_threshold) {
			tracing::debug!(score = hit.score, "Best match below threshold");
			return Outcome::Unmatched;
		}
		match self.store.response(hit.index) {
			Some(response) => {
				tracing::debug!(index = hit.index, score = hit.score, "Matched keyword");
				Outcome::Matched(response.to_string())
			}
			None => Outcome::Unmatched,
		}
	}

	// ── Learning ──────────────────────────────────────────────────────────

	/// Learn a new `keyword` -> `response` pair after `query` went unmatched.
	///
	/// The extended store is written to disk before it replaces the in-memory
	/// one; if the write fails the session is left exactly as it was and the
	/// error is returned.
	pub fn teach(
		&mut self,
		query: &str,
		keyword: &str,
		response: &str,
	) -> Result<TeachOutcome, ChatError> {
		let mut candidate = self.store.clone();
		match candidate.append(keyword, response) {
			Ok(()) => {}
			Err(ChatError::Validation(reason)) => {
				tracing::debug!(%reason, "Teach request rejected");
				return Ok(TeachOutcome::Rejected);
			}
			Err(e) => return Err(e),
		}

		if let Some(path) = &self.config.storage_path {
			if let Err(e) = candidate.persist(path) {
				tracing::warn!(path = %path.display(), error = %e, "Failed to persist new keyword");
				return Err(e);
			}
		}

		self.store = candidate;
		self.index = SimilarityIndex::build(self.store.keywords());
		tracing::info!(keyword, keywords = self.store.len(), "Learned new keyword");

		let normalized_keyword = normalize(keyword);
		let immediate = (!normalized_keyword.is_empty()
			&& normalize(query).contains(&normalized_keyword))
		.then(|| response.to_string());
		Ok(TeachOutcome::Taught(immediate))
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
