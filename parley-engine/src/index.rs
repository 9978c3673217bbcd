// ---------------------------------------------------------------------------
// Similarity Index -- TF-IDF vector space over keyword phrases
// ---------------------------------------------------------------------------
//
// Each keyword phrase is one document. Terms are its normalized tokens, single
// letters included; weights are raw counts times smoothed IDF
// `ln((1 + n) / (1 + df)) + 1`, and every document vector is L2-normalized.
// Queries are projected onto the fitted vocabulary and compared by cosine.
//
// The index is immutable: any change to the phrase list means building a new
// one from scratch.
// ---------------------------------------------------------------------------

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::cosine::{cosine_similarity, l2_normalize};
use crate::normalize::normalized_tokens;

/// A single similarity result: phrase position in storage order and score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPhrase {
	pub index: usize,
	pub score: f64,
}

/// A fitted TF-IDF model plus one vector per phrase.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
	/// term -> column
	vocabulary: HashMap<String, usize>,
	/// column -> inverse document frequency
	idf: Vec<f64>,
	/// phrase -> unit-length TF-IDF vector
	vectors: Vec<Vec<f64>>,
}

impl SimilarityIndex {
	/// Fit the model over `phrases`, treating each phrase as one document.
	pub fn build<S: AsRef<str>>(phrases: &[S]) -> Self {
		let documents: Vec<Vec<String>> = phrases.iter().map(|p| normalized_tokens(p.as_ref())).collect();

		// Sorted so column order does not depend on hash iteration.
		let terms: BTreeSet<&str> = documents.iter().flatten().map(String::as_str).collect();
		let vocabulary: HashMap<String, usize> = terms
			.into_iter()
			.enumerate()
			.map(|(col, term)| (term.to_string(), col))
			.collect();

		let mut doc_freqs = vec![0usize; vocabulary.len()];
		for doc in &documents {
			let unique: HashSet<usize> = doc.iter().filter_map(|t| vocabulary.get(t).copied()).collect();
			for col in unique {
				doc_freqs[col] += 1;
			}
		}

		let n = documents.len() as f64;
		let idf = doc_freqs
			.iter()
			.map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
			.collect();

		let mut index = Self {
			vocabulary,
			idf,
			vectors: Vec::new(),
		};
		index.vectors = documents.iter().map(|doc| index.weigh(doc)).collect();
		index
	}

	/// Score `text` against every phrase, highest first.
	///
	/// Ties keep storage order, so the first entry is always the earliest
	/// phrase among those with the top score. Returns an empty list when the
	/// index holds no phrases.
	pub fn query(&self, text: &str) -> Vec<ScoredPhrase> {
		if self.vectors.is_empty() {
			return Vec::new();
		}

		let query_vector = self.weigh(&normalized_tokens(text));
		let mut results: Vec<ScoredPhrase> = self
			.vectors
			.iter()
			.enumerate()
			.map(|(index, v)| ScoredPhrase {
				index,
				score: cosine_similarity(&query_vector, v),
			})
			.collect();

		// sort_by is stable
		results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
		results
	}

	/// The best-scoring phrase, earliest in storage order on ties.
	pub fn best(&self, text: &str) -> Option<ScoredPhrase> {
		self.query(text).into_iter().next()
	}

	/// Number of indexed phrases.
	pub fn phrase_count(&self) -> usize {
		self.vectors.len()
	}

	/// Number of distinct terms in the fitted vocabulary.
	pub fn term_count(&self) -> usize {
		self.vocabulary.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vectors.is_empty()
	}

	/// Project normalized terms onto the vocabulary. Unknown terms are dropped.
	fn weigh(&self, terms: &[String]) -> Vec<f64> {
		let mut v = vec![0.0; self.vocabulary.len()];
		for term in terms {
			if let Some(&col) = self.vocabulary.get(term) {
				v[col] += self.idf[col];
			}
		}
		l2_normalize(&mut v);
		v
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_index_returns_nothing() {
		let idx = SimilarityIndex::build::<&str>(&[]);
		assert!(idx.is_empty());
		assert_eq!(idx.term_count(), 0);
		assert!(idx.query("hello there").is_empty());
		assert!(idx.best("hello there").is_none());
	}

	#[test]
	fn self_match_is_exact() {
		let idx = SimilarityIndex::build(&["good morning", "what is your name", "pizza"]);
		for (i, phrase) in ["good morning", "what is your name", "pizza"].iter().enumerate() {
			let best = idx.best(phrase).unwrap();
			assert_eq!(best.index, i);
			assert!((best.score - 1.0).abs() < 1e-9, "{phrase}: {}", best.score);
		}
	}

	#[test]
	fn stemming_bridges_word_forms() {
		let idx = SimilarityIndex::build(&["running shoes"]);
		let best = idx.best("Do you sell shoe for runners who run?").unwrap();
		assert!(best.score > 0.5);
	}

	#[test]
	fn out_of_vocabulary_query_scores_zero() {
		let idx = SimilarityIndex::build(&["pizza", "weather today"]);
		let results = idx.query("quantum chromodynamics");
		assert_eq!(results.len(), 2);
		assert!(results.iter().all(|r| r.score == 0.0));
	}

	#[test]
	fn results_sorted_descending_with_stable_ties() {
		let idx = SimilarityIndex::build(&["cats", "dogs and cats", "cats", "birds"]);
		let results = idx.query("cats");
		for pair in results.windows(2) {
			assert!(pair[0].score >= pair[1].score);
		}
		// "cats" is stored twice; the earlier copy wins.
		assert_eq!(results[0].index, 0);
		assert_eq!(results[1].index, 2);
		assert_eq!(results.last().unwrap().index, 3);
	}

	#[test]
	fn rare_terms_weigh_more() {
		let idx = SimilarityIndex::build(&["the weather", "the pizza", "the music"]);
		// "the" appears everywhere, "pizza" once.
		let results = idx.query("the pizza please");
		assert_eq!(results[0].index, 1);
		assert!(results[0].score > results[1].score);
		assert!(results[1].score > 0.0);
	}

	#[test]
	fn single_letter_phrases_are_matchable() {
		let idx = SimilarityIndex::build(&["I", "u r", "pizza"]);
		assert_eq!(idx.term_count(), 4);
		for (i, phrase) in ["I", "u r"].iter().enumerate() {
			let best = idx.best(phrase).unwrap();
			assert_eq!(best.index, i);
			assert!((best.score - 1.0).abs() < 1e-9, "{phrase}: {}", best.score);
		}
	}

	#[test]
	fn idf_uses_smoothed_formula() {
		let idx = SimilarityIndex::build(&["alpha beta", "alpha"]);
		let alpha = idx.vocabulary["alpha"];
		let beta = idx.vocabulary["beta"];
		assert!((idx.idf[alpha] - 1.0).abs() < 1e-12);
		assert!((idx.idf[beta] - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
	}

	#[test]
	fn four_equal_terms_against_one_is_half() {
		let idx = SimilarityIndex::build(&["north south east west"]);
		let best = idx.best("north").unwrap();
		assert!((best.score - 0.5).abs() < 1e-9);
	}
}
