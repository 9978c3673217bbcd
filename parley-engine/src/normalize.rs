// ---------------------------------------------------------------------------
// Text normalization
// ---------------------------------------------------------------------------
//
// Lowercase, split into word tokens, stem, rejoin. Keyword phrases and live
// queries both go through `normalize` so they land in the same term space.
// ---------------------------------------------------------------------------

use std::sync::LazyLock;

use regex::Regex;

use crate::stemmer::stem;

static WORD_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Split text into lowercased, stemmed word tokens.
pub fn normalized_tokens(text: &str) -> Vec<String> {
	let lower = text.to_lowercase();
	WORD_PATTERN
		.find_iter(&lower)
		.map(|m| stable_stem(m.as_str()))
		.filter(|t| !t.is_empty())
		.collect()
}

/// Canonical form of `text`: stemmed tokens joined by single spaces.
pub fn normalize(text: &str) -> String {
	normalized_tokens(text).join(" ")
}

/// Stem until the token stops changing, so normalizing twice is a no-op.
fn stable_stem(token: &str) -> String {
	let mut current = stem(token);
	// Every pass either shortens the token or leaves it alone.
	for _ in 0..token.len() {
		let next = stem(&current);
		if next == current {
			break;
		}
		current = next;
	}
	current
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lowercases_and_stems() {
		assert_eq!(normalize("Running Dogs"), "run dog");
		assert_eq!(normalize("do you like pizza"), "do you like pizza");
	}

	#[test]
	fn punctuation_splits_tokens() {
		assert_eq!(normalize("hello, world!"), "hello world");
		assert_eq!(normalize("  lots   of\tspace\n"), "lot of space");
	}

	#[test]
	fn empty_and_punctuation_only() {
		assert_eq!(normalize(""), "");
		assert_eq!(normalize("?!..."), "");
		assert!(normalized_tokens("   ").is_empty());
	}

	#[test]
	fn keeps_digits_and_non_latin_tokens() {
		assert_eq!(normalize("Route 66"), "rout 66");
		assert_eq!(normalize("Привет мир"), "привет мир");
	}

	#[test]
	fn idempotent() {
		let samples = [
			"agreed",
			"The generalizations were conditional",
			"I'm feeling HAPPY today!!",
			"hopping, running & skipping",
			"conflated troubled sized",
			"relational rationality",
			"Größe İstanbul naïve",
			"snake_case words_here",
			"",
		];
		for s in samples {
			let once = normalize(s);
			assert_eq!(normalize(&once), once, "normalize({s:?})");
		}
	}

	#[test]
	fn stable_stem_settles_multi_pass_words() {
		// "agreed" stems to "agre", which stems again to "agr".
		assert_eq!(stem("agreed"), "agre");
		assert_eq!(stable_stem("agreed"), "agr");
		assert_eq!(normalize("agree"), normalize("agreed"));
	}
}
