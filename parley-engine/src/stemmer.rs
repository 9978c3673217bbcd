// ---------------------------------------------------------------------------
// Porter stemmer
// ---------------------------------------------------------------------------
//
// Suffix-stripping stemmer after M.F. Porter (1980), operating on lowercase
// ASCII words. Two widely used refinements are applied: words of two letters
// or fewer are returned untouched, and step 1c only rewrites a final `y` to
// `i` when it follows a consonant that is not the first letter.
// ---------------------------------------------------------------------------

const STEP2_RULES: &[(&str, &str)] = &[
	("ational", "ate"),
	("tional", "tion"),
	("enci", "ence"),
	("anci", "ance"),
	("izer", "ize"),
	("bli", "ble"),
	("alli", "al"),
	("entli", "ent"),
	("eli", "e"),
	("ousli", "ous"),
	("ization", "ize"),
	("ation", "ate"),
	("ator", "ate"),
	("alism", "al"),
	("iveness", "ive"),
	("fulness", "ful"),
	("ousness", "ous"),
	("aliti", "al"),
	("iviti", "ive"),
	("biliti", "ble"),
	("logi", "log"),
];

const STEP3_RULES: &[(&str, &str)] = &[
	("icate", "ic"),
	("ative", ""),
	("alize", "al"),
	("iciti", "ic"),
	("ical", "ic"),
	("ful", ""),
	("ness", ""),
];

const STEP4_SUFFIXES: &[&str] = &[
	"al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
	"ism", "ate", "iti", "ous", "ive", "ize",
];

/// Stem a single lowercase word.
///
/// Words containing anything other than ASCII lowercase letters are returned
/// unchanged.
pub fn stem(word: &str) -> String {
	if word.len() <= 2 || !word.bytes().all(|b| b.is_ascii_lowercase()) {
		return word.to_string();
	}

	let mut w = word.as_bytes().to_vec();
	step1a(&mut w);
	step1b(&mut w);
	step1c(&mut w);
	step2(&mut w);
	step3(&mut w);
	step4(&mut w);
	step5a(&mut w);
	step5b(&mut w);

	w.into_iter().map(char::from).collect()
}

// ---------------------------------------------------------------------------
// Letter classes and measure
// ---------------------------------------------------------------------------

fn is_consonant(w: &[u8], i: usize) -> bool {
	match w[i] {
		b'a' | b'e' | b'i' | b'o' | b'u' => false,
		b'y' => i == 0 || !is_consonant(w, i - 1),
		_ => true,
	}
}

/// Number of vowel-consonant sequences, the `m` in `[C](VC)^m[V]`.
fn measure(w: &[u8]) -> usize {
	let n = w.len();
	let mut i = 0;
	while i < n && is_consonant(w, i) {
		i += 1;
	}

	let mut m = 0;
	loop {
		while i < n && !is_consonant(w, i) {
			i += 1;
		}
		if i >= n {
			break;
		}
		while i < n && is_consonant(w, i) {
			i += 1;
		}
		m += 1;
		if i >= n {
			break;
		}
	}
	m
}

fn contains_vowel(w: &[u8]) -> bool {
	(0..w.len()).any(|i| !is_consonant(w, i))
}

fn ends_with_double_consonant(w: &[u8]) -> bool {
	let n = w.len();
	n >= 2 && w[n - 1] == w[n - 2] && is_consonant(w, n - 1)
}

/// consonant-vowel-consonant ending where the last consonant is not w, x or y.
fn ends_cvc(w: &[u8]) -> bool {
	let n = w.len();
	n >= 3
		&& is_consonant(w, n - 3)
		&& !is_consonant(w, n - 2)
		&& is_consonant(w, n - 1)
		&& !matches!(w[n - 1], b'w' | b'x' | b'y')
}

fn replace_suffix(w: &mut Vec<u8>, suffix_len: usize, replacement: &str) {
	w.truncate(w.len() - suffix_len);
	w.extend_from_slice(replacement.as_bytes());
}

/// Apply the first rule whose suffix matches, provided the remaining stem
/// has a measure above `min_measure`. Only the first matching suffix is
/// considered.
fn apply_first_rule(w: &mut Vec<u8>, rules: &[(&str, &str)], min_measure: usize) {
	for (suffix, replacement) in rules {
		if w.ends_with(suffix.as_bytes()) {
			let stem_len = w.len() - suffix.len();
			if measure(&w[..stem_len]) > min_measure {
				replace_suffix(w, suffix.len(), replacement);
			}
			return;
		}
	}
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

fn step1a(w: &mut Vec<u8>) {
	if w.ends_with(b"sses") {
		replace_suffix(w, 4, "ss");
	} else if w.ends_with(b"ies") {
		replace_suffix(w, 3, "i");
	} else if w.ends_with(b"ss") {
		// unchanged
	} else if w.ends_with(b"s") {
		w.pop();
	}
}

fn step1b(w: &mut Vec<u8>) {
	let n = w.len();
	if w.ends_with(b"eed") {
		if measure(&w[..n - 3]) > 0 {
			w.pop();
		}
		return;
	}

	let stripped = if w.ends_with(b"ed") && contains_vowel(&w[..n - 2]) {
		2
	} else if w.ends_with(b"ing") && contains_vowel(&w[..n - 3]) {
		3
	} else {
		return;
	};
	w.truncate(n - stripped);

	if w.ends_with(b"at") || w.ends_with(b"bl") || w.ends_with(b"iz") {
		w.push(b'e');
	} else if ends_with_double_consonant(w) && !matches!(w[w.len() - 1], b'l' | b's' | b'z') {
		w.pop();
	} else if measure(w) == 1 && ends_cvc(w) {
		w.push(b'e');
	}
}

fn step1c(w: &mut Vec<u8>) {
	let n = w.len();
	if n > 2 && w[n - 1] == b'y' && is_consonant(w, n - 2) {
		w[n - 1] = b'i';
	}
}

fn step2(w: &mut Vec<u8>) {
	apply_first_rule(w, STEP2_RULES, 0);
}

fn step3(w: &mut Vec<u8>) {
	apply_first_rule(w, STEP3_RULES, 0);
}

fn step4(w: &mut Vec<u8>) {
	for suffix in STEP4_SUFFIXES {
		if !w.ends_with(suffix.as_bytes()) {
			continue;
		}
		let stem_len = w.len() - suffix.len();
		if *suffix == "ion" && !(stem_len > 0 && matches!(w[stem_len - 1], b's' | b't')) {
			continue;
		}
		if measure(&w[..stem_len]) > 1 {
			w.truncate(stem_len);
		}
		return;
	}
}

fn step5a(w: &mut Vec<u8>) {
	if !w.ends_with(b"e") {
		return;
	}
	let stem = &w[..w.len() - 1];
	let m = measure(stem);
	if m > 1 || (m == 1 && !ends_cvc(stem)) {
		w.pop();
	}
}

fn step5b(w: &mut Vec<u8>) {
	if w.ends_with(b"ll") && measure(w) > 1 {
		w.pop();
	}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
