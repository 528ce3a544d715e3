//! Porter suffix stripping, in the variant browser-side elasticlunr ships.
//!
//! Index files record stems produced by that variant, so query tokens must be
//! stemmed by exactly the same rules to find them. The rules run in five
//! steps:
//! 1. plurals, `-ed`/`-ing`, and a trailing `y` after a consonant
//! 2. double suffixes such as `-ational` → `-ate`
//! 3. `-icate` → `-ic`, `-ful` → "", etc.
//! 4. single suffixes such as `-ance` or `-ment` on long stems
//! 5. a final `-e` and `-ll`
//!
//! Vowel runs start with `aeiouy` and continue over `aeiou`; consonant runs
//! start with anything else (including `y`) and continue over non-`aeiouy`.
//! A leading `y` is always a consonant.

const STEP2: &[(&str, &str)] = &[
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

const STEP3: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

const STEP4: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ou", "ism", "ate",
    "iti", "ous", "ive", "ize",
];

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}

fn is_vowel_or_y(c: char) -> bool {
    is_vowel(c) || c == 'y'
}

/// Number of vowel-run/consonant-run pairs, the `m` in `[C](VC){m}[V]`.
fn measure(w: &[char]) -> usize {
    let n = w.len();
    let mut i = 0;
    if i < n && !is_vowel(w[i]) {
        i += 1;
        while i < n && !is_vowel_or_y(w[i]) {
            i += 1;
        }
    }
    let mut m = 0;
    while i < n {
        i += 1;
        while i < n && is_vowel(w[i]) {
            i += 1;
        }
        if i == n {
            break;
        }
        i += 1;
        while i < n && !is_vowel_or_y(w[i]) {
            i += 1;
        }
        m += 1;
    }
    m
}

fn has_vowel(w: &[char]) -> bool {
    w.iter().copied().any(is_vowel_or_y)
}

/// The whole word is one consonant run, a vowel, then a consonant other than `w`, `x` or `y`.
fn is_cvc(w: &[char]) -> bool {
    let n = w.len();
    n >= 3
        && !is_vowel(w[0])
        && w[1..n - 2].iter().all(|&c| !is_vowel_or_y(c))
        && is_vowel_or_y(w[n - 2])
        && !is_vowel_or_y(w[n - 1])
        && !matches!(w[n - 1], 'w' | 'x')
}

fn ends_with_double_consonant(w: &[char]) -> bool {
    let n = w.len();
    n >= 2 && w[n - 1] == w[n - 2] && !matches!(w[n - 1], 'a' | 'e' | 'i' | 'o' | 'u' | 'y' | 'l' | 's' | 'z')
}

fn ends_with(w: &[char], suffix: &str) -> bool {
    w.len() >= suffix.len() && w.iter().rev().zip(suffix.chars().rev()).all(|(a, b)| *a == b)
}

/// Longest suffix from `suffixes` that leaves a non-empty stem.
fn longest_suffix<'a>(w: &[char], suffixes: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    suffixes
        .filter(|s| s.len() < w.len() && ends_with(w, s))
        .max_by_key(|s| s.len())
}

fn step1a(w: &mut Vec<char>) {
    let n = w.len();
    if (n >= 5 && ends_with(w, "sses")) || (n >= 4 && ends_with(w, "ies")) {
        w.truncate(n - 2);
    } else if n >= 3 && w[n - 1] == 's' && w[n - 2] != 's' {
        w.pop();
    }
}

fn step1b(w: &mut Vec<char>) {
    let n = w.len();
    if n >= 4 && ends_with(w, "eed") {
        if measure(&w[..n - 3]) > 0 {
            w.pop();
        }
        return;
    }
    let cut = if n >= 3 && ends_with(w, "ed") {
        2
    } else if n >= 4 && ends_with(w, "ing") {
        3
    } else {
        return;
    };
    if !has_vowel(&w[..n - cut]) {
        return;
    }
    w.truncate(n - cut);
    if ends_with(w, "at") || ends_with(w, "bl") || ends_with(w, "iz") {
        w.push('e');
    } else if ends_with_double_consonant(w) {
        w.pop();
    } else if is_cvc(w) {
        w.push('e');
    }
}

fn step1c(w: &mut [char]) {
    let n = w.len();
    if n >= 3 && w[n - 1] == 'y' && !is_vowel(w[n - 2]) {
        w[n - 1] = 'i';
    }
}

fn replace_suffix(w: &mut Vec<char>, rules: &[(&str, &str)]) {
    let Some(suffix) = longest_suffix(w, rules.iter().map(|(s, _)| *s)) else {
        return;
    };
    let stem = w.len() - suffix.len();
    if measure(&w[..stem]) > 0 {
        let replacement = rules.iter().find(|(s, _)| *s == suffix).map_or("", |(_, r)| *r);
        w.truncate(stem);
        w.extend(replacement.chars());
    }
}

fn step4(w: &mut Vec<char>) {
    let n = w.len();
    if let Some(suffix) = longest_suffix(w, STEP4.iter().copied()) {
        let stem = n - suffix.len();
        if measure(&w[..stem]) > 1 {
            w.truncate(stem);
        }
    } else if n >= 5 && (ends_with(w, "sion") || ends_with(w, "tion")) && measure(&w[..n - 3]) > 1 {
        w.truncate(n - 3);
    }
}

fn step5(w: &mut Vec<char>) {
    let n = w.len();
    if n >= 2 && w[n - 1] == 'e' {
        let stem = &w[..n - 1];
        let m = measure(stem);
        if m > 1 || (m == 1 && !is_cvc(stem)) {
            w.pop();
        }
    }
    if ends_with(w, "ll") && measure(w) > 1 {
        w.pop();
    }
}

/// Stem one lowercase token. Tokens shorter than three characters come back unchanged.
pub fn porter_stem(token: &str) -> String {
    let mut w: Vec<char> = token.chars().collect();
    if w.len() < 3 {
        return token.to_string();
    }
    let leading_y = w[0] == 'y';
    if leading_y {
        w[0] = 'Y';
    }

    step1a(&mut w);
    step1b(&mut w);
    step1c(&mut w);
    replace_suffix(&mut w, STEP2);
    replace_suffix(&mut w, STEP3);
    step4(&mut w);
    step5(&mut w);

    if leading_y {
        w[0] = 'y';
    }
    w.into_iter().collect()
}
