//! Result excerpts: the window of body words carrying the most search-term
//! weight, with matching words wrapped in `<em>`.

use crate::tokenizer::{is_stopword, stem, tokenize, trim};

const TERM_WEIGHT: u32 = 40;
const SENTENCE_START_WEIGHT: u32 = 8;
const WORD_WEIGHT: u32 = 2;

struct Word<'a> {
    text: &'a str,
    weight: u32,
    offset: usize, // byte offset into the body
}

/// Query words worth highlighting: trimmed, lowercased, stop words removed.
pub fn search_terms(query: &str) -> Vec<String> {
    tokenize(query)
        .iter()
        .map(|t| trim(t))
        .filter(|t| !t.is_empty() && !is_stopword(t))
        .map(str::to_string)
        .collect()
}

pub fn make_teaser(body: &str, terms: &[String], word_count: usize) -> String {
    let stemmed: Vec<String> = terms
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| stem(&t.to_lowercase()))
        .filter(|t| !t.is_empty())
        .collect();

    let mut words = Vec::new();
    let mut found = false;
    let mut offset = 0;
    for sentence in body.split(". ") {
        let mut weight = SENTENCE_START_WEIGHT;
        for text in sentence.split(' ') {
            if !text.is_empty() {
                let word_stem = stem(&text.to_lowercase());
                if stemmed.iter().any(|t| word_stem.starts_with(t.as_str())) {
                    weight = TERM_WEIGHT;
                    found = true;
                }
                words.push(Word { text, weight, offset });
                weight = WORD_WEIGHT;
            }
            offset += text.len() + 1;
        }
        offset += 1;
    }

    if words.is_empty() {
        return body.to_string();
    }
    let size = word_count.min(words.len());
    if size == 0 {
        return String::new();
    }

    let mut sums = Vec::with_capacity(words.len() - size + 1);
    let mut current: u32 = words[..size].iter().map(|w| w.weight).sum();
    sums.push(current);
    for i in 0..words.len() - size {
        current -= words[i].weight;
        current += words[i + size].weight;
        sums.push(current);
    }

    // last window among equal maxima
    let start = if found {
        let mut best = 0;
        let mut max = 0;
        for (i, &sum) in sums.iter().enumerate().rev() {
            if sum > max {
                max = sum;
                best = i;
            }
        }
        best
    } else {
        0
    };

    let mut teaser = String::new();
    let mut index = words[start].offset;
    for word in &words[start..start + size] {
        if index < word.offset {
            teaser.push_str(&body[index..word.offset]);
        }
        let end = word.offset + word.text.len();
        if word.weight == TERM_WEIGHT {
            teaser.push_str("<em>");
            teaser.push_str(&body[word.offset..end]);
            teaser.push_str("</em>");
        } else {
            teaser.push_str(&body[word.offset..end]);
        }
        index = end;
    }
    teaser
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlights_stemmed_matches() {
        let body = "Hooks are scripts. The install hook runs first.";
        let t = make_teaser(body, &["hooks".to_string()], 30);
        assert_eq!(t, "<em>Hooks</em> are scripts. The install <em>hook</em> runs first.");
    }

    #[test]
    fn picks_window_with_most_matches() {
        let body = "one two three four five six seven eight daemon nine";
        let t = make_teaser(body, &["daemon".to_string()], 3);
        assert_eq!(t, "eight <em>daemon</em> nine");
    }

    #[test]
    fn no_match_starts_at_beginning() {
        let body = "alpha beta gamma delta";
        assert_eq!(make_teaser(body, &["zeta".to_string()], 2), "alpha beta");
    }

    #[test]
    fn empty_body_is_returned_as_is() {
        assert_eq!(make_teaser("", &["x".to_string()], 30), "");
        assert_eq!(make_teaser("   ", &[], 30), "   ");
    }

    #[test]
    fn search_terms_drop_stopwords() {
        assert_eq!(search_terms("The Lucky daemon!"), vec!["lucky", "daemon"]);
    }
}
