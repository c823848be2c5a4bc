//! Free-text helpers: tokenizing survey answers and counting words.

use crate::types::WordCount;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// English stopwords (the common NLP list).
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
        "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
        "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
        "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
        "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
        "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
        "with", "about", "against", "between", "into", "through", "during", "before", "after",
        "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
        "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
        "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
        "will", "just", "don", "don't", "should", "should've", "now", "d", "ll", "m", "o", "re",
        "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn",
        "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma",
        "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
        "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
        "wouldn't",
    ]
    .into_iter()
    .collect()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lowercase and split on whitespace and punctuation, apostrophes included:
/// "staff's" gives "staff" and "s", "don't" gives "don" and "t".
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Count non-stopword alphabetic tokens across `texts`, most frequent first.
/// Ties keep the order in which the words first appeared.
pub fn word_frequency<'a, I>(texts: I) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        for token in tokenize(text) {
            if is_stopword(&token) || !token.chars().all(char::is_alphabetic) {
                continue;
            }
            let count = counts.entry(token.clone()).or_insert(0);
            if *count == 0 {
                order.push(token);
            }
            *count += 1;
        }
    }
    let mut words: Vec<WordCount> = order
        .into_iter()
        .map(|word| {
            let count = counts[&word];
            WordCount { word, count }
        })
        .collect();
    // `sort_by` is stable, so first-seen order survives among equal counts.
    words.sort_by(|a, b| b.count.cmp(&a.count));
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokenize_splits_on_punctuation() {
        assert_eq!(
            tokenize("Longer hours, please! (Weekends?)"),
            vec!["longer", "hours", "please", "weekends"]
        );
        assert_eq!(tokenize("Don't rush"), vec!["don", "t", "rush"]);
        assert_eq!(tokenize("Stylist’s chair"), vec!["stylist", "s", "chair"]);
    }

    #[test]
    fn possessives_keep_their_stem() {
        let freq = word_frequency(["The staff's attitude", "Stylist’s music too loud", "staff"]);
        let words: Vec<(&str, usize)> = freq.iter().map(|w| (w.word.as_str(), w.count)).collect();
        assert_eq!(
            words,
            vec![
                ("staff", 2),
                ("attitude", 1),
                ("stylist", 1),
                ("music", 1),
                ("loud", 1),
            ]
        );
    }

    #[test]
    fn contraction_fragments_are_stopwords() {
        let freq = word_frequency(["Don't rush, we're fine, it won't matter"]);
        let words: Vec<&str> = freq.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["rush", "fine", "matter"]);
    }

    #[test]
    fn word_frequency_drops_stopwords_and_non_alpha() {
        let freq = word_frequency([
            "The wait was too long.",
            "Wait times, and parking 24/7",
            "More parking please, don't wait",
        ]);
        let words: Vec<(&str, usize)> = freq.iter().map(|w| (w.word.as_str(), w.count)).collect();
        assert_eq!(
            words,
            vec![
                ("wait", 3),
                ("parking", 2),
                ("long", 1),
                ("times", 1),
                ("please", 1),
            ]
        );
    }

    #[test]
    fn word_frequency_never_yields_stopwords() {
        let freq = word_frequency(["I think that it is what it is", "so so"]);
        assert!(freq.iter().all(|w| !is_stopword(&w.word)));
        assert_eq!(freq.len(), 1);
        assert_eq!(freq[0].word, "think");
    }

    #[test]
    fn empty_input_yields_empty_table() {
        assert!(word_frequency(Vec::<&str>::new()).is_empty());
    }
}
