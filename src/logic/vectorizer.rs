//! TF-IDF text vectorizer
//!
//! Builds one vocabulary from the whole description batch, then weights
//! each term by raw term frequency times smoothed inverse document
//! frequency (`ln((1+n)/(1+df)) + 1`) and L2-normalizes every row.
//! Fully deterministic: same input batch, same matrix.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use ndarray::Array2;

use crate::error::{AppError, AppResult};

/// Fixed English stop-word list applied before vocabulary construction
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an",
    "and", "any", "are", "as", "at", "be", "because", "been", "before", "being",
    "below", "between", "both", "but", "by", "can", "cannot", "could", "did",
    "do", "does", "doing", "down", "during", "each", "either", "else", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "however", "i",
    "if", "in", "into", "is", "it", "its", "itself", "just", "may", "me",
    "might", "more", "most", "must", "my", "myself", "no", "nor", "not", "now",
    "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "same", "shall", "she", "should", "so",
    "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "therefore", "these", "they", "this",
    "those", "through", "to", "too", "under", "until", "up", "upon", "us",
    "very", "via", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "within", "without",
    "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Dense TF-IDF matrix plus the vocabulary its columns follow
#[derive(Debug, Clone)]
pub struct TfidfMatrix {
    /// rows = descriptions, cols = vocabulary terms
    pub matrix: Array2<f64>,
    /// Sorted term list; index = column
    pub vocabulary: Vec<String>,
}

/// Vectorize a batch of descriptions into TF-IDF feature rows
pub fn fit_transform(descriptions: &[String]) -> AppResult<TfidfMatrix> {
    let token_lists: Vec<Vec<String>> = descriptions.iter().map(|d| tokenize(d)).collect();

    let non_empty = descriptions.iter().filter(|d| !d.trim().is_empty()).count();
    if non_empty < 2 {
        return Err(AppError::VectorizationError(format!(
            "need at least 2 non-empty descriptions, have {}",
            non_empty
        )));
    }

    // One shared vocabulary for the whole batch, sorted for a stable
    // column order
    let vocabulary: Vec<String> = token_lists
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    if vocabulary.is_empty() {
        return Err(AppError::VectorizationError(
            "vocabulary is empty after stop-word removal".to_string(),
        ));
    }

    let term_index: HashMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, term)| (term.as_str(), i))
        .collect();

    // Document frequency per term
    let mut doc_freq = vec![0usize; vocabulary.len()];
    for tokens in &token_lists {
        let distinct: BTreeSet<&String> = tokens.iter().collect();
        for term in distinct {
            doc_freq[term_index[term.as_str()]] += 1;
        }
    }

    let n_docs = descriptions.len() as f64;
    let idf: Vec<f64> = doc_freq
        .iter()
        .map(|&df| ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    let mut matrix = Array2::<f64>::zeros((descriptions.len(), vocabulary.len()));
    for (row, tokens) in token_lists.iter().enumerate() {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for token in tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        for (term, count) in counts {
            let col = term_index[term];
            matrix[[row, col]] = count as f64 * idf[col];
        }

        // L2-normalize the row; all-stop-word descriptions stay zero
        let norm = matrix.row(row).iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            matrix.row_mut(row).mapv_inplace(|v| v / norm);
        }
    }

    Ok(TfidfMatrix { matrix, vocabulary })
}

/// Lowercase alphanumeric tokens of length >= 2, stop words removed
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .filter(|t| !STOP_WORDS.contains(t))
        .map(|t| t.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tokenize_drops_stop_words() {
        let tokens = tokenize("The attacker is in the network");
        assert_eq!(tokens, vec!["attacker", "network"]);
    }

    #[test]
    fn test_tokenize_drops_single_chars() {
        let tokens = tokenize("a b xss");
        assert_eq!(tokens, vec!["xss"]);
    }

    #[test]
    fn test_vocabulary_shared_and_sorted() {
        let result = fit_transform(&batch(&["xss injection", "injection attack"])).unwrap();
        assert_eq!(result.vocabulary, vec!["attack", "injection", "xss"]);
        assert_eq!(result.matrix.dim(), (2, 3));
    }

    #[test]
    fn test_distinctive_term_gets_nonzero_dimension() {
        let result = fit_transform(&batch(&[
            "script injection attack",
            "credential theft attack",
        ]))
        .unwrap();
        let col = result.vocabulary.iter().position(|t| t == "script").unwrap();
        assert!(result.matrix[[0, col]] > 0.0);
        assert_eq!(result.matrix[[1, col]], 0.0);
    }

    #[test]
    fn test_rows_are_l2_normalized() {
        let result = fit_transform(&batch(&["xss script attack", "data leak"])).unwrap();
        for row in result.matrix.rows() {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_determinism() {
        let input = batch(&["sql injection flaw", "broken access control", "xss payload"]);
        let a = fit_transform(&input).unwrap();
        let b = fit_transform(&input).unwrap();
        assert_eq!(a.matrix, b.matrix);
        assert_eq!(a.vocabulary, b.vocabulary);
    }

    #[test]
    fn test_too_few_descriptions() {
        let err = fit_transform(&batch(&["only one"])).unwrap_err();
        assert!(matches!(err, AppError::VectorizationError(_)));

        let err = fit_transform(&batch(&["text", "   "])).unwrap_err();
        assert!(matches!(err, AppError::VectorizationError(_)));
    }

    #[test]
    fn test_empty_vocabulary() {
        // Only stop words and single chars survive nothing
        let err = fit_transform(&batch(&["the a of", "is it by"])).unwrap_err();
        assert!(matches!(err, AppError::VectorizationError(_)));
    }
}
