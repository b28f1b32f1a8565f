// SPDX-License-Identifier: MIT OR Apache-2.0
//! Formula tokenizer.

/// Brackets that only serve as visual grouping in a formula
pub const GROUPING_MARKERS: [char; 4] = ['[', ']', '{', '}'];

/// Token that assigns the last node's result to the final token
pub const RESULT_ARROW: &str = "->";

/// Split a formula into tokens.
///
/// Grouping markers act as separators, tokens are split on single spaces and
/// blank tokens are dropped. Parentheses are kept since they delimit vector
/// literals.
pub fn tokenize(formula: &str) -> Vec<&str> {
    formula
        .split(|c: char| c == ' ' || GROUPING_MARKERS.contains(&c))
        .filter(|token| !token.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_formula() {
        assert_eq!(tokenize("4 5 *"), vec!["4", "5", "*"]);
    }

    #[test]
    fn test_grouping_markers_are_separators() {
        assert_eq!(tokenize("[4 5 +]{2 *}"), vec!["4", "5", "+", "2", "*"]);
        assert_eq!(tokenize("{ [ ] }"), Vec::<&str>::new());
    }

    #[test]
    fn test_blank_tokens_are_dropped() {
        assert_eq!(tokenize("  4   5  * "), vec!["4", "5", "*"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_vector_literal_tokens() {
        assert_eq!(tokenize("(1 2 3) normalize"), vec!["(1", "2", "3)", "normalize"]);
        assert_eq!(
            tokenize("( 1 2 3 ) length -> len"),
            vec!["(", "1", "2", "3", ")", "length", "->", "len"]
        );
    }
}
