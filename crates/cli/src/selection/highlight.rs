//! Search-match and emphasis colorization.
//!
//! Color codes are collected as insertion points first and applied to
//! the string in descending position order, so earlier insertions never
//! shift the offsets of later ones. Known limitation: lowercase folding
//! of non-ASCII text can change byte lengths, in which case the
//! insensitive scan falls back to exact matching.

use super::colors::Theme;
use super::types::EmphasisRange;

struct Insertion {
    pos: usize,
    code: &'static str,
    opens: bool,
}

/// True when the needle asks for case-sensitive matching: smart-case,
/// i.e. any uppercase character in the query.
#[must_use]
pub fn is_case_sensitive(needle: &str) -> bool {
    needle.chars().any(|c| c.is_ascii_uppercase())
}

/// Byte ranges of every smart-case occurrence of `needle` in `text`.
#[must_use]
pub fn find_matches(text: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    if is_case_sensitive(needle) {
        return text
            .match_indices(needle)
            .map(|(i, m)| (i, i + m.len()))
            .collect();
    }
    let folded = text.to_lowercase();
    let folded_needle = needle.to_lowercase();
    if folded.len() == text.len() {
        folded
            .match_indices(&folded_needle)
            .map(|(i, m)| (i, i + m.len()))
            .collect()
    } else {
        text.match_indices(needle)
            .map(|(i, m)| (i, i + m.len()))
            .collect()
    }
}

/// Applies search-match and emphasis colors to one line of text.
///
/// `selected` switches every "closing" code to the selection-background
/// variants so highlights stay visible inside a virtual-mode block.
#[must_use]
pub fn colorize(
    text: &str,
    emphasis: &[EmphasisRange],
    search: &str,
    selected: bool,
    theme: &Theme,
) -> String {
    let matches = find_matches(text, search);
    if matches.is_empty() && emphasis.is_empty() {
        return text.to_string();
    }

    let mut insertions: Vec<Insertion> = Vec::new();
    for e in emphasis {
        insertions.push(Insertion {
            pos: e.start,
            code: theme.emphasis(e.tag, selected),
            opens: true,
        });
        insertions.push(Insertion {
            pos: e.end,
            code: theme.base(selected),
            opens: false,
        });
    }
    for &(start, end) in &matches {
        // a match ending inside (or touching) an emphasis range closes
        // back into that range's color instead of the base terminator
        let closing = emphasis
            .iter()
            .find(|e| e.start <= end && end <= e.end)
            .map_or_else(|| theme.base(selected), |e| theme.emphasis(e.tag, selected));
        insertions.push(Insertion {
            pos: start,
            code: theme.matched(selected),
            opens: true,
        });
        insertions.push(Insertion {
            pos: end,
            code: closing,
            opens: false,
        });
    }

    // descending position; at equal positions opens are applied first so
    // the final string reads close-then-open
    insertions.sort_by(|a, b| b.pos.cmp(&a.pos).then_with(|| b.opens.cmp(&a.opens)));

    let mut out = text.to_string();
    for ins in insertions {
        if ins.pos <= text.len() && text.is_char_boundary(ins.pos) {
            out.insert_str(ins.pos, ins.code);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::colors::ColorTag;

    const RED: &str = "\x1b[1;31m";
    const WHITE: &str = "\x1b[1;37m";
    const RESET: &str = "\x1b[0m";
    const SELECTION_BG: &str = "\x1b[0;44m";
    const RED_ON_SELECTION: &str = "\x1b[31;44m\x1b[1m";

    fn theme() -> Theme {
        Theme::default()
    }

    #[test]
    fn test_smart_case() {
        assert!(!is_case_sensitive("apple"));
        assert!(is_case_sensitive("Apple"));
        assert!(is_case_sensitive("appLe"));
    }

    #[test]
    fn test_find_matches_insensitive() {
        assert_eq!(find_matches("Apple apple", "apple"), vec![(0, 5), (6, 11)]);
    }

    #[test]
    fn test_find_matches_sensitive() {
        assert_eq!(find_matches("Apple apple", "Apple"), vec![(0, 5)]);
        assert!(find_matches("apple", "Apple").is_empty());
    }

    #[test]
    fn test_find_matches_empty_needle() {
        assert!(find_matches("anything", "").is_empty());
    }

    #[test]
    fn test_colorize_single_match() {
        let out = colorize("say hello", &[], "hell", false, &theme());
        assert_eq!(out, format!("say {RED}hell{RESET}o"));
    }

    #[test]
    fn test_colorize_two_matches_keep_offsets() {
        let out = colorize("aXbXc", &[], "x", false, &theme());
        assert_eq!(out, format!("a{RED}X{RESET}b{RED}X{RESET}c"));
    }

    #[test]
    fn test_colorize_selected_uses_background_variants() {
        let out = colorize("say hello", &[], "hell", true, &theme());
        assert_eq!(out, format!("say {RED_ON_SELECTION}hell{SELECTION_BG}o"));
    }

    #[test]
    fn test_colorize_emphasis_only() {
        let emphasis = [EmphasisRange {
            start: 0,
            end: 3,
            tag: ColorTag::White,
        }];
        let out = colorize("abc def", &emphasis, "", false, &theme());
        assert_eq!(out, format!("{WHITE}abc{RESET} def"));
    }

    #[test]
    fn test_colorize_match_inside_emphasis_closes_into_it() {
        let emphasis = [EmphasisRange {
            start: 0,
            end: 7,
            tag: ColorTag::White,
        }];
        let out = colorize("abcdefg", &emphasis, "cde", false, &theme());
        // the match terminator restores the surrounding emphasis color
        assert_eq!(out, format!("{WHITE}ab{RED}cde{WHITE}fg{RESET}"));
    }

    #[test]
    fn test_colorize_match_after_emphasis_closes_to_base() {
        let emphasis = [EmphasisRange {
            start: 0,
            end: 2,
            tag: ColorTag::White,
        }];
        let out = colorize("ab cd", &emphasis, "cd", false, &theme());
        assert_eq!(out, format!("{WHITE}ab{RESET} {RED}cd{RESET}"));
    }

    #[test]
    fn test_colorize_non_ascii_falls_back_to_exact() {
        // 'İ' lowercases to a longer byte sequence; the insensitive
        // path must not produce skewed offsets
        let out = colorize("İ abc", &[], "abc", false, &theme());
        assert_eq!(out, format!("İ {RED}abc{RESET}"));
    }
}
