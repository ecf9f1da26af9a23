// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;

/// Case-insensitive literal substring matcher.
///
/// Characters are folded one at a time so match ranges always map back onto
/// the original text. Pattern-special characters have no meaning here: `a.c`
/// only matches the three characters `a`, `.`, `c`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchPattern {
    raw: String,
    folded: Vec<char>,
}

impl SearchPattern {
    pub fn new(term: &str) -> Self {
        Self {
            raw: term.to_owned(),
            folded: term.chars().map(fold_char).collect(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn is_match(&self, text: &str) -> bool {
        if self.is_empty() {
            return true;
        }
        let chars = text.chars().map(fold_char).collect::<Vec<_>>();
        chars
            .windows(self.folded.len())
            .any(|window| window == self.folded.as_slice())
    }

    /// Byte ranges of every non-overlapping occurrence, left to right.
    pub fn find_ranges(&self, text: &str) -> Vec<Range<usize>> {
        if self.is_empty() {
            return Vec::new();
        }

        let chars = text.char_indices().collect::<Vec<_>>();
        let needle = self.folded.len();
        let mut ranges = Vec::new();
        let mut index = 0;
        while index + needle <= chars.len() {
            let hit = chars[index..index + needle]
                .iter()
                .zip(&self.folded)
                .all(|((_, ch), expected)| fold_char(*ch) == *expected);
            if hit {
                let start = chars[index].0;
                let end = chars
                    .get(index + needle)
                    .map_or(text.len(), |(offset, _)| *offset);
                ranges.push(start..end);
                index += needle;
            } else {
                index += 1;
            }
        }
        ranges
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }

    pub fn marked(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: true,
        }
    }
}

/// Splits `text` into plain and highlighted segments around each match.
pub fn highlight_segments(text: &str, pattern: &SearchPattern) -> Vec<Segment> {
    let ranges = pattern.find_ranges(text);
    if ranges.is_empty() {
        return vec![Segment::plain(text)];
    }

    let mut segments = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;
    for range in ranges {
        if range.start > cursor {
            segments.push(Segment::plain(&text[cursor..range.start]));
        }
        segments.push(Segment::marked(&text[range.clone()]));
        cursor = range.end;
    }
    if cursor < text.len() {
        segments.push(Segment::plain(&text[cursor..]));
    }
    segments
}

fn fold_char(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(single), None) => single,
        _ => ch,
    }
}

#[cfg(test)]
mod tests {
    use super::{SearchPattern, Segment, highlight_segments};

    #[test]
    fn matches_case_insensitively() {
        let pattern = SearchPattern::new("bEaT");
        assert!(pattern.is_match("The Beatles"));
        assert!(!pattern.is_match("The Rolling Stones"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let pattern = SearchPattern::new("");
        assert!(pattern.is_empty());
        assert!(pattern.is_match("anything"));
        assert!(pattern.find_ranges("anything").is_empty());
    }

    #[test]
    fn special_characters_are_literal() {
        let pattern = SearchPattern::new("a.c");
        assert!(pattern.is_match("xa.cx"));
        assert!(!pattern.is_match("abc"));

        let paren = SearchPattern::new("(live");
        assert!(paren.is_match("Song (Live) - Band"));
    }

    #[test]
    fn find_ranges_are_non_overlapping_byte_ranges() {
        let pattern = SearchPattern::new("aa");
        assert_eq!(pattern.find_ranges("aaaa"), vec![0..2, 2..4]);

        let accent = SearchPattern::new("é");
        assert_eq!(accent.find_ranges("CAFÉ café"), vec![3..5, 9..11]);
    }

    #[test]
    fn highlight_splits_around_every_match() {
        let pattern = SearchPattern::new("la");
        let segments = highlight_segments("La La Land", &pattern);
        assert_eq!(
            segments,
            vec![
                Segment::marked("La"),
                Segment::plain(" "),
                Segment::marked("La"),
                Segment::plain(" "),
                Segment::marked("La"),
                Segment::plain("nd"),
            ]
        );
    }

    #[test]
    fn highlight_without_match_returns_text_unchanged() {
        let pattern = SearchPattern::new("zz");
        assert_eq!(
            highlight_segments("Abbey Road", &pattern),
            vec![Segment::plain("Abbey Road")]
        );
    }
}
