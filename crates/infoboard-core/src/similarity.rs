//! Fuzzy name matching.
//!
//! Different calendars describe the same lecture with slightly different
//! names ("Algorithms Lecture" vs "Algorithms Lecture (room 204)"). [`similar`]
//! decides whether two names refer to the same thing by aligning their
//! tokens.

const SEPARATORS: &[char] = &['.', ',', ':', ';', ' ', '-', '/', '\\'];

/// Share of the longer token sequence that must find a close partner.
const TOKEN_PERCENT: usize = 33;

/// Share of the longer token's characters that must line up.
const CHAR_PERCENT: usize = 66;

/// Returns true if `a` and `b` look like names for the same event.
pub fn similar(a: &str, b: &str) -> bool {
    let a_tokens = tokenize(a);
    let b_tokens = tokenize(b);

    // token-free names ("", "--") have nothing to align
    if a_tokens.is_empty() || b_tokens.is_empty() {
        return a.to_lowercase() == b.to_lowercase();
    }

    let (short, long) = if a_tokens.len() <= b_tokens.len() {
        (a_tokens, b_tokens)
    } else {
        (b_tokens, a_tokens)
    };

    let threshold = (long.len() * TOKEN_PERCENT / 100).max(1);
    let mut cursor = 0;
    let mut matched = 0;

    for token in &short {
        if let Some(offset) = long[cursor..].iter().position(|other| close(token, other)) {
            matched += 1;
            cursor += offset + 1;
            if matched >= threshold {
                return true;
            }
        }
    }

    false
}

fn tokenize(s: &str) -> Vec<Vec<char>> {
    s.split(SEPARATORS)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase().chars().collect())
        .collect()
}

/// Slides the shorter token across the longer one and checks whether any
/// alignment reaches the required number of equal characters.
fn close(a: &[char], b: &[char]) -> bool {
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let needed = (longer.len() * CHAR_PERCENT).div_ceil(100);

    if shorter.len() < needed {
        return false;
    }

    (0..=longer.len() - shorter.len()).any(|offset| {
        shorter
            .iter()
            .zip(&longer[offset..])
            .filter(|(x, y)| x == y)
            .count()
            >= needed
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn suffix_in_room_name() {
        assert!(similar(
            "Algorithms Lecture",
            "Algorithms Lecture (room 204)"
        ));
        assert!(similar(
            "Algorithms Lecture (room 204)",
            "Algorithms Lecture"
        ));
    }

    #[test]
    fn unrelated_names() {
        assert!(!similar("Algorithms", "Databases"));
        assert!(!similar("Weekly sync", "Lunch"));
    }

    #[test]
    fn case_and_separators_ignored() {
        assert!(similar("DATA-STRUCTURES", "data structures"));
        assert!(similar("Signals/Systems", "signals, systems"));
    }

    #[test]
    fn tolerates_typos_and_course_codes() {
        // 7 of 9 characters line up
        assert!(similar("Databases", "Datadases"));
        // one token out of three is enough
        assert!(similar("TIE-20100 Algorithms", "Algorithms exercise group"));
    }

    #[test]
    fn empty_names() {
        assert!(similar("", ""));
        assert!(similar("--", "--"));
        assert!(!similar("", "Lecture"));
    }

    #[test]
    fn close_requires_two_thirds() {
        assert!(close(&chars("lecture"), &chars("lecture")));
        // "lect" against "lecture": needs 5 of 7
        assert!(!close(&chars("lect"), &chars("lecture")));
        // shifted alignment: "ecture" inside "lecture"
        assert!(close(&chars("ecture"), &chars("lecture")));
    }

    #[test]
    fn cursor_only_moves_forward() {
        // seven long tokens need two matches; "bb" sits behind the cursor
        // once "cc" has matched
        assert!(!similar("cc bb", "bb cc dd ee ff gg hh"));
        assert!(similar("bb cc", "bb cc dd ee ff gg hh"));
    }
}
