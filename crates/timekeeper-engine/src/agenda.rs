//! Free-text agenda parsing.
//!
//! One agenda entry per non-blank line. A line ending in `(<N> min)` is timed
//! explicitly; every other line shares what is left of the target duration,
//! with a floor of [`MIN_UNTIMED_MINUTES`] per item.

use regex::Regex;
use std::sync::LazyLock;
use timekeeper_types::AgendaItem;

pub const FALLBACK_ITEM_TITLE: &str = "Meeting discussion";

/// Floor for lines without an explicit duration. Applied even when it pushes
/// the total past the target.
pub const MIN_UNTIMED_MINUTES: u32 = 5;

/// Longest explicit duration accepted for one item (a full day)
pub const MAX_ITEM_MINUTES: u32 = 24 * 60;

static TIMED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.+?)\s*\((\d+)\s*min\)\s*$").expect("timed agenda pattern is valid")
});

/// A line with its explicit minutes, if it had any
struct ParsedLine<'a> {
    title: &'a str,
    minutes: Option<u32>,
}

fn parse_line(line: &str) -> ParsedLine<'_> {
    if let Some(caps) = TIMED_LINE.captures(line) {
        let label = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let minutes = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());

        // "(0 min)" and anything past a day get the same treatment as an untimed line
        if let Some(minutes) = minutes.filter(|m| (1..=MAX_ITEM_MINUTES).contains(m)) {
            if !label.is_empty() {
                return ParsedLine {
                    title: label,
                    minutes: Some(minutes),
                };
            }
        }
    }

    ParsedLine {
        title: line,
        minutes: None,
    }
}

/// Turn agenda text into ordered items whose durations fill `total_minutes`.
///
/// Explicit durations are taken as written, never clamped. Remaining time is
/// split evenly (floored) across untimed lines, each getting at least
/// [`MIN_UNTIMED_MINUTES`]. Blank input yields a single
/// [`FALLBACK_ITEM_TITLE`] item lasting the whole target.
pub fn parse_agenda_items(text: &str, total_minutes: u32) -> Vec<AgendaItem> {
    let lines: Vec<ParsedLine<'_>> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect();

    if lines.is_empty() {
        return vec![AgendaItem::new(FALLBACK_ITEM_TITLE, total_minutes)];
    }

    let allocated = lines
        .iter()
        .filter_map(|line| line.minutes)
        .fold(0u32, u32::saturating_add);
    let untimed = lines.iter().filter(|line| line.minutes.is_none()).count() as u32;

    let per_untimed = if untimed > 0 {
        let remaining = total_minutes.saturating_sub(allocated);
        (remaining / untimed).max(MIN_UNTIMED_MINUTES)
    } else {
        0
    };

    lines
        .into_iter()
        .map(|line| AgendaItem::new(line.title, line.minutes.unwrap_or(per_untimed)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use timekeeper_types::agenda::total_minutes;

    fn durations(items: &[AgendaItem]) -> Vec<u32> {
        items.iter().map(|item| item.duration).collect()
    }

    #[test]
    fn test_mixed_timed_and_untimed() {
        let items = parse_agenda_items("Welcome (5 min)\nDiscussion", 30);

        assert_eq!(
            items,
            vec![AgendaItem::new("Welcome", 5), AgendaItem::new("Discussion", 25)]
        );
    }

    #[test]
    fn test_all_untimed_split_evenly() {
        let items = parse_agenda_items("A\nB\nC", 30);
        assert_eq!(durations(&items), vec![10, 10, 10]);

        // floor(31 / 3) = 10, the extra minute is dropped
        let items = parse_agenda_items("A\nB\nC", 31);
        assert_eq!(durations(&items), vec![10, 10, 10]);
    }

    #[test]
    fn test_all_timed_keeps_values_and_order() {
        let items = parse_agenda_items("Intro (3 min)\nDemo (20 MIN)\nQ&A (10 min)  ", 15);

        assert_eq!(
            items,
            vec![
                AgendaItem::new("Intro", 3),
                AgendaItem::new("Demo", 20),
                AgendaItem::new("Q&A", 10),
            ]
        );
        // Explicit durations may exceed the target
        assert_eq!(total_minutes(&items), 33);
    }

    #[test]
    fn test_untimed_floor_exceeds_target() {
        let items = parse_agenda_items("Review (30 min)\nWrap-up", 30);

        assert_eq!(durations(&items), vec![30, 5]);
        assert_eq!(total_minutes(&items), 35);
    }

    #[test]
    fn test_floor_applies_when_share_is_small() {
        let items = parse_agenda_items("A\nB\nC\nD", 12);
        assert_eq!(durations(&items), vec![5, 5, 5, 5]);
    }

    #[test]
    fn test_blank_input_falls_back() {
        for text in ["", "   ", "\n\n  \n"] {
            let items = parse_agenda_items(text, 45);
            assert_eq!(items, vec![AgendaItem::new(FALLBACK_ITEM_TITLE, 45)]);
        }
    }

    #[test]
    fn test_blank_lines_are_skipped_and_titles_trimmed() {
        let items = parse_agenda_items("\n  Kickoff  \n\n\tRoadmap (15 min)\n", 30);

        assert_eq!(
            items,
            vec![AgendaItem::new("Kickoff", 15), AgendaItem::new("Roadmap", 15)]
        );
    }

    #[test]
    fn test_lines_that_only_look_timed() {
        let items = parse_agenda_items("Budget (5 minutes)\n(10 min)\nZero (0 min)", 30);

        let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["Budget (5 minutes)", "(10 min)", "Zero (0 min)"]);
        assert_eq!(durations(&items), vec![10, 10, 10]);
    }

    #[test]
    fn test_oversized_durations_are_untimed() {
        let items = parse_agenda_items("Keynote (4000000000 min)\nPanel (4000000000 min)", 30);

        assert_eq!(items[0].title, "Keynote (4000000000 min)");
        assert_eq!(durations(&items), vec![15, 15]);

        let items = parse_agenda_items("Offsite (1440 min)\nTravel (1441 min)", 30);
        assert_eq!(
            items,
            vec![
                AgendaItem::new("Offsite", 1440),
                AgendaItem::new("Travel (1441 min)", 5),
            ]
        );
    }
}
