//! Utility functions for rendering UI components

use chrono::{DateTime, Utc};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn format_duration(ms: u32) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// "just now", "5m ago", "3h ago", "2d ago", then the date
pub fn format_added_at(added_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(added_at);
    if elapsed.num_minutes() < 1 {
        "just now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        added_at.format("%Y-%m-%d").to_string()
    }
}

/// Calculate width needed for index column (digits + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    item_count.max(1).to_string().len() + 1
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// Calculate column widths for track listings
/// Returns (num_width, title_width, artist_width, tail_width)
pub fn calculate_track_column_widths(content_width: usize, item_count: usize, tail_width: usize) -> (usize, usize, usize, usize) {
    // Format: " {num}   {title}   {artist}   {tail}"
    let num_width = calculate_num_width(item_count);
    let fixed_width = 1 + num_width + 3 + 3 + 3 + tail_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 55) / 100;
    let artist_width = remaining_width.saturating_sub(title_width);

    (num_width, title_width, artist_width, tail_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(215_000), "3:35");
    }

    #[test]
    fn test_format_added_at() {
        let now = Utc::now();
        assert_eq!(format_added_at(now, now), "just now");
        assert_eq!(format_added_at(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_added_at(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_added_at(now - Duration::days(2), now), "2d ago");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("abc", 5), "abc  ");
        assert_eq!(truncate_string("abcdefgh", 6), "abc...");
    }

    #[test]
    fn test_num_width() {
        assert_eq!(calculate_num_width(0), 2);
        assert_eq!(calculate_num_width(9), 2);
        assert_eq!(calculate_num_width(10), 3);
    }
}
