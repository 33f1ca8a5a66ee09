//! Main content area rendering (search results, stream playlists, lyrics, profile)

use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph, Wrap},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{
    ActiveSection, ContentState, ContentView, NowPlaying, SearchResults, SearchSource, StreamEntry,
    Track, UiState, UserSettings,
};
use crate::services::{format_count, Lyrics, ProfileStats};
use super::utils::{
    calculate_track_column_widths, format_added_at, format_duration, render_scrollable_list,
    truncate_string,
};

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    now_playing: &NowPlaying,
    playing_id: Option<&str>,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Content ")
                    .border_style(border_style),
            );
        frame.render_widget(loading, area);
        return;
    }

    match &content_state.view {
        ContentView::Empty => {
            let content = Paragraph::new("Type in search and press Enter to find music\n\nUse Tab to navigate between sections\nUse ↑/↓ to select items\nPress A to keep a track in a playlist, H for help")
                .style(Style::default().fg(Color::DarkGray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .padding(Padding::horizontal(1))
                        .border_style(border_style),
                );
            frame.render_widget(content, area);
        }
        ContentView::SearchResults { query, results, source, indices } => {
            render_search_results(frame, area, query, results, *source, indices[source.index()], is_focused, playing_id);
        }
        ContentView::PlaylistStreams { playlist_id, entries, selected_index } => {
            render_playlist_streams(frame, area, playlist_id, entries, *selected_index, is_focused, playing_id);
        }
        ContentView::Lyrics { lyrics, scroll } => {
            let active_line = now_playing
                .track
                .as_ref()
                .filter(|track| track.title == lyrics.title)
                .and_then(|_| lyrics.line_at(now_playing.position_ms()));
            render_lyrics(frame, area, lyrics, *scroll, active_line, border_style);
        }
        ContentView::NoLyrics { title, artist } => {
            let content = Paragraph::new(format!("No lyrics found for \"{}\" by {}", title, artist))
                .style(Style::default().fg(Color::DarkGray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(" Lyrics ")
                        .padding(Padding::horizontal(1))
                        .border_style(border_style),
                );
            frame.render_widget(content, area);
        }
        ContentView::Profile { user_id, stats, settings } => {
            render_profile(frame, area, user_id, stats, settings, border_style);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    query: &str,
    results: &SearchResults,
    source: SearchSource,
    selected_index: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    // Split into tabs area and content area
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Source tabs
            Constraint::Min(0),    // Results list
        ])
        .split(area);

    let tabs_content: Vec<Span> = SearchSource::ALL
        .iter()
        .flat_map(|tab| {
            let failed = results.failed.iter().any(|(s, _)| s == tab);
            let title = if failed {
                format!(" {} (failed) ", tab.label())
            } else {
                format!(" {} ({}) ", tab.label(), results.tracks(*tab).len())
            };
            let style = if *tab == source {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else if failed {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            vec![Span::styled(title, style), Span::raw("  ")]
        })
        .collect();

    let tabs = Paragraph::new(Line::from(tabs_content))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Results for \"{}\" (←/→ to switch) ", query))
                .border_style(border_style),
        );
    frame.render_widget(tabs, chunks[0]);

    let tracks = results.tracks(source);
    if tracks.is_empty() {
        let message = match results.failed.iter().find(|(s, _)| *s == source) {
            Some((_, reason)) => format!("  {} search failed: {}", source.label(), reason),
            None => format!("  No {} results", source.label()),
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, chunks[1]);
        return;
    }

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let rows = tracks.iter().map(|track| (track, format_duration(track.duration)));
    let items = render_track_rows(rows, tracks.len(), "Duration", selected_index, is_focused, playing_id, content_width);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, chunks[1], items, selected_index + 1, list_block); // +1 for header row
}

fn render_playlist_streams(
    frame: &mut Frame,
    area: Rect,
    playlist_id: &str,
    entries: &[StreamEntry],
    selected_index: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let border_style = if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let title = format!(" {} · {} stream tracks (Del to remove) ", playlist_id, entries.len());

    if entries.is_empty() {
        let empty = Paragraph::new("  No stream tracks yet. Search and press A to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let now = Utc::now();
    let content_width = area.width.saturating_sub(4) as usize;
    let rows = entries
        .iter()
        .map(|entry| (&entry.track, format_added_at(entry.added_at, now)));
    let items = render_track_rows(rows, entries.len(), "Added", selected_index, is_focused, playing_id, content_width);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, selected_index + 1, list_block);
}

/// Header row plus one row per track; `tail` is the last column (duration, added time)
fn render_track_rows<'a>(
    rows: impl Iterator<Item = (&'a Track, String)>,
    count: usize,
    tail_header: &str,
    selected_index: usize,
    is_focused: bool,
    playing_id: Option<&str>,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let (num_width, title_width, artist_width, tail_width) =
        calculate_track_column_widths(content_width, count, 10);

    let mut items = vec![
        ListItem::new(format!(
            " {:<num_width$}   {:<title_width$}   {:<artist_width$}   {:<tail_width$}",
            "#", "Title", "Artist", tail_header,
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
    ];

    items.extend(rows.enumerate().map(|(i, (track, tail))| {
        let is_playing = playing_id == Some(track.id.as_str());
        let style = if i == selected_index && is_focused {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if is_playing {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else if i == selected_index {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let playing_indicator = if is_playing { "▶" } else { " " };
        let explicit = if track.explicit { " 🅴" } else { "" };
        let title_str = truncate_string(&format!("{}{}", track.title, explicit), title_width);
        let artist_str = truncate_string(&track.artist_name, artist_width);

        ListItem::new(format!(
            "{}{:<num_width$}   {}   {}   {}",
            playing_indicator,
            i + 1,
            title_str,
            artist_str,
            tail,
        ))
        .style(style)
    }));

    items
}

fn render_lyrics(
    frame: &mut Frame,
    area: Rect,
    lyrics: &Lyrics,
    scroll: usize,
    active_line: Option<usize>,
    border_style: Style,
) {
    let lines: Vec<Line> = lyrics
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let style = if Some(i) == active_line {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if i == scroll {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(line.text.clone(), style))
        })
        .collect();

    // Follow the active line while synced lyrics play
    let visible = area.height.saturating_sub(2) as usize;
    let anchor = active_line.unwrap_or(scroll);
    let offset = anchor.saturating_sub(visible / 2);

    let mut title = format!(" {} - {} ", lyrics.title, lyrics.artist);
    if let Some(source) = &lyrics.source {
        title.push_str(&format!("· {} ", source));
    }

    let paragraph = Paragraph::new(lines)
        .scroll((offset.min(u16::MAX as usize) as u16, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .padding(Padding::horizontal(1))
                .border_style(border_style),
        );
    frame.render_widget(paragraph, area);
}

fn render_profile(
    frame: &mut Frame,
    area: Rect,
    user_id: &str,
    stats: &ProfileStats,
    settings: &UserSettings,
    border_style: Style,
) {
    let on_off = |flag: bool| if flag { "On" } else { "Off" };
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let row = |name: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:>18}  ", name), label),
            Span::raw(value),
        ])
    };

    let lines = vec![
        row("Followers", format_count(stats.followers)),
        row("Following", format_count(stats.following)),
        row("Playlists", format_count(stats.playlists)),
        Line::from(""),
        Line::from(Span::styled("Settings", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
        row("Autoplay (O)", on_off(settings.autoplay).to_string()),
        row("Hide explicit (X)", on_off(settings.hide_explicit).to_string()),
        row("Continuous voice (C)", on_off(settings.continuous_voice).to_string()),
        row("Show lyrics (L)", on_off(settings.show_lyrics).to_string()),
        row("Default playlist", settings.default_playlist.clone()),
    ];

    let profile = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Profile · {} ", user_id))
            .padding(Padding::horizontal(1))
            .border_style(border_style),
    );
    frame.render_widget(profile, area);
}
