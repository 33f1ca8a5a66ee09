//! Layout rendering (top bar, sidebar, main area structure)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, ContentState, ContentView, UiState};

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, content_state: &ContentState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(20), // Search source
            Constraint::Length(14), // Voice indicator
        ])
        .split(area);

    let search_style = if ui_state.active_section == ActiveSection::Search {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() {
        "Type to search..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text)
        .style(search_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .padding(Padding::horizontal(1))
                .border_style(if ui_state.active_section == ActiveSection::Search {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(search, chunks[0]);

    let source_label = match &content_state.view {
        ContentView::SearchResults { source, .. } => source.label(),
        _ => "All sources",
    };
    let source = Paragraph::new(source_label)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Source "));
    frame.render_widget(source, chunks[1]);

    // Hidden entirely when no recognizer is available
    if ui_state.voice_supported {
        let (text, style) = if ui_state.voice_listening {
            ("● Listening", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        } else {
            ("○ Ready", Style::default().fg(Color::DarkGray))
        };
        let voice = Paragraph::new(text)
            .style(style)
            .block(Block::default().borders(Borders::ALL).title(" Voice "));
        frame.render_widget(voice, chunks[2]);
    }
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let playlist_items: Vec<ListItem> = ui_state
        .playlists
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == ui_state.playlist_selected
                && ui_state.active_section == ActiveSection::Playlists
            {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else if i == ui_state.playlist_selected {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("{} ({})", item.id, item.track_count)).style(style)
        })
        .collect();

    let playlists_border_style = if ui_state.active_section == ActiveSection::Playlists {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let playlists = List::new(playlist_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Stream Playlists ")
                .padding(Padding::horizontal(1))
                .border_style(playlists_border_style),
        )
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.playlist_selected));

    frame.render_stateful_widget(playlists, area, &mut list_state);
}
