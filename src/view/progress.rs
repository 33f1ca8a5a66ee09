//! Now-playing bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{ContentState, ContentView, NowPlaying, UiState, UserSettings};
use super::utils::format_duration;

pub fn render_now_playing(
    frame: &mut Frame,
    area: Rect,
    now_playing: &NowPlaying,
    ui_state: &UiState,
    content_state: &ContentState,
    settings: &UserSettings,
) {
    let position_ms = now_playing.position_ms();
    let duration_ms = now_playing.duration_ms();

    let status_text = match &now_playing.track {
        None => " No track playing".to_string(),
        Some(track) => {
            let icon = if now_playing.is_playing { " ▶" } else { "⏸ " };
            let autoplay = if now_playing.from_autoplay { " [autoplay]" } else { "" };
            format!(
                "{} {} | {} ({}) [{}]{}",
                icon,
                track.title,
                track.artist_name,
                track.album_label(),
                track.source().label(),
                autoplay
            )
        }
    };

    // Current lyric line for the playing track, when its lyrics are loaded
    let lyric_line = match (&content_state.view, &now_playing.track) {
        (ContentView::Lyrics { lyrics, .. }, Some(track)) if settings.show_lyrics && lyrics.title == track.title => {
            lyrics
                .line_at(position_ms)
                .and_then(|i| lyrics.lines.get(i))
                .map(|line| format!(" ♪ {} ", line.text))
        }
        _ => None,
    };

    let footer = lyric_line.or_else(|| ui_state.status_message.as_ref().map(|s| format!(" {} ", s)));
    let settings_info = format!(
        " Autoplay: {} | Explicit: {} ",
        if settings.autoplay { "On" } else { "Off" },
        if settings.hide_explicit { "Hidden" } else { "Shown" },
    );

    let progress_ratio = if duration_ms > 0 {
        (position_ms as f64 / duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ", status_text))
        .title_bottom(Line::from(settings_info).right_aligned());
    if let Some(footer) = footer {
        block = block.title_bottom(Line::from(footer).left_aligned());
    }

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress_ratio)
        .label(format!("{} / {}", format_duration(position_ms), format_duration(duration_ms)));

    frame.render_widget(gauge, area);
}
