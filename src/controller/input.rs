//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::ActiveSection;
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_error().await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        let ui_state = model.get_ui_state().await;

        // Handle search input when in search section
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        model.cycle_section_backward().await;
                    } else {
                        model.cycle_section_forward().await;
                    }
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = ui_state.search_query.trim().to_string();
                    drop(model);
                    if !query.is_empty() {
                        self.perform_search(&query).await;
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.update_search_query(String::new()).await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Ctrl+Q still quits and Ctrl+V starts voice search while typing
                    if key.modifiers.contains(KeyModifiers::CONTROL) {
                        match c {
                            'q' | 'Q' => model.set_should_quit(true).await,
                            'v' | 'V' => {
                                drop(model);
                                self.start_voice_search().await;
                            }
                            _ => {}
                        }
                        return Ok(());
                    }
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle MainContent section navigation
        if ui_state.active_section == ActiveSection::MainContent {
            match key.code {
                KeyCode::Up => {
                    model.content_move_up().await;
                    return Ok(());
                }
                KeyCode::Down => {
                    model.content_move_down().await;
                    return Ok(());
                }
                KeyCode::Left => {
                    model.navigate_search_source(false).await;
                    return Ok(());
                }
                KeyCode::Right => {
                    model.navigate_search_source(true).await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    if let Some(item) = selected {
                        self.handle_selected_item(item).await;
                    }
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    model.navigate_back().await;
                    return Ok(());
                }
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    drop(model);
                    self.add_selected_to_playlist().await;
                    return Ok(());
                }
                KeyCode::Delete => {
                    drop(model);
                    self.remove_selected_from_playlist().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_section_backward().await;
                } else {
                    model.cycle_section_forward().await;
                }
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
            }
            KeyCode::Enter => {
                if ui_state.active_section == ActiveSection::Playlists {
                    if let Some(playlist) = model.get_selected_playlist().await {
                        drop(model);
                        self.open_playlist_streams(&playlist.id).await;
                    }
                }
            }
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.toggle_playback().await;
            }
            // Autoplay the next track now
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.next_track().await;
            }
            // Lyrics
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                drop(model);
                self.show_lyrics().await;
            }
            // Profile and settings
            KeyCode::Char('i') | KeyCode::Char('I') => {
                drop(model);
                self.show_profile().await;
            }
            // Voice search
            KeyCode::Char('v') | KeyCode::Char('V') => {
                drop(model);
                self.start_voice_search().await;
            }
            // Settings toggles
            KeyCode::Char('o') | KeyCode::Char('O') => {
                drop(model);
                self.update_settings(|s| s.autoplay = !s.autoplay).await;
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                drop(model);
                self.update_settings(|s| s.hide_explicit = !s.hide_explicit).await;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                drop(model);
                self.update_settings(|s| s.continuous_voice = !s.continuous_voice).await;
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                drop(model);
                self.update_settings(|s| s.show_lyrics = !s.show_lyrics).await;
            }
            // Focus search
            KeyCode::Char('g') | KeyCode::Char('G') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            // Focus playlists
            KeyCode::Char('p') | KeyCode::Char('P') => {
                model.set_active_section(ActiveSection::Playlists).await;
            }
            // Show help popup
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }
}
