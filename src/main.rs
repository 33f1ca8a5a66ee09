mod config;
mod controller;
mod logging;
mod model;
mod services;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use config::AppConfig;
use view::AppView;
use controller::AppController;
use model::{AppModel, FileStore, KeyValueStore, MemoryStore, PlaylistStreamCache, SettingsStore};
use services::{resolve_capability, CommandRecognizer, Services, SpeechRecognizer, VoiceSearch};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== soundstream-rs Client Starting ===");

    let config = AppConfig::from_env();
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        origin = %config.origin,
        backend = ?config.backend_url,
        "Configuration loaded"
    );

    let services = Services::from_config(&config)?;

    // Local storage is best-effort: fall back to memory if the data dir is unusable
    let store: Arc<dyn KeyValueStore> = match FileStore::init(&config.data_dir, &config.origin) {
        Ok(store) => {
            tracing::info!(dir = %store.dir().display(), "Using file storage");
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!(error = %e, "File storage unavailable, stream playlists will not persist");
            Arc::new(MemoryStore::new())
        }
    };
    let streams = PlaylistStreamCache::with_store(store.clone());
    let settings_store = SettingsStore::new(store);
    let settings = settings_store.load();

    let recognizers: Vec<Arc<dyn SpeechRecognizer>> = config
        .stt_command
        .as_deref()
        .and_then(CommandRecognizer::parse)
        .map(|recognizer| Arc::new(recognizer) as Arc<dyn SpeechRecognizer>)
        .into_iter()
        .collect();
    let voice = VoiceSearch::new(resolve_capability(recognizers));

    let model = Arc::new(Mutex::new(AppModel::new(settings, voice)));
    let controller = AppController::new(model.clone(), services, streams, settings_store);

    controller.start_background_tasks().await;
    controller.refresh_playlists().await;

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("soundstream-rs Client shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    loop {
        // Get current state
        let (now_playing, ui_state, content_state, settings, should_quit) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_now_playing().await,
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.get_settings().await,
                model_guard.should_quit().await,
            )
        };

        // Draw UI
        terminal.draw(|f| {
            AppView::render(f, &now_playing, &ui_state, &content_state, &settings);
        })?;

        controller.autoplay_tick().await;

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
