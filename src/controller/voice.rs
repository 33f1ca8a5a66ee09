//! Voice search sessions

use crate::services::ListenMode;
use super::AppController;

impl AppController {
    pub async fn start_voice_search(&self) {
        let model = self.model.lock().await;
        if !model.get_ui_state().await.voice_supported {
            model.set_status("Voice search is not available").await;
            return;
        }

        let mode = if model.get_settings().await.continuous_voice {
            ListenMode::Continuous
        } else {
            ListenMode::SingleShot
        };

        let Some(mut events) = model.start_voice(mode).await else {
            tracing::debug!("Voice search already listening");
            return;
        };
        drop(model);

        tracing::info!(?mode, "Voice search started");
        let controller = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let query = {
                    let model = controller.model.lock().await;
                    if model.should_quit().await {
                        break;
                    }
                    model.apply_voice_event(event).await
                };

                if let Some(query) = query {
                    tracing::info!(query, "Voice query recognized");
                    controller.model.lock().await.update_search_query(query.clone()).await;
                    controller.perform_search(&query).await;
                }
            }
            tracing::debug!("Voice search session ended");
        });
    }
}
