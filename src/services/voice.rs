//! Voice search
//!
//! Speech recognition is an optional capability. Candidate implementations are
//! checked once at startup and the first available one is kept; when none is
//! available, voice search reports itself unsupported and the UI hides it.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenMode {
    /// Keep listening and emit every phrase
    Continuous,
    /// Stop after the first final transcript
    SingleShot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionError {
    PermissionDenied,
    NoSpeech,
    Other(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecognitionEvent {
    Transcript { text: String, is_final: bool },
    Error(RecognitionError),
    /// Always the last event of a session
    End,
}

pub trait SpeechRecognizer: Send + Sync {
    fn name(&self) -> &str;
    fn is_available(&self) -> bool;
    /// Start a listening session. Must be called from within the tokio runtime.
    fn start(&self, mode: ListenMode) -> mpsc::Receiver<RecognitionEvent>;
}

/// First available recognizer, in the order given
pub fn resolve_capability(candidates: Vec<Arc<dyn SpeechRecognizer>>) -> Option<Arc<dyn SpeechRecognizer>> {
    let found = candidates.into_iter().find(|candidate| candidate.is_available());
    match &found {
        Some(recognizer) => tracing::info!(recognizer = recognizer.name(), "Speech recognition available"),
        None => tracing::info!("No speech recognition available, voice search disabled"),
    }
    found
}

/// Runs an external speech-to-text program; each stdout line is one final transcript
pub struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    /// Split a command line such as `whisper-stream --model base` on whitespace
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn resolve_program(&self) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }
        let path = env::var_os("PATH")?;
        env::split_paths(&path)
            .map(|dir| dir.join(&self.program))
            .find(|candidate| candidate.is_file())
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        self.resolve_program().is_some()
    }

    fn start(&self, mode: ListenMode) -> mpsc::Receiver<RecognitionEvent> {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        tokio::spawn(async move {
            run_command_session(command, mode, &tx).await;
            let _ = tx.send(RecognitionEvent::End).await;
        });

        rx
    }
}

async fn run_command_session(mut command: Command, mode: ListenMode, tx: &mpsc::Sender<RecognitionEvent>) {
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to start speech recognizer");
            let error = if e.kind() == std::io::ErrorKind::PermissionDenied {
                RecognitionError::PermissionDenied
            } else {
                RecognitionError::Other(e.to_string())
            };
            let _ = tx.send(RecognitionEvent::Error(error)).await;
            return;
        }
    };

    let Some(stdout) = child.stdout.take() else {
        let _ = tx
            .send(RecognitionEvent::Error(RecognitionError::Other("no output stream".into())))
            .await;
        return;
    };

    forward_transcripts(BufReader::new(stdout), mode, tx).await;

    if let Err(e) = child.kill().await {
        tracing::trace!(error = %e, "Recognizer already exited");
    }
}

/// One final transcript per non-empty line; NoSpeech only when the output ended cleanly with none
async fn forward_transcripts<R>(reader: R, mode: ListenMode, tx: &mpsc::Sender<RecognitionEvent>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut heard_anything = false;

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let text = line.trim();
                if text.is_empty() {
                    continue;
                }
                heard_anything = true;
                let event = RecognitionEvent::Transcript {
                    text: text.to_string(),
                    is_final: true,
                };
                if tx.send(event).await.is_err() || mode == ListenMode::SingleShot {
                    return;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Speech recognizer output unreadable");
                let _ = tx
                    .send(RecognitionEvent::Error(RecognitionError::Other(e.to_string())))
                    .await;
                return;
            }
        }
    }

    if !heard_anything {
        let _ = tx.send(RecognitionEvent::Error(RecognitionError::NoSpeech)).await;
    }
}

/// Voice search state as the UI sees it
#[derive(Clone, Default)]
pub struct VoiceSearch {
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    pub listening: bool,
    pub transcript: String,
    pub error: Option<String>,
}

impl VoiceSearch {
    pub fn new(recognizer: Option<Arc<dyn SpeechRecognizer>>) -> Self {
        Self {
            recognizer,
            ..Self::default()
        }
    }

    pub fn is_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    /// Begin listening. `None` when unsupported or already listening.
    pub fn start(&mut self, mode: ListenMode) -> Option<mpsc::Receiver<RecognitionEvent>> {
        if self.listening {
            return None;
        }
        let recognizer = self.recognizer.as_ref()?;
        self.listening = true;
        self.transcript.clear();
        self.error = None;
        Some(recognizer.start(mode))
    }

    /// Apply one recognizer event. Returns a query to search for on a final transcript.
    pub fn apply(&mut self, event: RecognitionEvent) -> Option<String> {
        match event {
            RecognitionEvent::Transcript { text, is_final } => {
                self.transcript = text.trim().to_string();
                (is_final && !self.transcript.is_empty()).then(|| self.transcript.clone())
            }
            RecognitionEvent::Error(error) => {
                self.listening = false;
                self.error = Some(match error {
                    RecognitionError::PermissionDenied => "Microphone permission denied".to_string(),
                    RecognitionError::NoSpeech => "No speech detected".to_string(),
                    RecognitionError::Other(reason) => format!("Voice search failed: {}", reason),
                });
                None
            }
            RecognitionEvent::End => {
                self.listening = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedRecognizer {
        available: bool,
        events: Vec<RecognitionEvent>,
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn name(&self) -> &str {
            "scripted"
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn start(&self, _mode: ListenMode) -> mpsc::Receiver<RecognitionEvent> {
            let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
            for event in self.events.iter().cloned() {
                tx.try_send(event).unwrap();
            }
            rx
        }
    }

    fn scripted(available: bool, events: Vec<RecognitionEvent>) -> Arc<dyn SpeechRecognizer> {
        Arc::new(ScriptedRecognizer { available, events })
    }

    #[test]
    fn test_resolve_picks_first_available() {
        let resolved = resolve_capability(vec![
            scripted(false, vec![]),
            scripted(true, vec![RecognitionEvent::End]),
        ]);
        assert!(resolved.is_some_and(|r| r.is_available()));
        assert!(resolve_capability(vec![scripted(false, vec![])]).is_none());
    }

    #[test]
    fn test_unsupported_is_not_an_error() {
        let mut voice = VoiceSearch::new(None);
        assert!(!voice.is_supported());
        assert!(voice.start(ListenMode::SingleShot).is_none());
        assert!(!voice.listening);
        assert!(voice.error.is_none());
    }

    #[tokio::test]
    async fn test_session_produces_query() {
        let recognizer = scripted(
            true,
            vec![
                RecognitionEvent::Transcript { text: "daft".into(), is_final: false },
                RecognitionEvent::Transcript { text: " daft punk ".into(), is_final: true },
                RecognitionEvent::End,
            ],
        );
        let mut voice = VoiceSearch::new(Some(recognizer));
        let mut events = voice.start(ListenMode::SingleShot).unwrap();
        assert!(voice.listening);
        assert!(voice.start(ListenMode::SingleShot).is_none());

        let mut queries = Vec::new();
        while let Some(event) = events.recv().await {
            if let Some(query) = voice.apply(event) {
                queries.push(query);
            }
        }

        assert_eq!(queries, vec!["daft punk".to_string()]);
        assert!(!voice.listening);
    }

    #[test]
    fn test_permission_denied_message() {
        let mut voice = VoiceSearch::new(Some(scripted(true, vec![])));
        voice.listening = true;
        voice.apply(RecognitionEvent::Error(RecognitionError::PermissionDenied));

        assert!(!voice.listening);
        assert_eq!(voice.error.as_deref(), Some("Microphone permission denied"));

        voice.apply(RecognitionEvent::Error(RecognitionError::Other("device busy".into())));
        assert_eq!(voice.error.as_deref(), Some("Voice search failed: device busy"));
    }

    #[test]
    fn test_command_parse() {
        assert!(CommandRecognizer::parse("   ").is_none());
        let recognizer = CommandRecognizer::parse("stt --lang en").unwrap();
        assert_eq!(recognizer.name(), "stt");
        assert_eq!(recognizer.args, vec!["--lang", "en"]);
    }

    #[test]
    fn test_missing_command_is_unavailable() {
        let recognizer = CommandRecognizer::parse("definitely-not-an-stt-binary-4821").unwrap();
        assert!(!recognizer.is_available());
    }

    async fn collect_forwarded(output: &'static [u8]) -> Vec<RecognitionEvent> {
        let (tx, mut rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        forward_transcripts(BufReader::new(output), ListenMode::Continuous, &tx).await;
        drop(tx);

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
        }
        received
    }

    #[tokio::test]
    async fn test_silent_output_reports_no_speech() {
        let received = collect_forwarded(b"\n  \n").await;
        assert_eq!(received, vec![RecognitionEvent::Error(RecognitionError::NoSpeech)]);
    }

    #[tokio::test]
    async fn test_read_error_keeps_its_message() {
        // Invalid UTF-8 makes the line reader fail
        let received = collect_forwarded(b"\xff\xfe\n").await;

        assert_eq!(received.len(), 1);
        assert!(matches!(&received[0], RecognitionEvent::Error(RecognitionError::Other(_))));

        let mut voice = VoiceSearch::new(Some(scripted(true, vec![])));
        voice.listening = true;
        for event in received {
            voice.apply(event);
        }
        assert!(voice.error.as_deref().is_some_and(|e| e.starts_with("Voice search failed")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_session_emits_transcript() {
        let recognizer = CommandRecognizer::parse("echo play something").unwrap();
        assert!(recognizer.is_available());

        let mut events = recognizer.start(ListenMode::SingleShot);
        let mut received = Vec::new();
        while let Some(event) = events.recv().await {
            received.push(event);
        }

        assert_eq!(
            received,
            vec![
                RecognitionEvent::Transcript { text: "play something".into(), is_final: true },
                RecognitionEvent::End,
            ]
        );
    }
}
