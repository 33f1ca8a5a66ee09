//! Lyrics view model
//!
//! The backend returns either LRC-synced lyrics, plain text, or both. Synced
//! lyrics are preferred so the view can highlight the active line.

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsPayload {
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub synced_lyrics: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl LyricsPayload {
    pub fn is_empty(&self) -> bool {
        let blank = |text: &Option<String>| text.as_deref().is_none_or(|t| t.trim().is_empty());
        blank(&self.lyrics) && blank(&self.synced_lyrics)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LyricLine {
    /// None for plain (unsynced) lyrics
    pub timestamp_ms: Option<u32>,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lyrics {
    pub title: String,
    pub artist: String,
    pub lines: Vec<LyricLine>,
    pub synced: bool,
    pub source: Option<String>,
}

impl Lyrics {
    pub fn from_payload(title: &str, artist: &str, payload: LyricsPayload) -> Self {
        let synced_lines = payload
            .synced_lyrics
            .as_deref()
            .map(parse_lrc_lines)
            .unwrap_or_default();

        let (lines, synced) = if !synced_lines.is_empty() {
            (synced_lines, true)
        } else {
            let text = payload.lyrics.or(payload.synced_lyrics).unwrap_or_default();
            (plain_lines(&text), false)
        };

        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            lines,
            synced,
            source: payload.source,
        }
    }

    /// Index of the line being sung at `position_ms`
    pub fn line_at(&self, position_ms: u32) -> Option<usize> {
        if !self.synced {
            return None;
        }
        let upcoming = self
            .lines
            .partition_point(|line| line.timestamp_ms.is_some_and(|ts| ts <= position_ms));
        upcoming.checked_sub(1)
    }
}

fn plain_lines(text: &str) -> Vec<LyricLine> {
    text.lines()
        .map(|line| LyricLine {
            timestamp_ms: None,
            // LRC text that failed to parse still carries tags; drop them
            text: strip_tags(line).trim().to_string(),
        })
        .collect()
}

fn strip_tags(line: &str) -> &str {
    let mut rest = line.trim_start();
    while rest.starts_with('[') {
        match rest.find(']') {
            Some(end) => rest = &rest[end + 1..],
            None => break,
        }
    }
    rest
}

fn parse_lrc_lines(raw: &str) -> Vec<LyricLine> {
    let mut lines = Vec::new();

    for raw_line in raw.lines() {
        let mut rest = raw_line.trim();
        let mut timestamps = Vec::new();

        while rest.starts_with('[') {
            let Some(end) = rest.find(']') else {
                break;
            };
            if let Some(ms) = parse_lrc_timestamp(&rest[1..end]) {
                timestamps.push(ms);
            }
            rest = &rest[end + 1..];
        }

        // Metadata tags like [ar:...] produce no timestamp
        for timestamp in timestamps {
            lines.push(LyricLine {
                timestamp_ms: Some(timestamp),
                text: rest.trim().to_string(),
            });
        }
    }

    lines.sort_by_key(|line| line.timestamp_ms);
    lines
}

/// `mm:ss`, `mm:ss.xx` or `mm:ss.xxx` to milliseconds
fn parse_lrc_timestamp(token: &str) -> Option<u32> {
    let (minutes, seconds) = token.split_once(':')?;
    let minutes: u32 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().replace(',', ".").parse().ok()?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    minutes
        .checked_mul(60_000)?
        .checked_add((seconds * 1000.0).round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LRC: &str = "[ar:Artist]\n[00:12.00]First line\n[00:17.20]Second line\n[00:21.10][01:30.00]Chorus\n[00:25.00]\n";

    #[test]
    fn test_timestamp_parsing() {
        assert_eq!(parse_lrc_timestamp("00:12.00"), Some(12_000));
        assert_eq!(parse_lrc_timestamp("01:02.345"), Some(62_345));
        assert_eq!(parse_lrc_timestamp("02:05"), Some(125_000));
        assert_eq!(parse_lrc_timestamp("ar:Artist"), None);
        assert_eq!(parse_lrc_timestamp("00:75.00"), None);
        assert_eq!(parse_lrc_timestamp("99999:00.00"), None);
    }

    #[test]
    fn test_out_of_range_timestamp_skipped() {
        let payload = LyricsPayload {
            synced_lyrics: Some("[99999:00.00]way too late\n[00:01.00]hi".to_string()),
            ..Default::default()
        };
        let lyrics = Lyrics::from_payload("Song", "Artist", payload);

        assert!(lyrics.synced);
        assert_eq!(lyrics.lines.len(), 1);
        assert_eq!(lyrics.lines[0].text, "hi");
        assert_eq!(lyrics.lines[0].timestamp_ms, Some(1_000));
    }

    #[test]
    fn test_synced_lyrics_preferred() {
        let payload = LyricsPayload {
            lyrics: Some("First line\nSecond line".to_string()),
            synced_lyrics: Some(LRC.to_string()),
            source: Some("lrclib".to_string()),
        };
        let lyrics = Lyrics::from_payload("Song", "Artist", payload);

        assert!(lyrics.synced);
        let texts: Vec<&str> = lyrics.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["First line", "Second line", "Chorus", "", "Chorus"]);
    }

    #[test]
    fn test_line_at() {
        let payload = LyricsPayload {
            synced_lyrics: Some(LRC.to_string()),
            ..Default::default()
        };
        let lyrics = Lyrics::from_payload("Song", "Artist", payload);

        assert_eq!(lyrics.line_at(0), None);
        assert_eq!(lyrics.line_at(12_000), Some(0));
        assert_eq!(lyrics.line_at(18_000), Some(1));
        assert_eq!(lyrics.line_at(200_000), Some(4));
    }

    #[test]
    fn test_plain_fallback() {
        let payload = LyricsPayload {
            lyrics: Some("one\ntwo".to_string()),
            ..Default::default()
        };
        let lyrics = Lyrics::from_payload("Song", "Artist", payload);

        assert!(!lyrics.synced);
        assert_eq!(lyrics.lines.len(), 2);
        assert_eq!(lyrics.line_at(5_000), None);
    }

    #[test]
    fn test_empty_payload() {
        assert!(LyricsPayload::default().is_empty());
        let blank = LyricsPayload {
            lyrics: Some("  \n".to_string()),
            ..Default::default()
        };
        assert!(blank.is_empty());
    }
}
