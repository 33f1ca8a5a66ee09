//! Profile statistics shown on the profile view

use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileStats {
    #[serde(default, alias = "followers_count")]
    pub followers: u64,
    #[serde(default, alias = "following_count")]
    pub following: u64,
    #[serde(default, alias = "playlists_count")]
    pub playlists: u64,
}

/// Compact count for display: `999`, `1.2K`, `3.4M`
pub fn format_count(n: u64) -> String {
    match n {
        0..=999 => n.to_string(),
        1_000..=999_999 => compact(n, 1_000, "K"),
        _ => compact(n, 1_000_000, "M"),
    }
}

/// Truncates to one decimal so 999_999 never shows as 1000.0K
fn compact(n: u64, unit: u64, suffix: &str) -> String {
    let tenths = n / (unit / 10);
    match tenths % 10 {
        0 => format!("{}{}", tenths / 10, suffix),
        frac => format!("{}.{}{}", tenths / 10, frac, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1K");
        assert_eq!(format_count(1_250), "1.2K");
        assert_eq!(format_count(999_999), "999.9K");
        assert_eq!(format_count(3_400_000), "3.4M");
    }

    #[test]
    fn test_stats_accept_count_suffixed_fields() {
        let stats: ProfileStats = serde_json::from_str(
            r#"{"followers_count": 12, "following_count": 3, "playlists_count": 4}"#,
        )
        .unwrap();
        assert_eq!(stats, ProfileStats { followers: 12, following: 3, playlists: 4 });

        let stats: ProfileStats = serde_json::from_str(r#"{"followers": 1}"#).unwrap();
        assert_eq!(stats.followers, 1);
        assert_eq!(stats.playlists, 0);
    }
}
