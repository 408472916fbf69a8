//! Social-media crawler detection.
//!
//! Crawlers fetching a short link for unfurling get the preview response
//! instead of a redirect, and their visits are not counted as clicks.

const BOT_PATTERNS: &[&str] = &[
    "facebookexternalhit",
    "facebot",
    "twitterbot",
    "discordbot",
    "slackbot",
    "linkedinbot",
    "whatsapp",
    "telegrambot",
    "googlebot",
    "google-pagerenderer",
    "bingbot",
    "yahoo! slurp",
    "duckduckbot",
];

/// Returns true when the user agent belongs to a known social/search crawler.
pub fn is_social_bot(user_agent: Option<&str>) -> bool {
    let Some(ua) = user_agent else {
        return false;
    };
    let ua = ua.to_ascii_lowercase();
    BOT_PATTERNS.iter().any(|pattern| ua.contains(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_known_crawlers() {
        assert!(is_social_bot(Some(
            "Mozilla/5.0 (compatible; Twitterbot/1.0)"
        )));
        assert!(is_social_bot(Some(
            "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)"
        )));
        assert!(is_social_bot(Some("TelegramBot (like TwitterBot)")));
    }

    #[test]
    fn test_regular_browser_not_a_bot() {
        assert!(!is_social_bot(Some(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36"
        )));
    }

    #[test]
    fn test_missing_user_agent_not_a_bot() {
        assert!(!is_social_bot(None));
    }
}
