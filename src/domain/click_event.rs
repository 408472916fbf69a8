//! Click event flowing through the fire-and-forget tracking channel.

use url::Url;

/// One visitor click, queued for the background worker.
///
/// Carries the pre-hashed visitor IP and the UTM fields parsed out of the
/// referer. Built on the request path, persisted off it.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub short_code: String,
    pub ip_hash: String,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
}

impl ClickEvent {
    /// Builds a click event, extracting UTM parameters from the referer
    /// query string when present.
    pub fn new(
        short_code: String,
        ip_hash: String,
        user_agent: Option<&str>,
        referer: Option<&str>,
    ) -> Self {
        let (utm_source, utm_medium, utm_campaign) = referer
            .map(parse_utm)
            .unwrap_or((None, None, None));

        Self {
            short_code,
            ip_hash,
            user_agent: user_agent.map(str::to_string),
            referer: referer.map(str::to_string),
            utm_source,
            utm_medium,
            utm_campaign,
        }
    }
}

fn parse_utm(referer: &str) -> (Option<String>, Option<String>, Option<String>) {
    let Ok(url) = Url::parse(referer) else {
        return (None, None, None);
    };

    let mut source = None;
    let mut medium = None;
    let mut campaign = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "utm_source" => source = Some(value.into_owned()),
            "utm_medium" => medium = Some(value.into_owned()),
            "utm_campaign" => campaign = Some(value.into_owned()),
            _ => {}
        }
    }
    (source, medium, campaign)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_utm_from_referer() {
        let event = ClickEvent::new(
            "abc1234".to_string(),
            "deadbeef".to_string(),
            Some("Mozilla/5.0"),
            Some("https://news.example.com/?utm_source=newsletter&utm_medium=email&utm_campaign=launch"),
        );

        assert_eq!(event.utm_source.as_deref(), Some("newsletter"));
        assert_eq!(event.utm_medium.as_deref(), Some("email"));
        assert_eq!(event.utm_campaign.as_deref(), Some("launch"));
    }

    #[test]
    fn test_referer_without_utm() {
        let event = ClickEvent::new(
            "abc1234".to_string(),
            "deadbeef".to_string(),
            None,
            Some("https://example.com/page"),
        );

        assert!(event.utm_source.is_none());
        assert!(event.utm_medium.is_none());
        assert!(event.utm_campaign.is_none());
    }

    #[test]
    fn test_unparseable_referer_is_kept_raw() {
        let event = ClickEvent::new(
            "abc1234".to_string(),
            "deadbeef".to_string(),
            None,
            Some("android-app://com.example"),
        );

        assert_eq!(event.referer.as_deref(), Some("android-app://com.example"));
        assert!(event.utm_source.is_none());
    }
}
