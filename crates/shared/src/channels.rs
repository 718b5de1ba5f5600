use crate::models::ChannelInfo;

/// Channels announced by this tool, in processing order
pub fn all() -> Vec<ChannelInfo> {
    vec![
        // Feeds are listed directly; scraping the channel page gets 403s on CI runners
        ChannelInfo::new(
            "hashtag_united",
            "Hashtag United",
            "https://www.youtube.com/@HashtagUnited",
        )
        .with_feed_url("https://www.youtube.com/feeds/videos.xml?user=HashtagUnited"),
        ChannelInfo::new(
            "hashtag_united_extra",
            "Hashtag United Extra",
            "https://www.youtube.com/@HashtagUnitedExtra",
        )
        .with_feed_url("https://www.youtube.com/feeds/videos.xml?user=HashtagUnitedExtra"),
    ]
}

pub fn keys() -> Vec<String> {
    all().into_iter().map(|c| c.key).collect()
}

/// Resolve a `--channel` selector: `all` or a single key
pub fn select(selector: &str) -> Option<Vec<ChannelInfo>> {
    if selector == "all" {
        return Some(all());
    }
    all()
        .into_iter()
        .find(|c| c.key == selector)
        .map(|c| vec![c])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let keys = keys();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
    }

    #[test]
    fn test_select_all_keeps_order() {
        let selected = select("all").unwrap();
        let keys: Vec<_> = selected.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["hashtag_united", "hashtag_united_extra"]);
    }

    #[test]
    fn test_select_single_and_unknown() {
        let selected = select("hashtag_united_extra").unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "Hashtag United Extra");

        assert!(select("nope").is_none());
    }

    #[test]
    fn test_every_channel_has_a_source() {
        for channel in all() {
            assert!(
                !channel.feed_urls.is_empty() || channel.handle().is_some(),
                "{} has no way to be fetched",
                channel.key
            );
        }
    }
}
