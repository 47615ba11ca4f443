//! Built-in endpoint presets
//!
//! Lets a run say `dataset: videos` instead of spelling out URL, field list
//! and record location.

use super::types::{Endpoint, IdentityStyle, RecordsLocation};

const API_BASE: &str = "https://open.tiktokapis.com/v2/research";

const VIDEO_FIELDS: &str = "id,video_description,create_time,region_code,share_count,view_count,\
like_count,comment_count,music_id,hashtag_names,username,effect_ids,playlist_id,voice_to_text,\
is_stem_verified,favorites_count,video_duration,hashtag_info_list,sticker_info_list,\
effect_info_list,video_mention_list,video_label,video_tag";

const REPOSTED_FIELDS: &str = "id,create_time,username,region_code,video_description,music_id,\
like_count,comment_count,share_count,view_count,hashtag_names,video_duration,favorites_count,\
is_stem_verified,hashtag_info_list,sticker_info_list,effect_info_list,video_mention_list,\
video_label";

const USER_INFO_FIELDS: &str = "display_name,bio_description,avatar_url,is_verified,\
follower_count,following_count,likes_count,video_count";

/// Names of all built-in presets
pub const BUILTIN_ENDPOINTS: &[&str] = &["videos", "reposted_videos", "following", "user_info"];

/// Get a built-in endpoint by name
pub fn get_builtin(name: &str) -> Option<Endpoint> {
    let endpoint = match name {
        "videos" => Endpoint::new(
            "videos",
            format!("{API_BASE}/video/query/"),
            RecordsLocation::key("videos"),
            IdentityStyle::VideoQuery,
        )
        .with_fields([VIDEO_FIELDS])
        .with_page_size(100)
        .windowed(true),

        "reposted_videos" => Endpoint::new(
            "reposted_videos",
            format!("{API_BASE}/user/reposted_videos/"),
            RecordsLocation::Keys(vec![
                "reposted_videos".to_string(),
                "user_reposted_videos".to_string(),
            ]),
            IdentityStyle::Username,
        )
        .with_fields([REPOSTED_FIELDS])
        .with_page_size(100),

        "following" => Endpoint::new(
            "following",
            format!("{API_BASE}/user/following/"),
            RecordsLocation::key("user_following"),
            IdentityStyle::Username,
        )
        .with_page_size(100),

        "user_info" => Endpoint::new(
            "user_info",
            format!("{API_BASE}/user/info/"),
            RecordsLocation::Object,
            IdentityStyle::Username,
        )
        .with_fields([USER_INFO_FIELDS]),

        _ => return None,
    };

    Some(endpoint)
}

/// Check if a name is a built-in preset
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_ENDPOINTS.contains(&name)
}

/// List all built-in presets
pub fn list_builtin() -> Vec<Endpoint> {
    BUILTIN_ENDPOINTS
        .iter()
        .filter_map(|name| get_builtin(name))
        .collect()
}
