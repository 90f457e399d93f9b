//! Request and response bodies for the playlist endpoints of the Data API.

use serde::{Deserialize, Serialize};

/// Kind string for video resources referenced from a playlist item.
pub const VIDEO_KIND: &str = "youtube#video";

/// Response of `playlistItems.list`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/list>
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemListResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    /// Present only when another page of results exists.
    pub next_page_token: Option<String>,
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total_results: Option<u32>,
    pub results_per_page: Option<u32>,
}

/// A `playlistItem` resource. Which fields are populated depends on the
/// `part` parameter of the request that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    pub id: Option<String>,
    pub snippet: Option<PlaylistItemSnippet>,
    pub content_details: Option<PlaylistItemContentDetails>,
}

impl PlaylistItem {
    pub fn video_id(&self) -> Option<&str> {
        self.content_details
            .as_ref()
            .map(|details| details.video_id.as_str())
    }

    /// Title of the channel that owns the playlist this item belongs to.
    pub fn channel_title(&self) -> Option<&str> {
        self.snippet
            .as_ref()
            .and_then(|snippet| snippet.channel_title.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub playlist_id: Option<String>,
    pub channel_title: Option<String>,
    pub title: Option<String>,
    pub position: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemContentDetails {
    pub video_id: String,
}

/// Body of `playlistItems.insert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlaylistItem {
    pub snippet: NewPlaylistItemSnippet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylistItemSnippet {
    pub playlist_id: String,
    /// Zero-based slot the video is placed at.
    pub position: u32,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub kind: String,
    pub video_id: String,
}

impl NewPlaylistItem {
    /// Item placing `video_id` at `position` in `playlist_id`.
    pub fn video(playlist_id: &str, video_id: &str, position: u32) -> Self {
        Self {
            snippet: NewPlaylistItemSnippet {
                playlist_id: playlist_id.to_string(),
                position,
                resource_id: ResourceId {
                    kind: VIDEO_KIND.to_string(),
                    video_id: video_id.to_string(),
                },
            },
        }
    }
}

/// Body of `playlists.insert`.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlists/insert>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlaylist {
    pub snippet: PlaylistSnippet,
    pub status: PlaylistStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrivacyStatus {
    Private,
    Public,
    Unlisted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStatus {
    pub privacy_status: PrivacyStatus,
}

/// A `playlist` resource as returned by `playlists.insert`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub snippet: Option<PlaylistSnippet>,
}
