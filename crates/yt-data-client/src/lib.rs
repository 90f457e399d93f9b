//! Thin REST client for the playlist endpoints of the YouTube Data API v3.
//!
//! Every call is a single request with no retry. Callers drive pagination
//! themselves through [`YouTubeDataClient::list_playlist_items`].

pub mod types;

pub use types::*;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

/// Default base address of the Data API.
pub const DEFAULT_API_ADDRESS: &str = "https://www.googleapis.com";

/// Largest page size `playlistItems.list` accepts.
pub const PLAYLIST_ITEMS_PAGE_SIZE: u32 = 50;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} failed (status {status}): {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{endpoint} response is missing '{field}'")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },
}

/// Authenticated handle used for every Data API call.
#[derive(Debug, Clone)]
pub struct YouTubeDataClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    api_key: Option<String>,
}

impl YouTubeDataClient {
    /// `base_url` is the API host (for example [`DEFAULT_API_ADDRESS`]); the
    /// `/youtube/v3` prefix is appended per request.
    pub fn new(
        base_url: impl Into<String>,
        access_token: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            access_token: access_token.into(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of a playlist's items. Pass an empty `page_token` for
    /// the first page.
    pub async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: &str,
    ) -> Result<PlaylistItemListResponse, ApiError> {
        tracing::debug!(playlist_id, page_token, "listing playlist items");

        let request = self
            .http
            .get(self.endpoint("playlistItems"))
            .query(&[
                ("part", "contentDetails,snippet"),
                ("playlistId", playlist_id),
                ("pageToken", page_token),
            ])
            .query(&[("maxResults", PLAYLIST_ITEMS_PAGE_SIZE)]);

        self.send("playlistItems.list", request).await
    }

    /// Create a playlist owned by the authenticated user.
    pub async fn insert_playlist(&self, playlist: &NewPlaylist) -> Result<Playlist, ApiError> {
        tracing::debug!(title = %playlist.snippet.title, "creating playlist");

        let request = self
            .http
            .post(self.endpoint("playlists"))
            .query(&[("part", "snippet,status")])
            .json(playlist);

        self.send("playlists.insert", request).await
    }

    /// Add a single video to a playlist.
    pub async fn insert_playlist_item(
        &self,
        item: &NewPlaylistItem,
    ) -> Result<PlaylistItem, ApiError> {
        tracing::debug!(
            playlist_id = %item.snippet.playlist_id,
            video_id = %item.snippet.resource_id.video_id,
            position = item.snippet.position,
            "inserting playlist item"
        );

        let request = self
            .http
            .post(self.endpoint("playlistItems"))
            .query(&[("part", "snippet")])
            .json(item);

        self.send("playlistItems.insert", request).await
    }

    fn endpoint(&self, resource: &str) -> String {
        format!("{}/youtube/v3/{}", self.base_url, resource)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        mut request: RequestBuilder,
    ) -> Result<T, ApiError> {
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                endpoint,
                status,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }
}
