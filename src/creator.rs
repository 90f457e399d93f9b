use crate::error::CopyError;
use yt_data_client::{NewPlaylist, PlaylistSnippet, PlaylistStatus, PrivacyStatus, YouTubeDataClient};

const COPY_TAGS: [&str; 3] = ["sample playlist", "API call", "MUSIC"];

/// The private playlist created for a copy of `title`.
pub fn copy_of(title: &str) -> NewPlaylist {
    NewPlaylist {
        snippet: PlaylistSnippet {
            title: format!("{}-Copy", title),
            description: format!("Copied {}", title),
            tags: COPY_TAGS.iter().map(|tag| tag.to_string()).collect(),
            default_language: Some("en".to_string()),
        },
        status: PlaylistStatus {
            privacy_status: PrivacyStatus::Private,
        },
    }
}

/// Create the destination playlist and return its id.
pub async fn create_playlist(client: &YouTubeDataClient, title: &str) -> Result<String, CopyError> {
    let playlist = client.insert_playlist(&copy_of(title)).await?;
    tracing::info!(playlist_id = %playlist.id, "created destination playlist");
    Ok(playlist.id)
}
