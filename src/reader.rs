use crate::error::CopyError;
use crate::validate::PlaylistReference;
use yt_data_client::{ApiError, YouTubeDataClient};

/// Video ids of a source playlist in playlist order, plus the title used to
/// name the copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSnapshot {
    pub title: String,
    pub songs: Vec<String>,
}

/// Page through every item of `playlist`. The title is the owner's channel
/// title as reported on the first item of the first page.
pub async fn read_playlist(
    client: &YouTubeDataClient,
    playlist: &PlaylistReference,
) -> Result<PlaylistSnapshot, CopyError> {
    let mut page_token = String::new();
    let mut title: Option<String> = None;
    let mut songs = Vec::new();
    let mut pages = 0usize;

    loop {
        let page = client
            .list_playlist_items(playlist.as_str(), &page_token)
            .await?;
        pages += 1;

        if title.is_none() {
            let first = page.items.first().ok_or_else(|| CopyError::EmptySource {
                playlist_id: playlist.to_string(),
            })?;
            let channel_title = first.channel_title().ok_or(ApiError::MissingField {
                endpoint: "playlistItems.list",
                field: "snippet.channelTitle",
            })?;
            title = Some(channel_title.to_string());
        }

        for item in &page.items {
            let video_id = item.video_id().ok_or(ApiError::MissingField {
                endpoint: "playlistItems.list",
                field: "contentDetails.videoId",
            })?;
            songs.push(video_id.to_string());
        }

        match page.next_page_token {
            Some(next) => page_token = next,
            None => break,
        }
    }

    tracing::info!(
        playlist = %playlist,
        pages,
        videos = songs.len(),
        "read source playlist"
    );

    Ok(PlaylistSnapshot {
        title: title.unwrap_or_default(),
        songs,
    })
}
