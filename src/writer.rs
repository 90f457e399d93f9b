use crate::error::CopyError;
use crate::progress::ProgressReporter;
use std::io::Write;
use yt_data_client::{NewPlaylistItem, YouTubeDataClient};

/// Most videos copied in one run; each insert costs API quota.
pub const MAX_COPY_ITEMS: usize = 195;

/// Every video is inserted at the head, so the copy ends up in reverse order.
const INSERT_POSITION: u32 = 0;

/// Browsing address of a playlist, as printed in the summary line.
pub fn playlist_url(playlist_id: &str) -> String {
    format!("www.youtube.com/playlist?list={}", playlist_id)
}

/// Insert the first `min(MAX_COPY_ITEMS, songs.len())` videos into
/// `playlist_id`. Progress is reported as `(i, total)` after the i-th insert
/// (zero based) and once more as `(total, total)` when all are in. Returns
/// how many were inserted. The first failed insert aborts the rest.
pub async fn add_videos(
    client: &YouTubeDataClient,
    playlist_id: &str,
    songs: &[String],
    progress: &mut impl ProgressReporter,
) -> Result<usize, CopyError> {
    let total = songs.len().min(MAX_COPY_ITEMS);
    if songs.len() > total {
        tracing::info!(
            available = songs.len(),
            copied = total,
            "source exceeds the copy limit; extra videos are skipped"
        );
    }

    for (index, video_id) in songs[..total].iter().enumerate() {
        let item = NewPlaylistItem::video(playlist_id, video_id, INSERT_POSITION);
        client.insert_playlist_item(&item).await?;
        progress.report(index, total)?;
    }
    progress.report(total, total)?;

    Ok(total)
}

pub fn write_summary(out: &mut impl Write, inserted: usize, playlist_id: &str) -> std::io::Result<()> {
    writeln!(
        out,
        "{} songs added to new playlist at {}",
        inserted,
        playlist_url(playlist_id)
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_names_count_and_playlist() {
        let mut out = Vec::new();
        write_summary(&mut out, 3, "PLnew").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "3 songs added to new playlist at www.youtube.com/playlist?list=PLnew\n"
        );
    }
}
