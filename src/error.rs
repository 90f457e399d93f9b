use yt_data_client::ApiError;
use yt_oauth::OAuthError;

#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("authentication failed: {0}")]
    Auth(#[from] OAuthError),

    #[error("YouTube API error: {0}")]
    Api(#[from] ApiError),

    /// The first page of the source playlist had no items, so there is no
    /// title to copy from.
    #[error("playlist {playlist_id} has no items to copy")]
    EmptySource { playlist_id: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
