//! The interactive copy run: prompt, authenticate, read, create, write.

use crate::creator::create_playlist;
use crate::error::CopyError;
use crate::progress::TextProgressBar;
use crate::reader::read_playlist;
use crate::validate::{PlaylistReference, Validation, validate};
use crate::writer::{add_videos, write_summary};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use yt_data_client::YouTubeDataClient;
use yt_oauth::{Authenticator, YOUTUBE_FORCE_SSL_SCOPE};

pub const BANNER: &str = r#"
 ######   #######  ########  ##    ## ######## ##     ## ########  ########
##    ## ##     ## ##     ##  ##  ##     ##    ##     ## ##     ## ##
##       ##     ## ##     ##   ####      ##    ##     ## ##     ## ##
##       ##     ## ########     ##       ##    ##     ## ########  ######
##       ##     ## ##           ##       ##    ##     ## ##     ## ##
##    ## ##     ## ##           ##       ##    ##     ## ##     ## ##
 ######   #######  ##           ##       ##     #######  ########  ########
"#;

pub const INTRO: &str =
    "With a valid YouTube playlist url, CopyTube can copy a public playlist of up to 195 videos.";

/// Line-at-a-time user input without the trailing newline. `None` at end of
/// input.
pub trait LineSource {
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

impl LineSource for io::Stdin {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}

impl<R: BufRead> LineSource for io::Lines<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.next().transpose()
    }
}

/// Settings supplied from outside the interactive session.
#[derive(Debug, Clone)]
pub struct CopyConfig {
    /// Base address of the Data API
    pub api_address: String,
    /// Developer key sent with every request
    pub api_key: Option<String>,
    /// OAuth client secrets JSON
    pub client_secrets: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySummary {
    pub source: PlaylistReference,
    pub title: String,
    pub playlist_id: String,
    pub inserted: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The user asked to quit (or input ended) before anything was copied.
    Quit,
    Copied(CopySummary),
}

/// Ask for a playlist URL until a valid one is entered. `None` means quit.
pub fn prompt_for_playlist(
    input: &mut impl LineSource,
    out: &mut impl Write,
) -> io::Result<Option<PlaylistReference>> {
    write!(out, "Enter playlist URL: ")?;
    out.flush()?;

    loop {
        let Some(line) = input.next_line()? else {
            return Ok(None);
        };

        match validate(&line) {
            Validation::Valid(playlist) => return Ok(Some(playlist)),
            Validation::Quit => return Ok(None),
            Validation::Invalid => {
                tracing::debug!(input = %line, "rejected playlist URL");
                writeln!(out, "{} is not a valid youtube playlist\n", line)?;
                write!(out, "Please enter a valid url or q to quit: ")?;
                out.flush()?;
            }
        }
    }
}

/// Run one copy from start to finish. Nothing touches the network until a
/// valid URL has been entered.
pub async fn run<A: Authenticator>(
    config: &CopyConfig,
    authenticator: &A,
    input: &mut impl LineSource,
    out: &mut impl Write,
) -> Result<RunOutcome, CopyError> {
    writeln!(out, "{}\n", BANNER)?;
    writeln!(out, "{}", INTRO)?;

    let Some(source) = prompt_for_playlist(input, out)? else {
        return Ok(RunOutcome::Quit);
    };
    tracing::info!(playlist = %source, "copying playlist");

    let token = authenticator
        .authenticate(&config.client_secrets, &[YOUTUBE_FORCE_SSL_SCOPE])
        .await?;
    let client = YouTubeDataClient::new(
        config.api_address.clone(),
        token.access_token,
        config.api_key.clone(),
    );

    let snapshot = read_playlist(&client, &source).await?;
    let playlist_id = create_playlist(&client, &snapshot.title).await?;

    let inserted = {
        let mut progress = TextProgressBar::new(&mut *out);
        add_videos(&client, &playlist_id, &snapshot.songs, &mut progress).await?
    };
    write_summary(out, inserted, &playlist_id)?;

    Ok(RunOutcome::Copied(CopySummary {
        source,
        title: snapshot.title,
        playlist_id,
        inserted,
    }))
}
