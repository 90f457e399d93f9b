//! Classification of playlist URLs typed at the prompt.

use url::Url;

/// Input that ends the program instead of being validated.
pub const QUIT_SIGNAL: &str = "q";

/// Substring the host or path of an accepted URL must contain.
pub const PLATFORM_DOMAIN: &str = "youtube.com";

/// Identifier of the playlist to copy, taken from the URL's `list` parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistReference(String);

impl PlaylistReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlaylistReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Valid(PlaylistReference),
    Invalid,
    Quit,
}

/// Parse leniently: input without a scheme (`youtube.com/playlist?list=..`)
/// is read as if it had one.
fn parse_lenient(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", input.trim_start_matches('/'))).ok()
        }
        Err(_) => None,
    }
}

/// Host and path exactly as typed. `Url` lowercases the host, and the
/// domain check is case-sensitive.
fn typed_host_and_path(input: &str) -> &str {
    let rest = input.split_once("://").map_or(input, |(_, rest)| rest);
    rest.split(['?', '#']).next().unwrap_or_default()
}

/// First non-empty `list` value in the query string.
fn list_parameter(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, value)| key == "list" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

pub fn validate(input: &str) -> Validation {
    if input == QUIT_SIGNAL {
        return Validation::Quit;
    }

    let Some(url) = parse_lenient(input) else {
        return Validation::Invalid;
    };

    if !typed_host_and_path(input).contains(PLATFORM_DOMAIN) {
        return Validation::Invalid;
    }

    match list_parameter(&url) {
        Some(id) => Validation::Valid(PlaylistReference(id)),
        None => Validation::Invalid,
    }
}
