//! Client secrets files as downloaded from the Google Cloud console.

use crate::{GOOGLE_AUTH_URI, GOOGLE_TOKEN_URI, OAuthError};
use serde::Deserialize;
use std::path::Path;

/// OAuth client credentials from an `installed` or `web` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_file(path: &Path) -> Result<Self, OAuthError> {
        let content = std::fs::read_to_string(path).map_err(|source| OAuthError::ReadSecrets {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    fn from_json(content: &str, path: &Path) -> Result<Self, OAuthError> {
        let file: SecretsFile =
            serde_json::from_str(content).map_err(|source| OAuthError::ParseSecrets {
                path: path.to_path_buf(),
                source,
            })?;

        file.installed
            .or(file.web)
            .ok_or_else(|| OAuthError::MissingClientSection {
                path: path.to_path_buf(),
            })
    }

    /// Redirect URI for flows where the user copies the code back by hand.
    pub fn console_redirect_uri(&self) -> String {
        self.redirect_uris
            .first()
            .cloned()
            .unwrap_or_else(|| "http://localhost".to_string())
    }
}
