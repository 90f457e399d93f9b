use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod flow;
pub mod secrets;

pub use flow::{
    AuthorizationRequest, CallbackParams, FlowMode, InstalledAppFlow, exchange_code,
    generate_auth_url, parse_authorization_input,
};
pub use secrets::ClientSecrets;

/// Default OAuth callback port for the local-server flow
pub const OAUTH_CALLBACK_PORT: u16 = 8080;

/// Path the local-server flow listens on
pub const OAUTH_CALLBACK_PATH: &str = "/oauth2callback";

/// Scope granting full read/write access to the user's YouTube account over SSL
pub const YOUTUBE_FORCE_SSL_SCOPE: &str = "https://www.googleapis.com/auth/youtube.force-ssl";

pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("failed to read client secrets file '{}': {source}", path.display())]
    ReadSecrets {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse client secrets file '{}': {source}", path.display())]
    ParseSecrets {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("client secrets file '{}' has neither an 'installed' nor a 'web' section", path.display())]
    MissingClientSection { path: PathBuf },

    #[error("insecure transport is disabled but '{0}' is not an https URL")]
    InsecureTransport(String),

    #[error("authorization denied: {0}")]
    Denied(String),

    #[error("authorization response state does not match the request")]
    StateMismatch,

    #[error("no authorization code received")]
    MissingCode,

    #[error("OAuth authorization timeout ({0} seconds)")]
    Timeout(u64),

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to exchange authorization code (status {status}): {body}")]
    TokenEndpoint {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse token response: {0}")]
    TokenResponse(#[source] serde_json::Error),

    #[error("failed to access OAuth token file '{}': {source}", path.display())]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse OAuth token file '{}': {source}", path.display())]
    ParseToken {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// OAuth 2.0 token information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Access token for API requests
    pub access_token: String,
    /// Refresh token, when the authorization server issued one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Token type (usually "Bearer")
    pub token_type: String,
    /// Expiry time as Unix timestamp (seconds since epoch)
    pub expires_at: u64,
    /// Space separated scopes the token was granted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Seconds since the Unix epoch.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl OAuthToken {
    /// Check if the token is expired or will expire soon (within 60 seconds)
    pub fn is_expired(&self) -> bool {
        unix_now() + 60 >= self.expires_at
    }

    /// Whether every scope in `scopes` was granted. Tokens saved without a
    /// scope record grant nothing.
    pub fn grants(&self, scopes: &[&str]) -> bool {
        let Some(granted) = self.scope.as_deref() else {
            return false;
        };
        scopes
            .iter()
            .all(|wanted| granted.split_whitespace().any(|g| g == *wanted))
    }

    /// Load token from file
    pub fn load_from_file(path: &Path) -> Result<Self, OAuthError> {
        let content = std::fs::read_to_string(path).map_err(|source| OAuthError::TokenFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| OAuthError::ParseToken {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save token to file, readable only by the owner on Unix-like systems
    pub fn save_to_file(&self, path: &Path) -> Result<(), OAuthError> {
        let token_file_error = |source| OAuthError::TokenFile {
            path: path.to_path_buf(),
            source,
        };

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| token_file_error(std::io::Error::other(e)))?;
        std::fs::write(path, content).map_err(token_file_error)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, permissions).map_err(token_file_error)?;
        }

        Ok(())
    }
}

/// OAuth client configuration for one authorization attempt
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    /// Where the authorization server sends the user after consent
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Create new OAuth configuration with YouTube defaults
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            auth_uri: GOOGLE_AUTH_URI.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            redirect_uri: format!(
                "http://localhost:{}{}",
                OAUTH_CALLBACK_PORT, OAUTH_CALLBACK_PATH
            ),
            scopes: vec![YOUTUBE_FORCE_SSL_SCOPE.to_string()],
        }
    }

    /// Build a configuration from a downloaded client secrets file.
    pub fn from_client_secrets(
        secrets: &ClientSecrets,
        scopes: &[&str],
        redirect_uri: String,
    ) -> Self {
        Self {
            client_id: secrets.client_id.clone(),
            client_secret: secrets.client_secret.clone(),
            auth_uri: secrets.auth_uri.clone(),
            token_uri: secrets.token_uri.clone(),
            redirect_uri,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Space separated scope list as sent to the authorization server
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    /// Reject plain-http endpoints unless insecure transport is allowed.
    pub fn check_transport(&self, allow_insecure: bool) -> Result<(), OAuthError> {
        if allow_insecure {
            return Ok(());
        }
        for uri in [&self.auth_uri, &self.token_uri, &self.redirect_uri] {
            if !uri.starts_with("https://") {
                return Err(OAuthError::InsecureTransport(uri.clone()));
            }
        }
        Ok(())
    }
}

/// Capability that turns a client secrets file and scope list into an access
/// token, however the user ends up being asked for consent.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn authenticate(
        &self,
        client_secrets: &Path,
        scopes: &[&str],
    ) -> Result<OAuthToken, OAuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: u64) -> OAuthToken {
        OAuthToken {
            access_token: "access".to_string(),
            refresh_token: Some("refresh".to_string()),
            token_type: "Bearer".to_string(),
            expires_at,
            scope: Some(YOUTUBE_FORCE_SSL_SCOPE.to_string()),
        }
    }

    #[test]
    fn grants_checks_every_requested_scope() {
        let mut token = token(unix_now() + 3600);
        assert!(token.grants(&[YOUTUBE_FORCE_SSL_SCOPE]));
        assert!(!token.grants(&[YOUTUBE_FORCE_SSL_SCOPE, "openid"]));

        token.scope = Some(format!("openid {}", YOUTUBE_FORCE_SSL_SCOPE));
        assert!(token.grants(&[YOUTUBE_FORCE_SSL_SCOPE, "openid"]));

        token.scope = Some("https://www.googleapis.com/auth/youtube.readonly".to_string());
        assert!(!token.grants(&[YOUTUBE_FORCE_SSL_SCOPE]));

        token.scope = None;
        assert!(!token.grants(&[YOUTUBE_FORCE_SSL_SCOPE]));
    }

    #[test]
    fn token_expiring_within_a_minute_counts_as_expired() {
        assert!(token(unix_now() + 30).is_expired());
        assert!(token(0).is_expired());
        assert!(!token(unix_now() + 3600).is_expired());
    }

    #[test]
    fn token_file_round_trip_keeps_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");

        let original = token(unix_now() + 3600);
        original.save_to_file(&path).unwrap();
        assert_eq!(OAuthToken::load_from_file(&path).unwrap(), original);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn missing_token_file_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = OAuthToken::load_from_file(&path).unwrap_err();
        assert!(matches!(err, OAuthError::TokenFile { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn strict_transport_rejects_plain_http_redirect() {
        let config = OAuthConfig::new("id".to_string(), "secret".to_string());
        assert!(config.check_transport(true).is_ok());
        match config.check_transport(false) {
            Err(OAuthError::InsecureTransport(uri)) => {
                assert_eq!(uri, "http://localhost:8080/oauth2callback")
            }
            other => panic!("expected insecure transport error, got {other:?}"),
        }
    }

    #[test]
    fn scopes_are_space_separated() {
        let mut config = OAuthConfig::new("id".to_string(), "secret".to_string());
        assert_eq!(config.scope(), YOUTUBE_FORCE_SSL_SCOPE);
        config.scopes.push("openid".to_string());
        assert_eq!(config.scope(), format!("{} openid", YOUTUBE_FORCE_SSL_SCOPE));
    }
}
