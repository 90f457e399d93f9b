//! Installed-application authorization flows.
//!
//! Both flows send the user to the consent page with a PKCE challenge and a
//! random `state`, then trade the returned code for a token. They differ only
//! in how the code comes back: pasted into the console, or delivered to a
//! short-lived callback server on the loopback interface.

use crate::{
    Authenticator, ClientSecrets, OAUTH_CALLBACK_PATH, OAUTH_CALLBACK_PORT, OAuthConfig,
    OAuthError, OAuthToken, unix_now,
};
use serde::Deserialize;
use std::borrow::Cow;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long the local-server flow waits for the browser to come back.
const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(300);

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

/// A prepared authorization request: the URL to show the user plus the
/// secrets needed to validate and redeem the response.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub verifier: String,
    pub state: String,
}

fn random_alphanumeric(len: usize) -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate PKCE verifier and challenge
pub fn generate_pkce() -> (String, String) {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use sha2::{Digest, Sha256};

    let verifier = random_alphanumeric(64);

    // challenge = base64url(SHA256(verifier))
    let hash = Sha256::digest(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hash);

    (verifier, challenge)
}

/// Build the consent URL for `config`.
pub fn generate_auth_url(config: &OAuthConfig) -> AuthorizationRequest {
    let (verifier, challenge) = generate_pkce();
    let state = random_alphanumeric(32);

    let url = format!(
        "{}?\
        client_id={}&\
        redirect_uri={}&\
        response_type=code&\
        scope={}&\
        state={}&\
        code_challenge={}&\
        code_challenge_method=S256&\
        access_type=offline&\
        prompt=consent",
        config.auth_uri,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&config.scope()),
        urlencoding::encode(&state),
        urlencoding::encode(&challenge),
    );

    AuthorizationRequest {
        url,
        verifier,
        state,
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
}

/// Exchange authorization code for tokens
pub async fn exchange_code(
    config: &OAuthConfig,
    code: &str,
    verifier: &str,
) -> Result<OAuthToken, OAuthError> {
    tracing::info!(token_uri = %config.token_uri, "exchanging authorization code for tokens");

    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    let response = reqwest::Client::new()
        .post(&config.token_uri)
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(OAuthError::TokenEndpoint { status, body });
    }

    let token: TokenResponse = serde_json::from_str(&body).map_err(OAuthError::TokenResponse)?;

    tracing::info!("obtained OAuth tokens");

    Ok(OAuthToken {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        token_type: token.token_type.unwrap_or_else(|| "Bearer".to_string()),
        expires_at: unix_now() + token.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
        // The token endpoint only reports scope when it differs from the request.
        scope: Some(token.scope.unwrap_or_else(|| config.scope())),
    })
}

/// Query parameters the authorization server appends to the redirect URI.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    fn from_query_pairs<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Extract the authorization code. A `state` that is present must match;
    /// `require_state` additionally rejects responses without one.
    pub fn into_code(self, expected_state: &str, require_state: bool) -> Result<String, OAuthError> {
        if let Some(error) = self.error {
            return Err(OAuthError::Denied(error));
        }

        match self.state.as_deref() {
            Some(state) if state != expected_state => return Err(OAuthError::StateMismatch),
            None if require_state => return Err(OAuthError::StateMismatch),
            _ => {}
        }

        self.code
            .filter(|code| !code.is_empty())
            .ok_or(OAuthError::MissingCode)
    }
}

/// Interpret what the user pasted: either the bare code or the whole URL the
/// browser was redirected to.
pub fn parse_authorization_input(input: &str, expected_state: &str) -> Result<String, OAuthError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(OAuthError::MissingCode);
    }

    match url::Url::parse(input) {
        Ok(url) if url.query().is_some() => {
            CallbackParams::from_query_pairs(url.query_pairs()).into_code(expected_state, false)
        }
        _ => Ok(input.to_string()),
    }
}

fn write_instructions(out: &mut impl Write, url: &str, follow_up: &str) -> std::io::Result<()> {
    writeln!(out, "\n=================================================")?;
    writeln!(out, "OAuth 2.0 Authorization Required")?;
    writeln!(out, "=================================================")?;
    writeln!(out, "\nPlease visit the following URL to authorize the application:\n")?;
    writeln!(out, "{}\n", url)?;
    writeln!(out, "{}", follow_up)?;
    writeln!(out, "=================================================\n")?;
    out.flush()
}

/// Show the consent URL on `prompt` and read the code back from `input`.
pub fn prompt_for_code(
    request: &AuthorizationRequest,
    input: &mut impl BufRead,
    prompt: &mut impl Write,
) -> Result<String, OAuthError> {
    write_instructions(
        prompt,
        &request.url,
        "After approving, paste the authorization code\n\
        (or the full address you were redirected to).",
    )?;
    write!(prompt, "Enter the authorization code: ")?;
    prompt.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(OAuthError::MissingCode);
    }

    parse_authorization_input(&line, &request.state)
}

/// Console flow on the process's stdin/stderr.
pub async fn run_console_flow(config: &OAuthConfig) -> Result<OAuthToken, OAuthError> {
    let request = generate_auth_url(config);
    let code = prompt_for_code(
        &request,
        &mut std::io::stdin().lock(),
        &mut std::io::stderr(),
    )?;
    exchange_code(config, &code, &request.verifier).await
}

/// Start OAuth flow with local callback server
pub async fn run_local_server_flow(
    config: &OAuthConfig,
    port: u16,
) -> Result<OAuthToken, OAuthError> {
    let request = generate_auth_url(config);
    run_local_server_flow_with(config, request, port, &mut std::io::stderr()).await
}

/// Show `request` on `instructions`, wait on `127.0.0.1:port` for the browser
/// to deliver the code, then redeem it.
pub async fn run_local_server_flow_with(
    config: &OAuthConfig,
    request: AuthorizationRequest,
    port: u16,
    instructions: &mut impl Write,
) -> Result<OAuthToken, OAuthError> {
    use axum::{Router, extract::Query, response::Html, routing::get};
    use tokio::sync::mpsc;

    write_instructions(instructions, &request.url, "Waiting for authorization...")?;

    let (code_tx, mut code_rx) = mpsc::channel::<Result<String, OAuthError>>(1);
    let expected_state = request.state.clone();

    let callback_handler = move |Query(params): Query<CallbackParams>| async move {
        let outcome = params.into_code(&expected_state, true);
        let page = match &outcome {
            Ok(_) => "<html><body><h1>Authorization Successful!</h1>\
                <p>You can close this window and return to the application.</p></body></html>"
                .to_string(),
            Err(e) => format!(
                "<html><body><h1>Authorization Failed</h1><p>Error: {}</p>\
                <p>You can close this window.</p></body></html>",
                e
            ),
        };
        // Only the first callback is awaited; later ones have no receiver.
        if code_tx.try_send(outcome).is_err() {
            tracing::debug!("ignoring extra OAuth callback");
        }
        Html(page)
    };

    let app = Router::new().route(OAUTH_CALLBACK_PATH, get(callback_handler));

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tracing::info!(port, "listening for OAuth callback");
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::warn!("OAuth callback server stopped: {}", e);
        }
    });

    let outcome = tokio::time::timeout(AUTHORIZATION_TIMEOUT, code_rx.recv()).await;
    server.abort();

    let code = match outcome {
        Err(_) => return Err(OAuthError::Timeout(AUTHORIZATION_TIMEOUT.as_secs())),
        Ok(None) => return Err(OAuthError::MissingCode),
        Ok(Some(result)) => result?,
    };

    exchange_code(config, &code, &request.verifier).await
}

/// Where the authorization code is collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FlowMode {
    /// Print the consent URL and read the code from stdin
    #[default]
    Console,
    /// Receive the code on a loopback callback server
    LocalServer,
}

/// [`Authenticator`] for Google "installed application" clients.
#[derive(Debug, Clone)]
pub struct InstalledAppFlow {
    mode: FlowMode,
    allow_insecure_transport: bool,
    callback_port: u16,
    token_cache: Option<PathBuf>,
}

impl InstalledAppFlow {
    pub fn new(mode: FlowMode) -> Self {
        Self {
            mode,
            allow_insecure_transport: false,
            callback_port: OAUTH_CALLBACK_PORT,
            token_cache: None,
        }
    }

    /// Permit plain-http OAuth endpoints and redirect URIs. Local development only.
    pub fn allow_insecure_transport(mut self, allow: bool) -> Self {
        self.allow_insecure_transport = allow;
        self
    }

    pub fn callback_port(mut self, port: u16) -> Self {
        self.callback_port = port;
        self
    }

    /// Reuse an unexpired token from `path` and save newly obtained ones there.
    pub fn token_cache(mut self, path: Option<PathBuf>) -> Self {
        self.token_cache = path;
        self
    }

    fn cached_token(&self, scopes: &[&str]) -> Option<OAuthToken> {
        let path = self.token_cache.as_deref()?;
        if !path.exists() {
            return None;
        }

        match OAuthToken::load_from_file(path) {
            Ok(token) if !token.grants(scopes) => {
                tracing::info!(path = %path.display(), "cached OAuth token lacks requested scopes");
                None
            }
            Ok(token) if !token.is_expired() => {
                tracing::info!(path = %path.display(), "using cached OAuth token");
                Some(token)
            }
            Ok(_) => {
                tracing::info!(path = %path.display(), "cached OAuth token expired");
                None
            }
            Err(e) => {
                tracing::warn!("ignoring unreadable token cache: {}", e);
                None
            }
        }
    }

    fn redirect_uri(&self, secrets: &ClientSecrets) -> String {
        match self.mode {
            FlowMode::Console => secrets.console_redirect_uri(),
            FlowMode::LocalServer => format!(
                "http://localhost:{}{}",
                self.callback_port, OAUTH_CALLBACK_PATH
            ),
        }
    }
}

impl Authenticator for InstalledAppFlow {
    async fn authenticate(
        &self,
        client_secrets: &Path,
        scopes: &[&str],
    ) -> Result<OAuthToken, OAuthError> {
        if let Some(token) = self.cached_token(scopes) {
            return Ok(token);
        }

        let secrets = ClientSecrets::from_file(client_secrets)?;
        let config = OAuthConfig::from_client_secrets(&secrets, scopes, self.redirect_uri(&secrets));
        config.check_transport(self.allow_insecure_transport)?;
        if self.allow_insecure_transport {
            tracing::warn!("OAuth insecure transport is enabled; do not use this in production");
        }

        let token = match self.mode {
            FlowMode::Console => run_console_flow(&config).await?,
            FlowMode::LocalServer => run_local_server_flow(&config, self.callback_port).await?,
        };

        if let Some(path) = &self.token_cache {
            token.save_to_file(path)?;
            tracing::info!(path = %path.display(), "saved OAuth token");
        }

        Ok(token)
    }
}
