//! Authorization code capture.
//!
//! With [`AuthMode::Loopback`] a short-lived listener is bound to the redirect
//! URI, the browser is pointed at the provider, and the first callback carrying
//! a code ends the wait. With [`AuthMode::Prompt`] the user pastes the code (or
//! the whole URL they were redirected to) on stdin.

use axum::{Router, extract::Query, response::Html, routing::get};
use rand::{Rng, distr::Alphanumeric};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::AuthMode;
use crate::error::{AppError, Result};
use crate::service::Service;

/// What the user has to authorize and where the provider sends them afterwards.
#[derive(Debug, Clone, Copy)]
pub struct AuthRequest<'a> {
    pub service: Service,
    pub authorize_url: &'a str,
    pub redirect_uri: &'a str,
    pub state: &'a str,
}

/// Random value for the OAuth `state` parameter.
pub fn random_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

pub async fn obtain_code(mode: AuthMode, request: &AuthRequest<'_>) -> Result<String> {
    match mode {
        AuthMode::Loopback => {
            info!("Trying to get {} token from web", request.service);
            via_loopback(request, |url| webbrowser::open(url)).await
        }
        AuthMode::Prompt => {
            info!("Trying to get {} token from prompt", request.service);
            via_prompt(request)
        }
    }
}

/// Validates the query of a redirect and returns its code.
pub fn code_from_params(params: &HashMap<String, String>, expected_state: &str) -> Result<String> {
    if let Some(error) = params.get("error") {
        return Err(AppError::Auth(format!("Authorization was denied: {}", error)));
    }

    match params.get("state") {
        Some(state) if state == expected_state => {}
        Some(_) => return Err(AppError::Auth("State mismatch in authorization callback".into())),
        None => return Err(AppError::Auth("Authorization callback carried no state".into())),
    }

    params
        .get("code")
        .filter(|code| !code.is_empty())
        .cloned()
        .ok_or_else(|| AppError::Auth("Authorization callback carried no code".into()))
}

/// Accepts either the bare code or the full URL the browser was redirected to.
pub fn code_from_input(input: &str, expected_state: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(AppError::Auth("No authorization code entered".into()));
    }

    match Url::parse(input) {
        Ok(url) => {
            let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
            code_from_params(&params, expected_state)
        }
        Err(_) => Ok(input.to_string()),
    }
}

fn via_prompt(request: &AuthRequest<'_>) -> Result<String> {
    println!(
        "\nOpen this URL in your browser to authorize {}:",
        request.service
    );
    println!("{}\n", request.authorize_url);

    print!("Enter the authorization code or the URL you were redirected to: ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;

    code_from_input(&answer, request.state)
}

async fn via_loopback<F>(request: &AuthRequest<'_>, open_browser: F) -> Result<String>
where
    F: FnOnce(&str) -> io::Result<()>,
{
    let redirect = Url::parse(request.redirect_uri)?;
    let host = redirect
        .host_str()
        .ok_or_else(|| AppError::Config(format!("Redirect URI has no host: {}", redirect)))?
        .to_string();
    let port = redirect.port_or_known_default().unwrap_or(80);
    let path = match redirect.path() {
        "" => "/".to_string(),
        path => path.to_string(),
    };

    let listener = tokio::net::TcpListener::bind((host.as_str(), port))
        .await
        .map_err(|e| {
            AppError::Auth(format!("Unable to start a web server on {}:{}: {}", host, port, e))
        })?;
    debug!("Listening for the {} callback on {}:{}{}", request.service, host, port, path);

    let (code_tx, code_rx) = oneshot::channel::<Result<String>>();
    let code_tx = Arc::new(Mutex::new(Some(code_tx)));
    let expected_state = request.state.to_string();

    let app = Router::new().route(
        &path,
        get(move |Query(params): Query<HashMap<String, String>>| {
            let code_tx = Arc::clone(&code_tx);
            let expected_state = expected_state.clone();
            async move {
                let outcome = code_from_params(&params, &expected_state);
                let page = match &outcome {
                    Ok(_) => Html(
                        "<h2>Authorization received.</h2><p>You can now safely close this browser window.</p>",
                    ),
                    Err(_) => Html("<h4>Authorization failed.</h4><p>Return to the terminal for details.</p>"),
                };
                if let Some(tx) = code_tx.lock().await.take() {
                    let _ = tx.send(outcome);
                }
                page
            }
        }),
    );

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    if open_browser(request.authorize_url).is_err() {
        warn!("Failed to open browser");
        println!(
            "Please navigate to the following URL manually:\n{}",
            request.authorize_url
        );
    } else {
        println!(
            "Your browser has been opened to authorize {}. This program will resume once authorization has been provided.",
            request.service
        );
        println!("{}", request.authorize_url);
    }

    let outcome = code_rx
        .await
        .map_err(|_| AppError::Auth("Callback listener closed before a code arrived".into()));

    let _ = shutdown_tx.send(());
    if let Err(e) = server.await {
        debug!("Callback listener task ended abnormally: {}", e);
    }

    outcome?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_random_state() {
        let state = random_state();
        assert_eq!(state.len(), 24);
        assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(state, random_state());
    }

    #[test]
    fn test_code_from_params() {
        let code = code_from_params(&params(&[("code", "4/abc"), ("state", "s1")]), "s1").unwrap();
        assert_eq!(code, "4/abc");
    }

    #[test]
    fn test_state_mismatch_rejected() {
        let result = code_from_params(&params(&[("code", "4/abc"), ("state", "other")]), "s1");
        assert!(matches!(result, Err(AppError::Auth(_))));

        let result = code_from_params(&params(&[("code", "4/abc")]), "s1");
        assert!(result.is_err());
    }

    #[test]
    fn test_provider_error_reported() {
        let result = code_from_params(&params(&[("error", "access_denied"), ("state", "s1")]), "s1");
        match result {
            Err(AppError::Auth(message)) => assert!(message.contains("access_denied")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_code_from_pasted_redirect_url() {
        let code = code_from_input(
            "http://127.0.0.1:8080/callback?code=AQD_x-y&state=s1\n",
            "s1",
        )
        .unwrap();
        assert_eq!(code, "AQD_x-y");
    }

    #[test]
    fn test_code_from_bare_input() {
        assert_eq!(code_from_input("  4/0AbCdEf \n", "s1").unwrap(), "4/0AbCdEf");
        assert!(code_from_input("   ", "s1").is_err());
    }

    #[tokio::test]
    async fn test_loopback_captures_single_callback() {
        let redirect_uri = "http://127.0.0.1:38517/callback";
        let request = AuthRequest {
            service: Service::YouTube,
            authorize_url: "https://accounts.example.com/authorize",
            redirect_uri,
            state: "xyz",
        };

        let callback = tokio::spawn(async move {
            // retry until the listener is up
            for _ in 0..50 {
                let sent = reqwest::get(format!("{}?code=the-code&state=xyz", redirect_uri)).await;
                if let Ok(response) = sent {
                    return response.status().is_success();
                }
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            }
            false
        });

        let code = via_loopback(&request, |_| Ok(())).await.unwrap();
        assert_eq!(code, "the-code");
        assert!(callback.await.unwrap());
    }
}
