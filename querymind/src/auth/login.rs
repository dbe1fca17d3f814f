//! Login and signup against the external auth endpoints.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::token::{AuthError, AuthToken};

/// Body sent to the login and signup endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

async fn post_json(
    client: &reqwest::Client,
    url: &str,
    credentials: &Credentials,
) -> Result<Value, AuthError> {
    debug!(url, email = %credentials.email, "posting credentials");
    let resp = client.post(url).json(credentials).send().await?;
    let status = resp.status();
    debug!(status = status.as_u16(), "auth response");
    if !status.is_success() {
        return Err(AuthError::Rejected {
            status: status.as_u16(),
        });
    }
    Ok(resp.json().await?)
}

/// Log in and return the issued access token.
pub async fn login(
    client: &reqwest::Client,
    url: &str,
    credentials: &Credentials,
) -> Result<AuthToken, AuthError> {
    let data = post_json(client, url, credentials).await?;
    let token = ["access_token", "token"]
        .iter()
        .filter_map(|key| data.get(key).and_then(Value::as_str))
        .find_map(AuthToken::new)
        .ok_or(AuthError::NoToken)?;
    info!(email = %credentials.email, "logged in");
    Ok(token)
}

/// Register a new account. Returns the backend's response body.
pub async fn signup(
    client: &reqwest::Client,
    url: &str,
    credentials: &Credentials,
) -> Result<Value, AuthError> {
    let data = post_json(client, url, credentials).await?;
    info!(email = %credentials.email, "signed up");
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_backend;
    use axum::{http::StatusCode, routing::post, Json, Router};

    fn creds() -> Credentials {
        Credentials {
            email: "ada@example.com".into(),
            password: "hunter2".into(),
            name: None,
        }
    }

    #[tokio::test]
    async fn login_reads_access_token() {
        let app = Router::new().route(
            "/login",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "ada@example.com");
                assert!(body.get("name").is_none());
                Json(serde_json::json!({ "access_token": "tok-9", "token_type": "bearer" }))
            }),
        );
        let base = spawn_backend(app).await;

        let token = login(&reqwest::Client::new(), &format!("{base}/login"), &creds())
            .await
            .unwrap();
        assert_eq!(token.as_str(), "tok-9");
    }

    #[tokio::test]
    async fn login_without_token_fails() {
        let app = Router::new().route(
            "/login",
            post(|| async { Json(serde_json::json!({ "access_token": "" })) }),
        );
        let base = spawn_backend(app).await;

        let err = login(&reqwest::Client::new(), &format!("{base}/login"), &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NoToken));
    }

    #[tokio::test]
    async fn rejected_signup_reports_status() {
        let app = Router::new().route(
            "/signup",
            post(|| async { (StatusCode::CONFLICT, "taken") }),
        );
        let base = spawn_backend(app).await;

        let err = signup(&reqwest::Client::new(), &format!("{base}/signup"), &creds())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Rejected { status: 409 }));
        assert_eq!(err.to_string(), "External API error: 409");
    }
}
