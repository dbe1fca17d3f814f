//! Backend endpoint configuration.
//!
//! Every endpoint can be set by flag or environment variable; a `.env` file
//! in the working directory is loaded before arguments are parsed.

use clap::Args;

use crate::backend::HttpBackend;

pub const DEFAULT_CHAT_URL: &str = "http://localhost:8000/api/v1/chat/send";
pub const DEFAULT_UPLOAD_URL: &str = "http://localhost:8000/api/v1/upload-pdf/sessions";
pub const DEFAULT_LOGIN_URL: &str = "http://localhost:8000/api/v1/auth/login";
pub const DEFAULT_SIGNUP_URL: &str = "http://localhost:8000/api/v1/auth/signup";

/// URLs of the external backend.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Chat message endpoint
    #[arg(long, env = "EXTERNAL_CHAT_URL", default_value = DEFAULT_CHAT_URL, global = true)]
    pub chat_url: String,

    /// Base URL for PDF uploads (`/<session>/upload-pdf` is appended)
    #[arg(long, env = "EXTERNAL_PDF_UPLOAD_URL", default_value = DEFAULT_UPLOAD_URL, global = true)]
    pub upload_url: String,

    /// Login endpoint
    #[arg(long, env = "EXTERNAL_LOGIN_URL", default_value = DEFAULT_LOGIN_URL, global = true)]
    pub login_url: String,

    /// Signup endpoint
    #[arg(long, env = "EXTERNAL_SIGNUP_URL", default_value = DEFAULT_SIGNUP_URL, global = true)]
    pub signup_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            chat_url: DEFAULT_CHAT_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            signup_url: DEFAULT_SIGNUP_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Build the HTTP chat backend for these endpoints.
    pub fn backend(&self, client: reqwest::Client) -> HttpBackend {
        HttpBackend::with_client(client, &self.chat_url, &self.upload_url)
    }
}
