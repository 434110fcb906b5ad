//! HTTP client for a running Rollbook server
//!
//! The `list` display client reads students through `GET /students` with
//! this client rather than touching the database file.

use crate::server::routes::ErrorResponse;
use crate::student::Student;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct StudentClient {
    base_url: String,
    http: reqwest::Client,
}

impl StudentClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5287`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every student from the List endpoint
    pub async fn list_students(&self) -> Result<Vec<Student>> {
        let url = format!("{}/students", self.base_url);
        tracing::debug!("GET {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => status.to_string(),
            };
            return Err(Error::Remote { status: status.as_u16(), message });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_drops_trailing_slash() {
        let client = StudentClient::new("http://127.0.0.1:5287/");
        assert_eq!(client.base_url(), "http://127.0.0.1:5287");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        // port 9 (discard) is not served in test environments
        let client = StudentClient::new("http://127.0.0.1:9");
        let err = client.list_students().await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
