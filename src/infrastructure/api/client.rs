#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::StreamError;

/// Static API credential header attached to every request.
const API_KEY_HEADER: &str = "X-API-KEY";

const HEALTH_PATH: &str = "/qchat-api/v1/health";
const MODELS_PATH: &str = "/qchat-api/v1/ollama/models";
const FILES_PATH: &str = "/qchat-api/v1/files";

const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 5000;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct HealthResponse {
    #[serde(default)]
    status: bool,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelsData {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ModelListResponse {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    data: ModelsData,
}

/// An uploaded document as the files endpoint reports it.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDocument {
    pub id: String,
    pub original_name: String,
    pub filename: String,
    pub size: u64,
    pub upload_date: String,
    pub path: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FilesData {
    #[serde(default)]
    pdfs: Vec<FileDocument>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct FileListResponse {
    #[serde(default)]
    status: bool,
    #[serde(default)]
    data: FilesData,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    status: bool,
}

/// HTTP client for the QChat proxy. Attaches the API credential to every
/// request, plus a bearer token when the identity provider has supplied one.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    api_key: String,
    auth_token: Option<String>,
    health_timeout: String,
}

impl Default for ApiClient {
    fn default() -> ApiClient {
        return ApiClient::new(
            Config::get(ConfigKey::ApiBaseURL),
            Config::get(ConfigKey::ApiKey),
        );
    }
}

impl ApiClient {
    pub fn new(base_url: String, api_key: String) -> ApiClient {
        return ApiClient {
            base_url,
            api_key,
            auth_token: None,
            health_timeout: Config::get(ConfigKey::HealthCheckTimeout),
        };
    }

    pub fn set_auth_token(&mut self, token: &str) {
        self.auth_token = Some(token.to_string());
    }

    pub fn clear_auth_token(&mut self) {
        self.auth_token = None;
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut req = req.header(API_KEY_HEADER, &self.api_key);
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        return req;
    }

    fn url(&self, path: &str) -> String {
        return format!("{base}{path}", base = self.base_url);
    }

    /// Opens a streaming request. Errors here are connection establishment
    /// failures; read failures after this point are the caller's concern.
    pub async fn post_stream<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, StreamError> {
        let res = self
            .authorize(reqwest::Client::new().post(self.url(path)))
            .json(body)
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                return Err(StreamError::Connection {
                    reason: err.to_string(),
                })
            }
        };

        if !res.status().is_success() {
            return Err(StreamError::Connection {
                reason: format!("backend returned status {}", res.status().as_u16()),
            });
        }

        return Ok(res);
    }

    pub async fn post_json<B: Serialize + Sync + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let res = self
            .authorize(reqwest::Client::new().post(self.url(path)))
            .json(body)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                path,
                "request to QChat API failed"
            );
            bail!("request to {path} failed with status {}", res.status().as_u16());
        }

        return Ok(res.json::<T>().await?);
    }

    /// Healthy means a 2xx answer with `status == true` within the timeout.
    /// Timeouts, transport errors, non-2xx and malformed bodies all map to
    /// unhealthy rather than an error.
    pub async fn check_health(&self) -> bool {
        let timeout = self
            .health_timeout
            .parse::<u64>()
            .unwrap_or(DEFAULT_HEALTH_TIMEOUT_MS);

        let res = self
            .authorize(reqwest::Client::new().get(self.url(HEALTH_PATH)))
            .timeout(Duration::from_millis(timeout))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::warn!(error = %err, "health check request failed");
                return false;
            }
        };

        if !res.status().is_success() {
            tracing::warn!(status = res.status().as_u16(), "health check failed");
            return false;
        }

        return match res.json::<HealthResponse>().await {
            Ok(body) => body.status,
            Err(err) => {
                tracing::warn!(error = %err, "health check returned a malformed body");
                false
            }
        };
    }

    pub async fn list_models(&self) -> Result<Vec<String>> {
        let res = self
            .authorize(reqwest::Client::new().get(self.url(MODELS_PATH)))
            .send()
            .await?
            .json::<ModelListResponse>()
            .await?;

        if !res.status {
            bail!("model listing rejected by the backend");
        }

        let mut models: Vec<String> = res
            .data
            .models
            .iter()
            .filter_map(|entry| {
                return entry.name.clone().or_else(|| return entry.model.clone());
            })
            .collect();

        models.sort();

        return Ok(models);
    }

    pub async fn list_files(&self) -> Result<Vec<FileDocument>> {
        let res = self
            .authorize(reqwest::Client::new().get(self.url(FILES_PATH)))
            .send()
            .await?
            .json::<FileListResponse>()
            .await?;

        if !res.status {
            bail!("file listing rejected by the backend");
        }

        return Ok(res.data.pdfs);
    }

    pub async fn delete_file(&self, id: &str) -> Result<bool> {
        let res = self
            .authorize(reqwest::Client::new().delete(self.url(&format!("{FILES_PATH}/{id}"))))
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), id, "file deletion failed");
            bail!("file deletion failed with status {}", res.status().as_u16());
        }

        let body = res.json::<StatusResponse>().await?;
        return Ok(body.status);
    }
}
