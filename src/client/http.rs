use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::ErrorBody;
use super::*;
use crate::error::GENERIC_BAD_REQUEST;

impl SessionClient {
    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    pub(super) async fn get_json_at<T: DeserializeOwned>(&self, url: reqwest::Url) -> ApiResult<T> {
        let label = url.path().to_string();
        let req = self.inner.http.get(url);
        self.execute(&label, req).await
    }

    pub(super) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let req = self.inner.http.get(self.url(path));
        self.execute(path, req).await
    }

    pub(super) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let req = self.inner.http.post(self.url(path)).json(body);
        self.execute(path, req).await
    }

    /// The one authenticated request path: attach the cached token, send,
    /// map the status, decode.
    async fn execute<T: DeserializeOwned>(
        &self,
        label: &str,
        req: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let token = self.current_token().await;
        let mut req = req.timeout(self.inner.request_timeout);
        if let Some(token) = &token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.map_err(|err| {
            tracing::debug!("{}: transport failure: {}", label, err);
            ApiError::Transport(err.to_string())
        })?;
        let resp = self.ensure_ok(resp, token.as_deref()).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| ApiError::Decode(format!("parse {}: {}", label, err)))
    }

    /// Map a non-2xx response onto the error taxonomy. A 401 invalidates the
    /// token the request carried before the error is returned.
    pub(super) async fn ensure_ok(
        &self,
        resp: reqwest::Response,
        sent_token: Option<&str>,
    ) -> ApiResult<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_token(sent_token).await;
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        let body = resp.bytes().await.unwrap_or_default();
        let message = error_message(&body);
        if status == StatusCode::BAD_REQUEST {
            return Err(ApiError::BadRequest(
                message.unwrap_or_else(|| GENERIC_BAD_REQUEST.to_string()),
            ));
        }
        Err(ApiError::Server {
            code: status.as_u16(),
            message,
        })
    }
}

/// Server-supplied message from an error body: `message`, else `error`.
pub(super) fn error_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed
        .message
        .or(parsed.error)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
}

/// `{base}/api/dreams/{id}` plus optional trailing segments. The id is
/// escaped as a single path segment.
pub(super) fn dream_url(base: &str, id: &DreamId, tail: &[&str]) -> ApiResult<reqwest::Url> {
    let mut url =
        reqwest::Url::parse(base).map_err(|err| ApiError::Transport(format!("{}: {}", base, err)))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Transport(format!("{} cannot carry a path", base)))?
        .pop_if_empty()
        .extend(["api", "dreams", id.as_str()])
        .extend(tail);
    Ok(url)
}

#[cfg(test)]
#[path = "../tests/client/http_tests.rs"]
mod tests;
