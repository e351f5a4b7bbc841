use futures_util::StreamExt;
use reqwest::StatusCode;

use super::http::dream_url;
use super::*;
use crate::stream::{ByteStream, ProgressStream};

impl SessionClient {
    /// Lazily open the progress stream for `id`; nothing is sent until the
    /// stream is first polled.
    pub fn open_progress_stream(&self, id: &DreamId) -> ProgressStream {
        let client = self.clone();
        let id = id.clone();
        ProgressStream::connect(
            async move { client.connect_events(&id).await },
            self.inner.stream_read_timeout,
        )
    }

    async fn connect_events(&self, id: &DreamId) -> ApiResult<ByteStream> {
        let url = dream_url(&self.inner.events_url, id, &["events"])?;
        let token = self.current_token().await;
        let mut req = self
            .inner
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream");
        if let Some(token) = &token {
            req = req.bearer_auth(token);
        }

        let resp = tokio::time::timeout(self.inner.stream_read_timeout, req.send())
            .await
            .map_err(|_| ApiError::Transport("event stream handshake timed out".to_string()))?
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_token(token.as_deref()).await;
            return Err(ApiError::Unauthorized);
        }
        if status != StatusCode::OK {
            return Err(ApiError::InvalidResponse(status.as_u16()));
        }

        Ok(resp
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|err| ApiError::Transport(err.to_string()))
            })
            .boxed())
    }
}
