use super::http::dream_url;
use super::types::HealthResponse;
use super::*;

impl SessionClient {
    pub async fn list_dreams(&self) -> ApiResult<Vec<Dream>> {
        self.get_json("/api/dreams").await
    }

    pub async fn submit_dream(&self, submission: &DreamSubmission) -> ApiResult<Dream> {
        self.post_json("/api/dreams", submission).await
    }

    pub async fn poll_dream(&self, id: &DreamId) -> ApiResult<Dream> {
        self.get_json_at(dream_url(&self.inner.base_url, id, &[])?)
            .await
    }

    pub async fn health(&self) -> ApiResult<HealthStatus> {
        let resp: HealthResponse = self.get_json("/api/health").await?;
        Ok(HealthStatus {
            analysis_ok: resp.deepseek.trim().eq_ignore_ascii_case("ok"),
            modeling_ok: resp.tripo.trim().eq_ignore_ascii_case("ok"),
        })
    }
}
