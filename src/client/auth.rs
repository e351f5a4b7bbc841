use super::types::{LoginRequest, RegisterRequest};
use super::*;

impl SessionClient {
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let session: Session = self
            .post_json("/api/auth/login", &LoginRequest { email, password })
            .await?;
        self.replace_token(Some(session.token.clone())).await;
        tracing::info!("logged in as {}", session.user.username);
        Ok(session)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> ApiResult<Session> {
        let session: Session = self
            .post_json(
                "/api/auth/register",
                &RegisterRequest {
                    username,
                    email,
                    password,
                },
            )
            .await?;
        self.replace_token(Some(session.token.clone())).await;
        tracing::info!("registered {}", session.user.username);
        Ok(session)
    }

    pub async fn fetch_session(&self) -> ApiResult<Session> {
        self.get_json("/api/session").await
    }

    /// Forget the token locally and in the store. Best-effort; never fails.
    pub async fn logout(&self) {
        self.replace_token(None).await;
        tracing::info!("logged out");
    }
}
