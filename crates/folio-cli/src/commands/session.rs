use serde_json::json;

use crate::client::{AppContext, CliResult};
use crate::output::render_outcome;

pub(crate) async fn handle_verify(ctx: &AppContext) -> CliResult<()> {
    let user_id = ctx.remote.verify_session().await?;
    render_outcome(
        ctx.output,
        &format!("session valid for user {user_id}"),
        &json!({"valid": true, "user_id": user_id}),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    use crate::commands::test_support::context_for;

    #[tokio::test]
    async fn verify_reports_session_failures() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/auth/verify");
            then.status(401)
                .json_body(json!({"detail": {"error": "timeout"}}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let err = handle_verify(&context_for(&server, dir.path().to_path_buf()))
            .await
            .expect_err("expired");
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn verify_accepts_matching_user() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/auth/verify")
                .header("authorization", "Bearer tok");
            then.status(200).json_body(json!({"valid": true, "user_id": 1}));
        });
        let dir = tempfile::tempdir().expect("tempdir");
        handle_verify(&context_for(&server, dir.path().to_path_buf()))
            .await
            .expect("valid");
        mock.assert();
    }
}
