//! Push delivery collaborator.
//!
//! Actual delivery (FCM or similar) is an external system; the application
//! only depends on this trait. The shipped implementation logs the send so
//! environments without a push provider behave sensibly.

use async_trait::async_trait;

/// External push delivery collaborator.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Fire-and-forget delivery of one notification to one user.
    async fn send(
        &self,
        user_id: i64,
        title: &str,
        body: &str,
        kind: &str,
        action_url: Option<&str>,
        ref_id: Option<&str>,
    );
}

/// PushSender that records sends in the log stream.
pub struct TracingPushSender;

#[async_trait]
impl PushSender for TracingPushSender {
    async fn send(
        &self,
        user_id: i64,
        title: &str,
        _body: &str,
        kind: &str,
        action_url: Option<&str>,
        ref_id: Option<&str>,
    ) {
        tracing::info!(
            user_id,
            kind,
            title,
            action_url = action_url.unwrap_or(""),
            ref_id = ref_id.unwrap_or(""),
            "push notification dispatched"
        );
    }
}
