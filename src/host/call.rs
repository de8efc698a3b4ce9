use crate::error::HostError;
use serde_json::Value;
use tokio::sync::oneshot;

pub type CallResult = Result<Value, HostError>;

#[derive(Debug, Clone, PartialEq)]
pub enum CallStatus {
    Pending,
    Ready(CallResult),
}

/// A host round-trip in flight (`callTool`, `sendFollowUpMessage`).
///
/// Polling never blocks, so a frame can check on the call and move on. There is
/// no timeout: a call may stay pending forever. A host that goes away without
/// answering resolves to `HostError::Dropped`.
#[derive(Debug)]
pub struct PendingCall {
    rx: oneshot::Receiver<CallResult>,
}

/// Host side of a `PendingCall`.
#[derive(Debug)]
pub struct CallResolver {
    tx: oneshot::Sender<CallResult>,
}

impl PendingCall {
    pub fn channel() -> (CallResolver, PendingCall) {
        let (tx, rx) = oneshot::channel();
        (CallResolver { tx }, PendingCall { rx })
    }

    #[cfg(test)]
    pub fn unavailable(action: &'static str) -> Self {
        let (resolver, call) = Self::channel();
        resolver.resolve(Err(HostError::Unavailable(action)));
        call
    }

    /// Yields `Ready` once the host answered. Polling again after that reports
    /// `Dropped`, so callers should stop tracking the call on `Ready`.
    pub fn poll(&mut self) -> CallStatus {
        match self.rx.try_recv() {
            Ok(result) => CallStatus::Ready(result),
            Err(oneshot::error::TryRecvError::Empty) => CallStatus::Pending,
            Err(oneshot::error::TryRecvError::Closed) => CallStatus::Ready(Err(HostError::Dropped)),
        }
    }

    #[cfg(test)]
    pub async fn wait(self) -> CallResult {
        self.rx.await.unwrap_or(Err(HostError::Dropped))
    }
}

impl CallResolver {
    pub fn resolve(self, result: CallResult) {
        let _ = self.tx.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn poll_reports_pending_until_resolved() {
        let (resolver, mut call) = PendingCall::channel();
        assert_eq!(call.poll(), CallStatus::Pending);
        assert_eq!(call.poll(), CallStatus::Pending);

        resolver.resolve(Ok(json!({ "ok": true })));
        assert_eq!(call.poll(), CallStatus::Ready(Ok(json!({ "ok": true }))));
    }

    #[test]
    fn dropped_resolver_resolves_to_dropped() {
        let (resolver, mut call) = PendingCall::channel();
        drop(resolver);
        assert_eq!(call.poll(), CallStatus::Ready(Err(HostError::Dropped)));
    }

    #[test]
    fn unavailable_call_is_ready_immediately() {
        let mut call = PendingCall::unavailable("callTool");
        assert_eq!(
            call.poll(),
            CallStatus::Ready(Err(HostError::Unavailable("callTool")))
        );
    }
}
