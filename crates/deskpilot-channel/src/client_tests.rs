use super::*;
use parking_lot::Mutex;
use std::time::Duration;

type Handler = Box<dyn Fn(&Value, usize) -> Value + Send + Sync>;

/// Answers each message with `handler(message, polls_so_far)`.
struct ScriptedTransport {
    handler: Handler,
    sent: Mutex<Vec<Value>>,
}

impl ScriptedTransport {
    fn new(handler: impl Fn(&Value, usize) -> Value + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn actions_sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .map(|m| m["action"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn polls(&self) -> usize {
        self.actions_sent().iter().filter(|a| *a == "poll").count()
    }
}

#[async_trait]
impl HostTransport for ScriptedTransport {
    async fn exchange(&self, message: Value) -> Result<Value, ChannelError> {
        let polls = self
            .sent
            .lock()
            .iter()
            .filter(|m| m["action"] == "poll")
            .count();
        let reply = (self.handler)(&message, polls);
        self.sent.lock().push(message);
        Ok(reply)
    }
}

fn pending(id: &str) -> Value {
    json!({"success": true, "request_id": id, "status": "pending"})
}

#[tokio::test]
async fn test_submit_message_shape() {
    let transport = ScriptedTransport::new(|_, _| json!({"success": true, "request_id": "ab12cd34"}));
    let client = ChannelClient::new(transport.clone());

    let context = PlanningContext::new("open notepad").with_screenshot("iVBOR");
    let id = client.submit("ollama", &context).await.unwrap();
    assert_eq!(id, "ab12cd34");

    let sent = transport.sent.lock()[0].clone();
    assert_eq!(sent["action"], "get_actions");
    assert_eq!(sent["provider"], "ollama");
    assert_eq!(sent["user_request"], "open notepad");
    assert_eq!(sent["screenshot"], "iVBOR");
    assert!(sent.get("ui_tree").is_none());
}

#[tokio::test]
async fn test_host_failure_is_host_error() {
    let transport = ScriptedTransport::new(|_, _| {
        json!({"success": false, "error": "Unknown provider: nope"})
    });
    let client = ChannelClient::new(transport);
    let err = client
        .submit("nope", &PlanningContext::new("x"))
        .await
        .unwrap_err();
    assert_eq!(err, ChannelError::Host("Unknown provider: nope".to_string()));
}

#[tokio::test]
async fn test_submit_without_request_id() {
    let transport = ScriptedTransport::new(|_, _| json!({"success": true}));
    let client = ChannelClient::new(transport);
    let err = client.submit("ollama", &PlanningContext::new("x")).await.unwrap_err();
    assert!(matches!(err, ChannelError::Protocol(_)));
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_complete_returns_on_terminal() {
    let transport = ScriptedTransport::new(|msg, polls| {
        let id = msg["request_id"].as_str().unwrap_or_default();
        if polls < 2 {
            pending(id)
        } else {
            json!({
                "success": true,
                "request_id": id,
                "status": "complete",
                "actions": [{"action": "click", "params": {"x": 1, "y": 2}}]
            })
        }
    });
    let client = ChannelClient::new(transport.clone());

    let started = Instant::now();
    let actions = client.poll_until_complete("ab12cd34").await.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(transport.polls(), 3);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_complete_error_status() {
    let transport = ScriptedTransport::new(|msg, _| {
        json!({
            "success": true,
            "request_id": msg["request_id"],
            "status": "error",
            "error": "Ollama error: connection refused. Is Ollama running?"
        })
    });
    let client = ChannelClient::new(transport.clone());

    let err = client.poll_until_complete("r1").await.unwrap_err();
    assert!(matches!(err, ChannelError::Host(ref m) if m.contains("Ollama")));
    assert_eq!(transport.polls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_complete_not_found() {
    let transport = ScriptedTransport::new(|msg, _| {
        json!({"success": true, "request_id": msg["request_id"], "status": "not_found"})
    });
    let client = ChannelClient::new(transport);
    let err = client.poll_until_complete("gone").await.unwrap_err();
    assert_eq!(err, ChannelError::NotFound("gone".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_poll_until_complete_cancelled() {
    let transport = ScriptedTransport::new(|msg, _| {
        json!({"success": true, "request_id": msg["request_id"], "status": "cancelled"})
    });
    let client = ChannelClient::new(transport);
    let err = client.poll_until_complete("r1").await.unwrap_err();
    assert_eq!(err, ChannelError::Cancelled("r1".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_cancels_request() {
    let transport = ScriptedTransport::new(|msg, _| {
        let id = msg["request_id"].as_str().unwrap_or_default();
        if msg["action"] == "cancel" {
            json!({"success": true, "request_id": id, "status": "cancelled"})
        } else {
            pending(id)
        }
    });
    let client = ChannelClient::with_options(
        transport.clone(),
        PollOptions {
            interval: Duration::from_millis(500),
            timeout: Duration::from_millis(2000),
        },
    );

    let err = client.poll_until_complete("slow0001").await.unwrap_err();
    match err {
        ChannelError::Timeout {
            request_id,
            waited_ms,
        } => {
            assert_eq!(request_id, "slow0001");
            assert!(waited_ms >= 2000);
        }
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(transport.actions_sent().last().map(String::as_str), Some("cancel"));
    assert_eq!(transport.polls(), 5);
}

#[tokio::test]
async fn test_cancel_reply() {
    let transport = ScriptedTransport::new(|msg, _| {
        json!({"success": true, "request_id": msg["request_id"], "status": "complete"})
    });
    let client = ChannelClient::new(transport);
    assert_eq!(client.cancel("done").await.unwrap(), RequestStatus::Complete);
}

#[tokio::test(start_paused = true)]
async fn test_request_actions() {
    let transport = ScriptedTransport::new(|msg, _| match msg["action"].as_str() {
        Some("get_actions") => json!({"success": true, "request_id": "r2"}),
        _ => json!({
            "success": true,
            "request_id": "r2",
            "status": "complete",
            "actions": [{"action": "wait", "params": {"ms": 5}}]
        }),
    });
    let client = ChannelClient::new(transport.clone());
    let actions = client
        .request_actions("native", &PlanningContext::new("wait"))
        .await
        .unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(transport.actions_sent(), vec!["get_actions", "poll"]);
}
