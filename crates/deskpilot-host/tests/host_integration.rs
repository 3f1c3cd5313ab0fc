//! Caller registry talking to a host service over an in-memory pipe.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::task::JoinHandle;
use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

use deskpilot_channel::{ChannelClient, ChannelError, NativeHostClient, PollOptions, TableConfig};
use deskpilot_core::ProviderRegistry;
use deskpilot_host::{HostService, UnsupportedBackend};
use deskpilot_protocols::{ActionKind, ActionProvider, MessageRole, PlanningContext};
use deskpilot_provider_native::NativeHostProvider;
use deskpilot_provider_openai::OpenAIProvider;
use deskpilot_vault::{CredentialStore, Fingerprint, MemoryStore, Vault};

fn credential_store(passphrase: &str) -> CredentialStore {
    let vault = Arc::new(Vault::new(Fingerprint::with_passphrase(passphrase)));
    CredentialStore::new(vault, Arc::new(MemoryStore::new()))
}

struct Harness {
    client: Arc<ChannelClient>,
    host: JoinHandle<Result<(), ChannelError>>,
}

/// Start a host with an OpenAI planner aimed at `server` and connect a
/// channel client to it.
fn start_host(server: &MockServer) -> Harness {
    let service = HostService::new(
        credential_store("host-side"),
        Arc::new(UnsupportedBackend),
        TableConfig::default(),
    );
    service.register_planner(Arc::new(OpenAIProvider::new().with_base_url(server.uri())));
    let service = Arc::new(service);

    let (caller_io, host_io) = tokio::io::duplex(64 * 1024);
    let (host_read, host_write) = tokio::io::split(host_io);
    let host = tokio::spawn(async move { service.serve(host_read, host_write).await });

    let (caller_read, caller_write) = tokio::io::split(caller_io);
    let transport = Arc::new(NativeHostClient::from_io(caller_read, caller_write));
    let client = Arc::new(ChannelClient::with_options(
        transport,
        PollOptions {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(10),
        },
    ));

    Harness { client, host }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_plan_through_native_host() {
    let server = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path("/chat/completions"))
        .and(matchers::header("authorization", "Bearer sk-host"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            r#"{"actions": [{"action": "click", "params": {"x": 40, "y": 60}}, {"action": "type", "params": {"text": "notes"}}]}"#,
        )))
        .expect(2)
        .mount(&server)
        .await;

    let harness = start_host(&server);

    // The key lives on the host only.
    harness
        .client
        .call(json!({ "action": "store_api_key", "provider": "openai", "api_key": "sk-host" }))
        .await
        .unwrap();

    let registry = ProviderRegistry::new(Arc::new(MemoryStore::new()), credential_store("caller"));
    registry
        .register(Arc::new(NativeHostProvider::new(harness.client.clone(), "openai")))
        .unwrap();
    assert!(registry.set_active("native").await);

    let actions = registry
        .get_actions(PlanningContext::new("open notes and type"))
        .await
        .unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].kind(), ActionKind::Click);
    assert_eq!(actions[1].kind(), ActionKind::Type);

    let history = registry.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, MessageRole::User);
    assert_eq!(history[0].content, "open notes and type");

    registry
        .get_actions(PlanningContext::new("again"))
        .await
        .unwrap();
    assert_eq!(registry.history().len(), 4);

    drop(registry);
    drop(harness.client);
    harness.host.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_host_errors_reach_the_caller() {
    let server = MockServer::start().await;
    let harness = start_host(&server);

    let native = NativeHostProvider::new(harness.client.clone(), "openai");
    assert!(native.status().await.ready());

    // No key stored on the host yet.
    let err = native
        .get_actions(&PlanningContext::new("open notes"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("OpenAI API key not configured"));

    let unknown = NativeHostProvider::new(harness.client.clone(), "gemini");
    let err = unknown
        .get_actions(&PlanningContext::new("open notes"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown provider: gemini"));
}

#[tokio::test]
async fn test_host_status_over_channel() {
    let server = MockServer::start().await;
    let harness = start_host(&server);

    let reply = harness
        .client
        .call(json!({ "action": "get_provider_status" }))
        .await
        .unwrap();
    assert_eq!(reply["providers"]["openai"], json!({ "has_key": false, "type": "cloud" }));

    let reply = harness
        .client
        .call(json!({ "action": "get_capabilities" }))
        .await
        .unwrap();
    assert_eq!(reply["capabilities"]["input_control"], false);
    assert_eq!(reply["capabilities"]["local_llm"], false);

    let err = harness
        .client
        .call(json!({ "action": "capture_screen" }))
        .await
        .unwrap_err();
    assert!(matches!(err, ChannelError::Host(_)));
}
