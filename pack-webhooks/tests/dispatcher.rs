use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use pack_core::{ChangeAction, ChangeEvent, TenantId, TriggerSource};
use pack_webhooks::{
    ChangeEventDispatcher, DispatchOutcome, DispatcherOptions, EventFilterMode, WebhookRegistry,
};
use serde_json::{json, Value};

type Received = Arc<Mutex<Vec<(HeaderMap, Value)>>>;

async fn receive(State(received): State<Received>, headers: HeaderMap, Json(body): Json<Value>) -> StatusCode {
    received.lock().unwrap().push((headers, body));
    StatusCode::OK
}

async fn fail() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(2)).await;
    StatusCode::OK
}

/// Receiver on an ephemeral port; returns its base url.
async fn receiver() -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/hook", post(receive))
        .route("/fail", post(fail))
        .route("/slow", post(slow))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), received)
}

fn tenant(s: &str) -> TenantId {
    TenantId::new(s).unwrap()
}

fn event(tenant_id: &str, content_type: &str, action: ChangeAction) -> ChangeEvent {
    let entry = json!({"id": "42", "slug": "hello-world"});
    ChangeEvent::new(
        tenant(tenant_id),
        content_type,
        action,
        Some(&entry),
        TriggerSource::LifecycleHook,
    )
}

fn dispatcher(endpoints: Vec<(&str, String)>, options: DispatcherOptions) -> ChangeEventDispatcher {
    let map: HashMap<TenantId, String> = endpoints
        .into_iter()
        .map(|(t, url)| (tenant(t), url))
        .collect();
    let registry = WebhookRegistry::new(map).with_content_types(vec!["articles".into()]);
    ChangeEventDispatcher::new(Arc::new(registry), options).unwrap()
}

#[tokio::test]
async fn delivers_one_post_with_event_headers() {
    let (base, received) = receiver().await;
    let d = dispatcher(vec![("tenant-a", format!("{base}/hook"))], DispatcherOptions::default());

    let outcome = d.deliver(&event("tenant-a", "articles", ChangeAction::Publish)).await;
    assert_eq!(outcome, DispatchOutcome::Delivered { status: 200 });

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (headers, body) = &received[0];
    assert_eq!(headers["x-pack-event"], "entry.publish");
    assert_eq!(headers["x-pack-tenant"], "tenant-a");
    assert!(headers["content-type"].to_str().unwrap().starts_with("application/json"));
    assert_eq!(body["tenant_id"], "tenant-a");
    assert_eq!(body["action"], "publish");
    assert_eq!(body["entry_id"], "42");
    assert_eq!(body["entry_slug"], "hello-world");
}

#[tokio::test]
async fn unconfigured_tenants_are_dropped() {
    let (base, received) = receiver().await;
    let d = dispatcher(vec![("tenant-a", format!("{base}/hook"))], DispatcherOptions::default());

    let outcome = d.deliver(&event("tenant-b", "articles", ChangeAction::Create)).await;
    assert_eq!(outcome, DispatchOutcome::Dropped);
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn enforce_mode_filters_unlisted_content_types() {
    let (base, received) = receiver().await;
    let options = DispatcherOptions {
        filter_mode: EventFilterMode::Enforce,
        ..DispatcherOptions::default()
    };
    let d = dispatcher(vec![("tenant-a", format!("{base}/hook"))], options);

    let outcome = d.deliver(&event("tenant-a", "pages", ChangeAction::Create)).await;
    assert_eq!(outcome, DispatchOutcome::Filtered);
    assert!(received.lock().unwrap().is_empty());

    // Advisory mode sends the same event.
    let d = dispatcher(vec![("tenant-a", format!("{base}/hook"))], DispatcherOptions::default());
    let outcome = d.deliver(&event("tenant-a", "pages", ChangeAction::Create)).await;
    assert_eq!(outcome, DispatchOutcome::Delivered { status: 200 });
}

#[tokio::test]
async fn failures_are_reported_not_raised() {
    let (base, _) = receiver().await;

    let d = dispatcher(vec![("tenant-a", format!("{base}/fail"))], DispatcherOptions::default());
    let outcome = d.deliver(&event("tenant-a", "articles", ChangeAction::Delete)).await;
    assert!(matches!(outcome, DispatchOutcome::Failed { ref reason } if reason.contains("500")));

    let options = DispatcherOptions {
        timeout: Duration::from_millis(100),
        ..DispatcherOptions::default()
    };
    let d = dispatcher(vec![("tenant-a", format!("{base}/slow"))], options);
    let outcome = d.deliver(&event("tenant-a", "articles", ChangeAction::Update)).await;
    assert!(matches!(outcome, DispatchOutcome::Failed { .. }));
}

#[tokio::test]
async fn dispatch_runs_in_the_background() {
    let (base, received) = receiver().await;
    let d = dispatcher(vec![("tenant-a", format!("{base}/hook"))], DispatcherOptions::default());

    let handle = d
        .dispatch(event("tenant-a", "articles", ChangeAction::Create))
        .expect("runtime is available");
    assert_eq!(handle.await.unwrap(), DispatchOutcome::Delivered { status: 200 });
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[test]
fn dispatch_outside_a_runtime_drops_the_event() {
    let d = dispatcher(vec![("tenant-a", "http://127.0.0.1:9/hook".to_string())], DispatcherOptions::default());
    assert!(d.dispatch(event("tenant-a", "articles", ChangeAction::Create)).is_none());
}
