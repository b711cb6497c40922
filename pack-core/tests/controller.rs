use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use pack_core::{
    BeforeHook, ChangeAction, ChangeEvent, ChangeEventSink, ContentMethod, ContentTypeOptions,
    ErrorHook, ErrorKind, HookContext, MemoryStore, PackApp, PackError, ServiceCapabilities,
    TenantContext, TriggerSource,
};
use serde_json::{json, Value};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<ChangeEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ChangeEventSink for RecordingSink {
    fn publish(&self, event: ChangeEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn setup() -> (PackApp, Arc<RecordingSink>) {
    let app = PackApp::new();
    let store = Arc::new(MemoryStore::new());
    app.register_content_type("articles", store.clone());
    app.register_content_type_with(
        "pages",
        store,
        ContentTypeOptions::default().with_capabilities(ServiceCapabilities::read_only()),
    );
    let sink = Arc::new(RecordingSink::default());
    app.on_change(sink.clone());
    (app, sink)
}

fn tenant(id: &str) -> TenantContext {
    TenantContext::for_tenant(id).unwrap()
}

fn kind(err: &anyhow::Error) -> ErrorKind {
    PackError::kind_of(err)
}

fn filters(v: Value) -> pack_core::Filters {
    v.as_object().cloned().unwrap()
}

#[tokio::test]
async fn list_only_returns_the_callers_records() {
    let (app, _) = setup();
    let articles = app.content("articles").unwrap();
    let (a, b) = (tenant("tenant-a"), tenant("tenant-b"));

    articles.create(Some(&a), json!({"title": "A1"})).await.unwrap();
    articles.create(Some(&a), json!({"title": "A2"})).await.unwrap();
    articles.create(Some(&b), json!({"title": "B1"})).await.unwrap();

    let listed = articles.find(Some(&b), Default::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "B1");

    // A caller-supplied tenant filter cannot widen the scope.
    let injected = articles
        .find(Some(&b), filters(json!({"tenant_id": {"$ne": "tenant-b"}})))
        .await
        .unwrap();
    assert_eq!(injected.len(), 1);
    assert_eq!(injected[0]["tenant_id"], "tenant-b");
}

#[tokio::test]
async fn create_attributes_the_record_to_the_caller() {
    let (app, sink) = setup();
    let articles = app.content("articles").unwrap();
    let a = tenant("tenant-a");

    let created = articles
        .create(Some(&a), json!({"title": "X", "slug": "x", "tenant_id": "tenant-b"}))
        .await
        .unwrap();
    assert_eq!(created["tenant_id"], "tenant-a");

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tenant_id.as_str(), "tenant-a");
    assert_eq!(events[0].action, ChangeAction::Create);
    assert_eq!(events[0].content_type, "articles");
    assert_eq!(events[0].entry_slug.as_deref(), Some("x"));
    assert_eq!(events[0].entry_id.as_deref(), created["id"].as_str());
    assert_eq!(events[0].trigger_source, TriggerSource::LifecycleHook);
}

#[tokio::test]
async fn ownership_cannot_be_reassigned_by_update() {
    let (app, _) = setup();
    let articles = app.content("articles").unwrap();
    let a = tenant("tenant-a");

    let created = articles.create(Some(&a), json!({"title": "X"})).await.unwrap();
    let id = created["id"].as_str().unwrap();

    let updated = articles
        .update(Some(&a), id, json!({"title": "Y", "tenant_id": "tenant-b"}))
        .await
        .unwrap();
    assert_eq!(updated["title"], "Y");
    assert_eq!(updated["tenant_id"], "tenant-a");

    let patched = articles
        .patch(Some(&a), id, json!({"tenant_id": "tenant-c"}))
        .await
        .unwrap();
    assert_eq!(patched["tenant_id"], "tenant-a");
}

#[tokio::test]
async fn foreign_records_are_forbidden_and_untouched() {
    let (app, sink) = setup();
    let articles = app.content("articles").unwrap();
    let (a, b) = (tenant("tenant-a"), tenant("tenant-b"));

    let created = articles.create(Some(&a), json!({"title": "X"})).await.unwrap();
    let id = created["id"].as_str().unwrap();
    let before = sink.events().len();

    let err = articles.get(Some(&b), id).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::Forbidden);
    assert_eq!(
        PackError::from_anyhow(&err).unwrap().message,
        "Access denied to this tenant's content"
    );

    let err = articles
        .update(Some(&b), id, json!({"title": "hijacked"}))
        .await
        .unwrap_err();
    assert_eq!(kind(&err), ErrorKind::Forbidden);
    assert_eq!(kind(&articles.remove(Some(&b), id).await.unwrap_err()), ErrorKind::Forbidden);
    assert_eq!(kind(&articles.publish(Some(&b), id).await.unwrap_err()), ErrorKind::Forbidden);

    let still = articles.get(Some(&a), id).await.unwrap();
    assert_eq!(still["title"], "X");
    assert_eq!(sink.events().len(), before);
}

#[tokio::test]
async fn missing_records_are_not_found() {
    let (app, _) = setup();
    let articles = app.content("articles").unwrap();
    let err = articles.get(Some(&tenant("tenant-a")), "nope").await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::NotFound);
    assert_eq!(PackError::from_anyhow(&err).unwrap().message, "Article not found");
}

#[tokio::test]
async fn no_context_is_rejected_for_every_method() {
    let (app, sink) = setup();
    let articles = app.content("articles").unwrap();

    let err = articles.find(None, Default::default()).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::NotAuthenticated);
    assert_eq!(
        PackError::from_anyhow(&err).unwrap().message,
        "Tenant ID not found in token"
    );
    assert_eq!(
        kind(&articles.create(None, json!({"title": "X"})).await.unwrap_err()),
        ErrorKind::NotAuthenticated
    );
    assert_eq!(kind(&articles.get(None, "x").await.unwrap_err()), ErrorKind::NotAuthenticated);
    assert_eq!(kind(&articles.remove(None, "x").await.unwrap_err()), ErrorKind::NotAuthenticated);
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn capabilities_are_checked_first() {
    let (app, _) = setup();
    let pages = app.content("pages").unwrap();
    let err = pages.create(None, json!({"title": "X"})).await.unwrap_err();
    assert_eq!(kind(&err), ErrorKind::MethodNotAllowed);
}

#[tokio::test]
async fn publish_and_unpublish_toggle_published_at() {
    let (app, sink) = setup();
    let articles = app.content("articles").unwrap();
    let a = tenant("tenant-a");

    let created = articles.create(Some(&a), json!({"title": "X"})).await.unwrap();
    let id = created["id"].as_str().unwrap();

    let published = articles.publish(Some(&a), id).await.unwrap();
    assert!(published["published_at"].is_string());

    let draft = articles.unpublish(Some(&a), id).await.unwrap();
    assert!(draft["published_at"].is_null());

    articles.remove(Some(&a), id).await.unwrap();

    let actions: Vec<ChangeAction> = sink.events().iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            ChangeAction::Create,
            ChangeAction::Publish,
            ChangeAction::Unpublish,
            ChangeAction::Delete
        ]
    );
}

#[tokio::test]
async fn non_object_bodies_are_bad_requests() {
    let (app, _) = setup();
    let articles = app.content("articles").unwrap();
    let err = articles
        .create(Some(&tenant("tenant-a")), json!(["not", "an", "object"]))
        .await
        .unwrap_err();
    assert_eq!(kind(&err), ErrorKind::BadRequest);
}

struct SmuggleTenant;

#[async_trait]
impl BeforeHook for SmuggleTenant {
    async fn run(&self, ctx: &mut HookContext) -> Result<()> {
        if let Some(obj) = ctx.data.as_mut().and_then(Value::as_object_mut) {
            obj.insert("tenant_id".into(), json!("tenant-z"));
        }
        Ok(())
    }
}

#[derive(Default)]
struct CountErrors(Mutex<usize>);

#[async_trait]
impl ErrorHook for CountErrors {
    async fn run(&self, ctx: &mut HookContext) -> Result<()> {
        assert!(ctx.error.is_some());
        *self.0.lock().unwrap() += 1;
        Ok(())
    }
}

#[tokio::test]
async fn before_hooks_cannot_override_the_policy() {
    let (app, _) = setup();
    app.content_hooks("articles", |h| {
        h.before(ContentMethod::Create, Arc::new(SmuggleTenant));
    })
    .unwrap();

    let created = app
        .content("articles")
        .unwrap()
        .create(Some(&tenant("tenant-a")), json!({"title": "X"}))
        .await
        .unwrap();
    assert_eq!(created["tenant_id"], "tenant-a");
}

#[tokio::test]
async fn error_hooks_observe_failures_after_context_checks() {
    let (app, _) = setup();
    let counter = Arc::new(CountErrors::default());
    app.hooks(|h| {
        h.error_all(counter.clone());
    });

    let articles = app.content("articles").unwrap();
    let a = tenant("tenant-a");
    let created = articles.create(Some(&a), json!({"title": "X"})).await.unwrap();
    let id = created["id"].as_str().unwrap();

    // Fails in storage, after the tenant check.
    articles
        .find(Some(&a), filters(json!({"title": {"$regex": "X"}})))
        .await
        .unwrap_err();
    assert_eq!(*counter.0.lock().unwrap(), 1);

    // Rejected before hooks are resolved.
    articles.get(None, id).await.unwrap_err();
    assert_eq!(*counter.0.lock().unwrap(), 1);
}

#[tokio::test]
async fn unknown_content_types_are_not_found() {
    let (app, _) = setup();
    let err = app.content("widgets").err().unwrap();
    assert_eq!(kind(&err), ErrorKind::NotFound);
    assert_eq!(app.content_types(), vec!["articles".to_string(), "pages".to_string()]);
    assert!(app.content_hooks("widgets", |_| {}).is_err());
}

#[tokio::test]
async fn create_ignores_a_client_chosen_id() {
    let (app, _) = setup();
    let articles = app.content("articles").unwrap();
    let (a, b) = (tenant("tenant-a"), tenant("tenant-b"));

    let secret = articles
        .create(Some(&a), json!({"title": "A secret"}))
        .await
        .unwrap();
    let id = secret["id"].as_str().unwrap();

    let other = articles
        .create(Some(&b), json!({"id": id, "title": "mine now"}))
        .await
        .unwrap();
    assert_ne!(other["id"], secret["id"]);
    assert_eq!(other["tenant_id"], "tenant-b");

    let still = articles.get(Some(&a), id).await.unwrap();
    assert_eq!(still["title"], "A secret");
    assert_eq!(still["tenant_id"], "tenant-a");
}

/// Tries to point a call at another record through everything a hook can
/// still write.
struct Retarget {
    victim: String,
}

#[async_trait]
impl BeforeHook for Retarget {
    async fn run(&self, ctx: &mut HookContext) -> Result<()> {
        assert_eq!(ctx.tenant().tenant_id.as_str(), "tenant-b");
        assert_eq!(
            ctx.existing().and_then(|r| r["tenant_id"].as_str()),
            Some("tenant-b")
        );
        assert_ne!(ctx.id(), Some(self.victim.as_str()));

        ctx.filters.insert("id".into(), json!(self.victim));
        ctx.data = Some(json!({"id": self.victim}));
        Ok(())
    }
}

#[tokio::test]
async fn hooks_cannot_move_a_call_to_an_unchecked_record() {
    let (app, _) = setup();
    let articles = app.content("articles").unwrap();
    let (a, b) = (tenant("tenant-a"), tenant("tenant-b"));

    let victim = articles.create(Some(&a), json!({"title": "A"})).await.unwrap();
    let victim_id = victim["id"].as_str().unwrap().to_string();
    let own = articles.create(Some(&b), json!({"title": "B"})).await.unwrap();
    let own_id = own["id"].as_str().unwrap();

    app.content_hooks("articles", |h| {
        let hook = Arc::new(Retarget {
            victim: victim_id.clone(),
        });
        h.before(ContentMethod::Remove, hook.clone());
        h.before(ContentMethod::Get, hook);
    })
    .unwrap();

    let fetched = articles.get(Some(&b), own_id).await.unwrap();
    assert_eq!(fetched["title"], "B");

    let removed = articles.remove(Some(&b), own_id).await.unwrap();
    assert_eq!(removed["id"], own_id);
    assert_eq!(removed["tenant_id"], "tenant-b");

    let left = articles.find(Some(&a), pack_core::Filters::new()).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0]["id"], victim_id.as_str());
    assert_eq!(left[0]["title"], "A");
}
