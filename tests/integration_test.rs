//! End-to-end tests driving the whole bridge through the in-process engine.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Map, Value as Json, json};

use revenant::{
    Browser, BrowserConfig, BridgeError, LocalDom, LocalElement, LocalLauncher, NODE_MARKER,
    NativeNode, OpRegistry, ScriptValue,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn bag(value: Json) -> Map<String, Json> {
    value.as_object().cloned().expect("bag must be an object")
}

fn demo_dom() -> Arc<LocalDom> {
    let dom = Arc::new(LocalDom::new());
    dom.insert("#greeting", Arc::new(LocalElement::new().with_text("Hello, world")));
    dom
}

#[tokio::test]
async fn test_read_inner_text() {
    init_tracing();
    let browser = Browser::new(
        BrowserConfig::default(),
        Box::new(LocalLauncher::new(demo_dom())),
    );

    let matched = browser.text("#greeting", None).await.expect("text resolves");
    assert_eq!(matched, Some("Hello, world".to_string()));

    let missing = browser.text("#absent", None).await.expect("text resolves");
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_fill_and_press_button() {
    init_tracing();
    let dom = Arc::new(LocalDom::new());
    let input = Arc::new(LocalElement::new());
    let button = Arc::new(LocalElement::new());
    dom.insert("input#name", input.clone());
    dom.insert("#submit", button.clone());

    let browser = Browser::new(BrowserConfig::default(), Box::new(LocalLauncher::new(dom)));

    let result = browser.fill("input#name", "Ada").await.expect("fill resolves");
    assert_eq!(result["special"], NODE_MARKER);
    assert_eq!(input.value(), Some("Ada".to_string()));

    browser.press_button("#submit").await.expect("click resolves");
    assert_eq!(button.clicks(), 1);
}

#[tokio::test]
async fn test_check_uncheck_choose() {
    init_tracing();
    let dom = Arc::new(LocalDom::new());
    let checkbox = Arc::new(LocalElement::new());
    dom.insert("#box", checkbox.clone());

    let browser = Browser::new(BrowserConfig::default(), Box::new(LocalLauncher::new(dom)));

    browser.choose("#box").await.expect("choose resolves");
    assert_eq!(checkbox.attribute("checked"), Some("checked".to_string()));

    browser.uncheck("#box").await.expect("uncheck resolves");
    assert_eq!(checkbox.attribute("checked"), None);
}

#[tokio::test]
async fn test_full_document_html() {
    init_tracing();
    let dom = demo_dom();
    dom.set_document_html("<!DOCTYPE html>\n<html><body><p>hi</p></body></html>");
    let browser = Browser::new(BrowserConfig::default(), Box::new(LocalLauncher::new(dom)));

    let markup = browser.html(None, None).await.expect("html resolves");
    assert!(markup.is_some_and(|m| m.starts_with("<!DOCTYPE html>")));
}

#[tokio::test]
async fn test_execute_gated_by_page_load() {
    init_tracing();
    let launcher = LocalLauncher::new(demo_dom()).with_load_latency(Duration::from_millis(200));
    let browser = Arc::new(Browser::new(BrowserConfig::default(), Box::new(launcher)));

    // Establish the session while the page is idle.
    browser.page().await.expect("page resolves");

    let start = Instant::now();
    let visiting = browser.clone();
    let visit = tokio::spawn(async move { visiting.visit("/next").await });

    // Let the navigation begin, then issue an operation mid-load.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(browser.is_loading());

    let text = browser.text("#greeting", None).await.expect("text resolves");
    assert_eq!(text, Some("Hello, world".to_string()));

    // The operation must not have dispatched before the load finished.
    assert!(start.elapsed() >= Duration::from_millis(190));
    assert!(!browser.is_loading());

    visit.await.expect("task joins").expect("visit resolves");
}

#[tokio::test]
async fn test_token_round_trip_as_context_argument() {
    init_tracing();
    let dom = Arc::new(LocalDom::new());
    let child = Arc::new(LocalElement::new().with_text("inner"));
    dom.insert("#outer", Arc::new(LocalElement::new().with_child("p", child)));

    let browser = Browser::new(BrowserConfig::default(), Box::new(LocalLauncher::new(dom)));

    let token = browser.query("#outer", None).await.expect("query resolves");
    assert_eq!(token["special"], NODE_MARKER);

    // The child is only reachable through the token's live handle.
    let result = browser
        .execute("text", bag(json!({ "selector": "p", "context": token })))
        .await
        .expect("text resolves");
    assert_eq!(result, json!("inner"));
}

#[tokio::test]
async fn test_navigation_invalidates_tokens() {
    init_tracing();
    let dom = Arc::new(LocalDom::new());
    let child = Arc::new(LocalElement::new().with_text("inner"));
    dom.insert("#outer", Arc::new(LocalElement::new().with_child("p", child)));

    let browser = Browser::new(BrowserConfig::default(), Box::new(LocalLauncher::new(dom)));

    let token = browser.query("#outer", None).await.expect("query resolves");

    // Navigation recreates the rendering context; the stale token resolves
    // to null and the scoped child is no longer reachable.
    browser.visit("/reload").await.expect("visit resolves");
    let result = browser
        .execute("text", bag(json!({ "selector": "p", "context": token })))
        .await
        .expect("text resolves");
    assert_eq!(result, Json::Null);
}

#[tokio::test]
async fn test_reserved_namespace_never_reaches_operations() {
    init_tracing();
    let mut registry = OpRegistry::empty();
    registry.register("arg_keys", |_, args| {
        Ok(ScriptValue::Array(
            args.keys().cloned().map(ScriptValue::String).collect(),
        ))
    });
    let launcher = LocalLauncher::new(demo_dom()).with_registry(registry);
    let browser = Browser::new(BrowserConfig::default(), Box::new(launcher));

    let result = browser
        .execute(
            "arg_keys",
            bag(json!({ "plain": 1, "__revenant_reserved_smuggled": 2 })),
        )
        .await
        .expect("dispatch resolves");
    assert_eq!(result, json!(["plain"]));
}

#[tokio::test]
async fn test_xpath_and_query_all_return_token_arrays() {
    init_tracing();
    let dom = Arc::new(LocalDom::new());
    let first = Arc::new(LocalElement::new());
    let second = Arc::new(LocalElement::new());
    dom.insert("li", first.clone());
    dom.insert_xpath("//li", vec![first, second]);

    let browser = Browser::new(BrowserConfig::default(), Box::new(LocalLauncher::new(dom)));

    let tokens = browser.xpath("//li", None).await.expect("xpath resolves");
    let tokens = tokens.as_array().expect("token array");
    assert_eq!(tokens.len(), 2);
    assert!(tokens.iter().all(|t| t["special"] == NODE_MARKER));

    let tokens = browser.query_all("li", None).await.expect("query_all resolves");
    assert_eq!(tokens.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_query_all_scoped_to_context() {
    init_tracing();
    let dom = Arc::new(LocalDom::new());
    let item = Arc::new(LocalElement::new());
    dom.insert("li", Arc::new(LocalElement::new()));
    dom.insert("#list", Arc::new(LocalElement::new().with_child("li", item)));

    let browser = Browser::new(BrowserConfig::default(), Box::new(LocalLauncher::new(dom)));

    let tokens = browser.query_all("li", Some("#list")).await.expect("query_all resolves");
    assert_eq!(tokens.as_array().map(Vec::len), Some(1));

    // An unresolvable context yields an empty result set.
    let tokens = browser.query_all("li", Some("#absent")).await.expect("query_all resolves");
    assert_eq!(tokens.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_click_link() {
    init_tracing();
    let dom = Arc::new(LocalDom::new());
    let link = Arc::new(LocalElement::new());
    dom.insert("a#next", link.clone());

    let browser = Browser::new(BrowserConfig::default(), Box::new(LocalLauncher::new(dom)));

    let token = browser.click_link("a#next").await.expect("click resolves");
    assert_eq!(token["special"], NODE_MARKER);
    assert_eq!(link.clicks(), 1);
    assert!(!browser.is_loading());

    let missing = browser.click_link("a#gone").await.expect("click resolves");
    assert_eq!(missing, Json::Null);
}

#[tokio::test]
async fn test_wait_until() {
    init_tracing();
    let dom = demo_dom();
    let browser = Arc::new(Browser::new(
        BrowserConfig::default(),
        Box::new(LocalLauncher::new(dom.clone())),
    ));

    let late_dom = dom.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        late_dom.insert("#later", Arc::new(LocalElement::new().with_text("done")));
    });

    browser
        .wait_until(
            "query",
            bag(json!({ "selector": "#later" })),
            Duration::from_secs(2),
        )
        .await
        .expect("element appears within the deadline");

    let result = browser
        .wait_until(
            "query",
            bag(json!({ "selector": "#never" })),
            Duration::from_millis(150),
        )
        .await;
    assert!(matches!(result, Err(BridgeError::Timeout(_))));
}
