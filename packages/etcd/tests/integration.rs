use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kvtree_core::{build_tree, list, Error as CoreError, RecordReader, RecordWriter};
use kvtree_etcd::types::encode;
use kvtree_etcd::{EtcdClient, EtcdConfig, Error};

fn wire_kv(key: &str, value: &str, revision: i64) -> serde_json::Value {
    json!({
        "key": encode(key.as_bytes()),
        "create_revision": revision.to_string(),
        "mod_revision": revision.to_string(),
        "version": "1",
        "value": encode(value.as_bytes()),
    })
}

fn client_for(endpoints: &str) -> EtcdClient {
    EtcdClient::new(&EtcdConfig::from_endpoints(endpoints)).unwrap()
}

async fn mount_range(server: &MockServer, prefix: &str, range_end: &str, kvs: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/v3/kv/range"))
        .and(body_json(json!({
            "key": encode(prefix.as_bytes()),
            "range_end": encode(range_end.as_bytes()),
            "serializable": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": {"revision": "12"},
            "kvs": kvs,
            "count": "2",
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_range_lists_prefix() {
    let server = MockServer::start().await;
    mount_range(
        &server,
        "/a",
        "/b",
        json!([wire_kv("/a", "v1", 3), wire_kv("/a/b", "v2", 4)]),
    )
    .await;

    let uri = server.uri();
    let records = tokio::task::spawn_blocking(move || client_for(&uri).range("/a").unwrap())
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key, "/a");
    assert_eq!(records[0].value, "v1");
    assert_eq!(records[1].key, "/a/b");
    assert_eq!(records[1].mod_revision, 4);
}

#[tokio::test]
async fn test_empty_range_has_no_kvs() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/kv/range"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": {"revision": "12"}
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let records = tokio::task::spawn_blocking(move || client_for(&uri).range("/none").unwrap())
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_build_tree_through_gateway() {
    let server = MockServer::start().await;
    mount_range(
        &server,
        "/",
        "0",
        json!([
            wire_kv("/a", "v1", 3),
            wire_kv("/a/b", "v2", 4),
            wire_kv("/c/d/e", "v3", 5),
        ]),
    )
    .await;

    let uri = server.uri();
    let tree = tokio::task::spawn_blocking(move || {
        let mut client = client_for(&uri);
        build_tree(&mut client, "/").unwrap()
    })
    .await
    .unwrap();

    assert_eq!(tree.len(), 3);
    let a = tree.get("/a").unwrap();
    assert_eq!(a.record().unwrap().value, "v1");
    assert_eq!(a.child("/a/b").unwrap().record().unwrap().value, "v2");
    assert!(tree.get("/c/d").unwrap().record().is_none());
}

#[tokio::test]
async fn test_put_encodes_key_and_value() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/kv/put"))
        .and(body_json(json!({
            "key": encode(b"/a/b"),
            "value": encode(b"hello"),
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": {"revision": "13"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || client_for(&uri).put("/a/b", "hello"))
        .await
        .unwrap();

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_delete_reports_deleted_count() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/kv/deleterange"))
        .and(body_json(json!({"key": encode(b"/a")})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": {"revision": "14"},
            "deleted": "1",
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/kv/deleterange"))
        .and(body_json(json!({"key": encode(b"/missing")})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": {"revision": "14"}
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (existing, missing) = tokio::task::spawn_blocking(move || {
        let mut client = client_for(&uri);
        (client.delete("/a").unwrap(), client.delete("/missing").unwrap())
    })
    .await
    .unwrap();

    assert!(existing);
    assert!(!missing);
}

#[tokio::test]
async fn test_error_status_is_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/kv/range"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "etcdserver: request timed out",
            "code": 14,
        })))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (direct, through_core) = tokio::task::spawn_blocking(move || {
        let mut client = client_for(&uri);
        let direct = client.range("/").unwrap_err();
        let through_core = list(&mut client, "/").unwrap_err();
        (direct, through_core)
    })
    .await
    .unwrap();

    assert!(matches!(direct, Error::Status { status: 503, .. }));
    assert!(matches!(through_core, CoreError::Fetch(_)));
    assert!(through_core.to_string().contains("request timed out"));
}

#[tokio::test]
async fn test_failed_write_is_store_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/kv/put"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || client_for(&uri).put("/a", "v").unwrap_err())
        .await
        .unwrap();

    assert!(matches!(err, CoreError::Store(_)));
}

#[tokio::test]
async fn test_malformed_response_is_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/kv/range"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let err = tokio::task::spawn_blocking(move || {
        let mut client = client_for(&uri);
        client.list("/").unwrap_err()
    })
    .await
    .unwrap();

    assert!(matches!(err, CoreError::Fetch(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_fails_over() {
    let server = MockServer::start().await;
    mount_range(&server, "/a", "/b", json!([wire_kv("/a", "v1", 3)])).await;

    // Nothing listens on port 1, so the connection is refused.
    let endpoints = format!("127.0.0.1:1,{}", server.uri());
    let records = tokio::task::spawn_blocking(move || client_for(&endpoints).range("/a").unwrap())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key, "/a");
}

#[tokio::test]
async fn test_error_status_does_not_fail_over() {
    let failing = MockServer::start().await;
    let healthy = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/kv/range"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&failing)
        .await;

    Mock::given(method("POST"))
        .and(path("/v3/kv/range"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&healthy)
        .await;

    let endpoints = format!("{},{}", failing.uri(), healthy.uri());
    let result = tokio::task::spawn_blocking(move || client_for(&endpoints).range("/"))
        .await
        .unwrap();

    assert!(matches!(result, Err(Error::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_all_endpoints_unreachable() {
    let result = tokio::task::spawn_blocking(|| {
        let mut client = client_for("127.0.0.1:1");
        client.list("/")
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(CoreError::Fetch(_))));
}
