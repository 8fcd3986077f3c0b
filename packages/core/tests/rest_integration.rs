use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hive_core::{Hive, RestHoneycomb};
use hive_pollen::ApiErrorKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Store {
    id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<JsonValue>,
}

fn store(id: u64) -> Store {
    Store {
        id,
        updated: None,
        data: None,
    }
}

async fn mount_store_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}, {"id": 3}])),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "data": ["serverOtherData1", "serverOtherData2"]
        })))
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/2"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"id": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "updated": true})))
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 3}])))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!({"id": 10, "data": "customData"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 10, "data": "customData"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_rest_server_round_trip() {
    let server = MockServer::start().await;
    mount_store_api(&server).await;

    let hive = Hive::builder()
        .register(
            "store",
            RestHoneycomb::<Store>::new("id", vec![], &server.uri()).unwrap(),
        )
        .build()
        .unwrap();
    let rest = hive.get::<RestHoneycomb<Store>>("store").unwrap();

    let all = rest.all().await.unwrap();
    assert_eq!(all, vec![store(1), store(2), store(3)]);
    assert_eq!(*rest.get_state(), all);

    rest.get(1).await.unwrap();
    let state = rest.get_state();
    assert_eq!(state.len(), 3);
    assert_eq!(
        state[0],
        Store {
            id: 1,
            updated: None,
            data: Some(json!(["serverOtherData1", "serverOtherData2"])),
        }
    );

    rest.update(&store(2)).await.unwrap();
    let updated = rest.get_state().iter().find(|s| s.id == 2).cloned();
    assert_eq!(updated.and_then(|s| s.updated), Some(true));

    let response = rest.delete(2).await.unwrap();
    assert_eq!(response, json!([{"id": 1}, {"id": 3}]));
    assert!(rest.get_state().iter().all(|s| s.id != 2));

    let created = rest
        .create(&json!({"id": 10, "data": "customData"}))
        .await
        .unwrap();
    assert_eq!(created.data, Some(json!("customData")));
    assert_eq!(rest.get_state().last(), Some(&created));
    assert_eq!(rest.get_state().len(), 3);
}

#[tokio::test]
async fn test_set_endpoint_moves_requests() {
    let old = MockServer::start().await;
    let new = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/items/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 5}])))
        .expect(1)
        .mount(&new)
        .await;

    let rest = RestHoneycomb::<Store>::new("id", vec![], &format!("{}/api/items", old.uri())).unwrap();
    rest.set_endpoint(&format!("{}/api/v2/items", new.uri()))
        .unwrap();
    assert_eq!(
        rest.pollen().base_url().as_str(),
        format!("{}/api/v2/items", new.uri())
    );

    let items = rest.all().await.unwrap();
    assert_eq!(items, vec![store(5)]);
    assert!(old.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_keeps_state() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/1"))
        .respond_with(ResponseTemplate::new(423).set_body_json(json!({"reason": "locked"})))
        .mount(&server)
        .await;

    let rest = RestHoneycomb::new("id", vec![store(1)], &server.uri()).unwrap();
    let err = rest.delete(1).await.unwrap_err();

    assert_eq!(err.api_kind(), Some(ApiErrorKind::Locked));
    assert_eq!(*rest.get_state(), vec![store(1)]);
}

#[tokio::test]
async fn test_auth_header_is_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let rest = RestHoneycomb::<Store>::new("id", vec![store(1)], &server.uri()).unwrap();
    rest.set_header("Authorization", Some("Bearer abc")).unwrap();

    let items = rest.all().await.unwrap();
    assert!(items.is_empty());
    assert!(rest.get_state().is_empty());
}
