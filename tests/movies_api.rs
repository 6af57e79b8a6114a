//! End-to-end tests for the movies API.
//!
//! Each test boots a real server on an ephemeral port with its own seeded
//! store and talks to it over HTTP with reqwest.

use marquee::{CorsGate, MovieStore, Server, routes};
use reqwest::{Client, Method, StatusCode};
use serde_json::{Value, json};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const SEED: &str = r#"[
    {"id":"m1","title":"Superbad","year":2007,"director":"Greg Mottola","duration":113,"rate":7.6,"poster":"https://img.example/superbad.jpg","genre":["Comedy"]},
    {"id":"m2","title":"Heat","year":1995,"director":"Michael Mann","duration":170,"rate":8.3,"poster":"https://img.example/heat.jpg","genre":["Crime","Drama","Thriller"]},
    {"id":"m3","title":"Paddington 2","year":2017,"director":"Paul King","duration":103,"rate":7.8,"poster":"https://img.example/p2.jpg","genre":["Adventure","Comedy"]}
]"#;

struct TestServer {
    base: String,
    client: Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<Result<(), marquee::Error>>>,
}

impl TestServer {
    async fn start() -> Self {
        let store = MovieStore::from_seed_json(SEED).expect("seed should load");
        let state = routes::AppState::new(store, CorsGate::default());

        let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.expect("bind");
        let addr = server.local_addr().expect("local addr");

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.serve_with_shutdown(routes::app(state), async {
            let _ = rx.await;
        }));

        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.expect("server task").expect("server result");
        }
    }
}

fn valid_movie() -> Value {
    json!({
        "title": "Test",
        "year": 2020,
        "director": "D",
        "duration": 100,
        "poster": "http://x.com/p.jpg",
        "genre": ["Drama"]
    })
}

#[tokio::test]
async fn test_list_and_filter() {
    let srv = TestServer::start().await;

    let res = srv.client.get(srv.url("/movies")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    let all: Vec<Value> = res.json().await.unwrap();
    assert_eq!(all.len(), 3);

    let comedies: Vec<Value> = srv
        .client
        .get(srv.url("/movies?genre=comedy"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let titles: Vec<&str> = comedies.iter().map(|m| m["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["Superbad", "Paddington 2"]);

    srv.stop().await;
}

#[tokio::test]
async fn test_create_then_fetch() {
    let srv = TestServer::start().await;

    let res = srv.client.post(srv.url("/movies")).json(&valid_movie()).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    assert_eq!(created["rate"], json!(5));
    assert_eq!(created["director"], "D");
    let id = created["id"].as_str().expect("generated id");
    assert!(uuid_like(id));

    let fetched: Value = srv
        .client
        .get(srv.url(&format!("/movies/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    srv.stop().await;
}

#[tokio::test]
async fn test_create_rejects_incomplete_payload() {
    let srv = TestServer::start().await;

    let res = srv
        .client
        .post(srv.url("/movies"))
        .json(&json!({ "title": "Test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    let fields: Vec<&str> = body["error"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["year", "director", "duration", "poster", "genre"]);

    let all: Vec<Value> = srv.client.get(srv.url("/movies")).send().await.unwrap().json().await.unwrap();
    assert_eq!(all.len(), 3);

    srv.stop().await;
}

#[tokio::test]
async fn test_empty_bodies() {
    let srv = TestServer::start().await;

    let res = srv.client.post(srv.url("/movies")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"].as_array().unwrap().len(), 6);

    let res = srv.client.patch(srv.url("/movies/m1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["title"], "Superbad");

    srv.stop().await;
}

#[tokio::test]
async fn test_get_unknown_id() {
    let srv = TestServer::start().await;

    let res = srv.client.get(srv.url("/movies/does-not-exist")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({ "message": "Movie not found" }));

    srv.stop().await;
}

#[tokio::test]
async fn test_delete_twice() {
    let srv = TestServer::start().await;

    let first = srv.client.delete(srv.url("/movies/m1")).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(first.json::<Value>().await.unwrap(), json!({ "message": "Movie deleted" }));

    let second = srv.client.delete(srv.url("/movies/m1")).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);

    let ids: Vec<Value> = srv
        .client
        .get(srv.url("/movies"))
        .send()
        .await
        .unwrap()
        .json::<Vec<Value>>()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m["id"].clone())
        .collect();
    assert_eq!(ids, [json!("m2"), json!("m3")]);

    srv.stop().await;
}

#[tokio::test]
async fn test_patch_changes_only_given_fields() {
    let srv = TestServer::start().await;

    let before: Value = srv.client.get(srv.url("/movies/m2")).send().await.unwrap().json().await.unwrap();

    let res = srv
        .client
        .patch(srv.url("/movies/m2"))
        .json(&json!({ "year": 2020 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let after: Value = res.json().await.unwrap();

    let mut expected = before.clone();
    expected["year"] = json!(2020);
    assert_eq!(after, expected);

    let res = srv
        .client
        .patch(srv.url("/movies/m2"))
        .json(&json!({ "genre": ["Western"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = srv
        .client
        .patch(srv.url("/movies/missing"))
        .json(&json!({ "rate": 9 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    srv.stop().await;
}

#[tokio::test]
async fn test_preflight_is_empty_200() {
    let srv = TestServer::start().await;

    let res = srv
        .client
        .request(Method::OPTIONS, srv.url("/movies/m1"))
        .header("origin", "http://movies.com")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], "http://movies.com");
    assert_eq!(res.headers()["access-control-allow-methods"], "GET, POST, PATCH, DELETE");
    assert!(res.bytes().await.unwrap().is_empty());

    let res = srv
        .client
        .request(Method::OPTIONS, srv.url("/movies/m1"))
        .header("origin", "http://evil.test")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("access-control-allow-origin").is_none());

    srv.stop().await;
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let srv = TestServer::start().await;

    let res = srv.client.post(srv.url("/movies/m1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv.client.put(srv.url("/movies/m1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    let res = srv.client.head(srv.url("/movies/m1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "application/json");
    assert!(res.bytes().await.unwrap().is_empty());

    let res = srv
        .client
        .request(Method::from_bytes(b"PURGE").unwrap(), srv.url("/movies"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    srv.stop().await;
}

fn uuid_like(id: &str) -> bool {
    id.len() == 36 && id.chars().filter(|c| *c == '-').count() == 4
}
