#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc};

use httpmock::{prelude::*, Mock};
use rapview::{App, Config};

pub const USER_ID: &str = "1";

pub fn config(server: &MockServer) -> Config {
    Config {
        api_base: server.url("/apisite"),
        asset_base: server.base_url(),
        profile_base: "https://qnet.zip".to_string(),
        timeout_secs: 5,
        ..Config::default()
    }
}

pub fn app(config: Config) -> App {
    App::new(config, prometheus::Registry::new()).unwrap()
}

/// Starts the real server on an ephemeral port, it runs until the test ends.
pub fn start(app: App) -> (SocketAddr, Arc<App>) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Arc::new(app);
    tokio::spawn(rapview::server::serve(
        listener,
        app.clone(),
        std::future::pending(),
    ));

    (addr, app)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub async fn mock_user(server: &MockServer) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/apisite/users/v1/users/1");
            then.status(200).json_body(serde_json::json!({
                "id": 1,
                "name": "builderman",
                "displayName": "Builderman",
                "description": "Owner of <everything>"
            }));
        })
        .await
}

pub async fn mock_status(server: &MockServer) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/apisite/users/v1/users/1/status");
            then.status(200)
                .json_body(serde_json::json!({ "status": "Trading limiteds" }));
        })
        .await
}

pub async fn mock_avatar(server: &MockServer) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/apisite/thumbnails/v1/users/avatar")
                .query_param("userIds", "1")
                .query_param("size", "420x420")
                .query_param("format", "png");
            then.status(200).json_body(serde_json::json!({
                "data": [
                    { "targetId": 1, "state": "Completed", "imageUrl": "/images/avatars/1.png" }
                ]
            }));
        })
        .await
}

pub async fn mock_collectibles(server: &MockServer, items: serde_json::Value) -> Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/apisite/inventory/v1/users/1/assets/collectibles")
                .query_param("limit", "100");
            then.status(200).json_body(serde_json::json!({
                "previousPageCursor": null,
                "nextPageCursor": null,
                "data": items
            }));
        })
        .await
}

pub fn sample_items() -> serde_json::Value {
    serde_json::json!([
        { "userAssetId": 100, "assetId": 1365767, "name": "Valkyrie Helm", "recentAveragePrice": 125000 },
        { "userAssetId": 101, "assetId": 1031429, "name": "Domino Crown", "recentAveragePrice": 3500000 },
        { "userAssetId": 102, "assetId": 1365767, "name": "Valkyrie Helm", "recentAveragePrice": 125000 },
        { "userAssetId": 103, "assetId": 20573078, "name": "Shaggy", "recentAveragePrice": null }
    ])
}
