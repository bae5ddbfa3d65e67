use httpmock::prelude::*;
use rapview::{api::ApiError, lookup::lookup, Config};

mod common;
use common::*;

#[tokio::test]
async fn full_lookup() {
    let server = MockServer::start_async().await;
    let user = mock_user(&server).await;
    let status = mock_status(&server).await;
    let avatar = mock_avatar(&server).await;
    let collectibles = mock_collectibles(&server, sample_items()).await;

    let app = app(config(&server));
    let result = lookup(&app, USER_ID).await;

    user.assert_async().await;
    status.assert_async().await;
    avatar.assert_async().await;
    collectibles.assert_async().await;

    let profile = result.profile.unwrap();
    assert_eq!(profile.display_name, "Builderman");
    assert_eq!(profile.handle, "@builderman");
    assert_eq!(profile.description, "Owner of <everything>");
    assert_eq!(profile.status.as_deref(), Some("Trading limiteds"));
    assert_eq!(
        profile.avatar_url,
        Some(format!("{}/images/avatars/1.png", server.base_url()))
    );
    assert_eq!(profile.profile_link, "https://qnet.zip/users/1/profile");

    let summary = result.collectibles.unwrap();
    assert_eq!(summary.total_count, 4);
    assert_eq!(summary.total_rap, 125000 * 2 + 3500000);
    assert_eq!(summary.groups.len(), 3);
    assert_eq!(summary.groups[0].item.asset_id, Some(1365767));
    assert_eq!(summary.groups[0].quantity, 2);
    assert_eq!(summary.groups[2].item.recent_average_price, 0);
}

#[tokio::test]
async fn missing_profile_fields_fall_back() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/apisite/users/v1/users/1");
            then.status(200)
                .json_body(serde_json::json!({ "id": 1, "displayName": "" }));
        })
        .await;
    mock_status(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/apisite/thumbnails/v1/users/avatar");
            then.status(200).json_body(serde_json::json!({ "data": [] }));
        })
        .await;
    mock_collectibles(&server, serde_json::json!([])).await;

    let app = app(config(&server));
    let result = lookup(&app, USER_ID).await;

    let profile = result.profile.unwrap();
    assert_eq!(profile.display_name, "Unknown");
    assert_eq!(profile.handle, "@1");
    assert_eq!(profile.description, "");
    assert_eq!(profile.avatar_url, None);

    assert!(result.collectibles.unwrap().is_empty());
}

#[tokio::test]
async fn failed_status_is_not_fatal() {
    let server = MockServer::start_async().await;
    mock_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/apisite/users/v1/users/1/status");
            then.status(500);
        })
        .await;
    mock_avatar(&server).await;
    mock_collectibles(&server, sample_items()).await;

    let app = app(config(&server));
    let result = lookup(&app, USER_ID).await;

    let profile = result.profile.unwrap();
    assert_eq!(profile.display_name, "Builderman");
    assert_eq!(profile.status, None);
}

#[tokio::test]
async fn sections_fail_independently() {
    let server = MockServer::start_async().await;
    mock_user(&server).await;
    mock_status(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/apisite/thumbnails/v1/users/avatar");
            then.status(200).body("not json");
        })
        .await;
    mock_collectibles(&server, sample_items()).await;

    let app = app(config(&server));
    let result = lookup(&app, USER_ID).await;

    assert!(matches!(result.profile, Err(ApiError::Decode(_))));
    assert_eq!(result.collectibles.unwrap().total_count, 4);
}

#[tokio::test]
async fn private_inventory() {
    let server = MockServer::start_async().await;
    mock_user(&server).await;
    mock_status(&server).await;
    mock_avatar(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/apisite/inventory/v1/users/1/assets/collectibles");
            then.status(403).json_body(serde_json::json!({
                "errors": [ { "code": 1, "message": "You don't have permission to view this inventory" } ]
            }));
        })
        .await;

    let app = app(config(&server));
    let result = lookup(&app, USER_ID).await;

    assert!(result.profile.is_ok());
    match result.collectibles {
        Err(ApiError::Status(status)) => assert_eq!(status, reqwest::StatusCode::FORBIDDEN),
        other => panic!("Expected a 403, got {:?}", other),
    };
}

fn first_page(req: &HttpMockRequest) -> bool {
    !req.query_params
        .as_ref()
        .map(|params| params.iter().any(|(key, _)| key == "cursor"))
        .unwrap_or(false)
}

#[tokio::test]
async fn follows_page_cursor() {
    let server = MockServer::start_async().await;

    let page_one = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/apisite/inventory/v1/users/1/assets/collectibles")
                .matches(first_page);
            then.status(200).json_body(serde_json::json!({
                "previousPageCursor": null,
                "nextPageCursor": "page-2",
                "data": [
                    { "assetId": 1, "name": "Dominus", "recentAveragePrice": 1000 },
                    { "assetId": 2, "name": "Fedora", "recentAveragePrice": 50 }
                ]
            }));
        })
        .await;
    let page_two = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/apisite/inventory/v1/users/1/assets/collectibles")
                .query_param("cursor", "page-2");
            then.status(200).json_body(serde_json::json!({
                "previousPageCursor": "page-1",
                "nextPageCursor": null,
                "data": [
                    { "assetId": 1, "name": "Dominus", "recentAveragePrice": 1000 }
                ]
            }));
        })
        .await;

    let app = app(config(&server));
    let items = app.client.load_collectibles(USER_ID).await.unwrap();

    page_one.assert_hits_async(1).await;
    page_two.assert_hits_async(1).await;
    assert_eq!(items.len(), 3);

    let summary = rapview::collectibles::summarize(items);
    assert_eq!(summary.total_rap, 2050);
    assert_eq!(summary.groups[0].quantity, 2);
}

#[tokio::test]
async fn stops_after_max_pages() {
    let server = MockServer::start_async().await;

    let endless = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/apisite/inventory/v1/users/1/assets/collectibles");
            then.status(200).json_body(serde_json::json!({
                "nextPageCursor": "again",
                "data": [ { "assetId": 1, "name": "Dominus", "recentAveragePrice": 1000 } ]
            }));
        })
        .await;

    let app = app(Config {
        max_pages: 3,
        ..config(&server)
    });
    let items = app.client.load_collectibles(USER_ID).await.unwrap();

    endless.assert_hits_async(3).await;
    assert_eq!(items.len(), 3);
}

#[tokio::test]
async fn requests_through_relay() {
    let server = MockServer::start_async().await;

    let upstream = format!("{}/users/v1/users/1", server.url("/apisite"));
    let relayed = server
        .mock_async(|when, then| {
            when.method(GET).path("/raw").query_param("url", &upstream);
            then.status(200).json_body(serde_json::json!({
                "id": 1,
                "name": "builderman",
                "displayName": "Builderman"
            }));
        })
        .await;

    let app = app(Config {
        proxy: Some(format!("{}?url=", server.url("/raw"))),
        ..config(&server)
    });
    let user = app.client.load_user(USER_ID).await.unwrap();

    relayed.assert_async().await;
    assert_eq!(user.display_name.as_deref(), Some("Builderman"));
}
