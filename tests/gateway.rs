use std::borrow::Cow;

use axiom_oauth1::{
    App, AssetLocation, BasicMeasurement, Config, DiscoveryError, Error, Gateway, NewAsset,
    Secrets, AXIOM_MEDIA_TYPE,
};
use futures_util::TryStreamExt;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn access_secrets() -> Secrets<'static, Cow<'static, str>> {
    Secrets::new("johndeere-key", "consumer-secret").token("access-token", "access-secret")
}

fn gateway_for(server: &MockServer) -> Gateway {
    Gateway::new(
        reqwest::Client::new(),
        format!("{}/platform", server.uri()),
        Some(access_secrets()),
    )
}

fn app_for(server: &MockServer, with_token: bool) -> App {
    let api_url = server.uri();
    let config = Config::from_lookup(|name: &str| match name {
        "JOHN_DEERE_API_KEY" => Some("johndeere-key".to_string()),
        "JOHN_DEERE_API_SECRET" => Some("consumer-secret".to_string()),
        "JOHN_DEERE_API_URL" => Some(api_url.clone()),
        "JOHN_DEERE_OAUTH_TOKEN" if with_token => Some("access-token".to_string()),
        "JOHN_DEERE_OAUTH_SECRET" if with_token => Some("access-secret".to_string()),
        _ => None,
    })
    .unwrap();
    App::new(config).unwrap()
}

#[tokio::test]
async fn no_access_token_means_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = app_for(&server, false).gateway();
    assert!(!gateway.is_authenticated());
    assert!(matches!(
        gateway.user("herddogg").await,
        Err(Error::NotAuthenticated)
    ));
    assert!(matches!(
        gateway.asset_types().try_collect::<Vec<_>>().await,
        Err(Error::NotAuthenticated)
    ));
}

#[tokio::test]
async fn get_is_signed_and_versioned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/platform/users/herddogg/organizations"))
        .and(header("accept", AXIOM_MEDIA_TYPE))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": [],
            "total": 1,
            "values": [{ "id": "372446", "name": "Herd Dogg" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = gateway_for(&server)
        .organizations("herddogg")
        .await
        .unwrap();
    assert!(response.is_success());
    let document = response.document().unwrap();
    assert_eq!(document.fields["values"][0]["id"], "372446");
}

#[tokio::test]
async fn usernames_stay_inside_their_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/platform/users/x%3Fy=1%23frag"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accountName": "x" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = gateway_for(&server).user("x?y=1#frag").await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn error_statuses_are_returned_as_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/platform/assets/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let response = gateway_for(&server).asset("missing").await.unwrap();
    assert_eq!(response.status.as_u16(), 404);
    assert_eq!(response.body, "not found");
}

#[tokio::test]
async fn create_asset_reads_the_id_from_location() {
    let server = MockServer::start().await;
    let root = format!("{}/platform", server.uri());
    let asset = NewAsset::sensor("Milking Barn", "North Side of the Barn")
        .contribution_definition(&root, "d0c5");

    Mock::given(method("POST"))
        .and(path("/platform/organizations/372446/assets"))
        .and(header("accept", AXIOM_MEDIA_TYPE))
        .and(header("content-type", AXIOM_MEDIA_TYPE))
        .and(header_exists("authorization"))
        .and(body_json(serde_json::to_value(&asset).unwrap()))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("Location", format!("{}/assets/294121a3", root).as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = gateway_for(&server)
        .create_asset("372446", &asset)
        .await
        .unwrap();
    assert_eq!(created.status.as_u16(), 201);
    assert_eq!(created.asset_id.as_deref(), Some("294121a3"));
}

#[tokio::test]
async fn create_location_posts_a_one_element_array() {
    let server = MockServer::start().await;
    let location = AssetLocation::point(
        36.8177283,
        -119.7375908,
        chrono::Utc::now(),
        vec![BasicMeasurement::new("Checkins", "123", "animals")],
    );

    Mock::given(method("POST"))
        .and(path("/platform/assets/294121a3/locations"))
        .and(body_json(json!([serde_json::to_value(&location).unwrap()])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let response = gateway_for(&server)
        .create_asset_location("294121a3", &location)
        .await
        .unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn asset_catalog_is_walked_page_by_page() {
    let server = MockServer::start().await;
    let root = format!("{}/platform", server.uri());

    Mock::given(method("GET"))
        .and(path("/platform/assetCatalog"))
        .and(query_param("pageOffset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": [{ "rel": "nextPage", "uri": format!("{}/assetCatalog?pageOffset=20", root) }],
            "page": 2
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/platform/assetCatalog"))
        .and(query_param("pageOffset", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": [{ "rel": "self", "uri": format!("{}/assetCatalog?pageOffset=20", root) }],
            "page": 3
        })))
        .expect(1)
        .mount(&server)
        .await;
    // mounted last so the query-specific mocks above take precedence
    Mock::given(method("GET"))
        .and(path("/platform/assetCatalog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": [
                { "rel": "self", "uri": format!("{}/assetCatalog", root) },
                { "rel": "nextPage", "uri": format!("{}/assetCatalog?pageOffset=10", root) }
            ],
            "page": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server);
    let pages: Vec<_> = gateway.asset_types().try_collect().await.unwrap();
    let numbers: Vec<_> = pages.iter().map(|p| p.fields["page"].clone()).collect();
    assert_eq!(numbers, vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn current_user_follows_the_catalog_link() {
    let server = MockServer::start().await;
    let root = format!("{}/platform", server.uri());
    Mock::given(method("GET"))
        .and(path("/platform/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "links": [{ "rel": "currentUser", "uri": format!("{}/users/herddogg", root) }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/platform/users/herddogg"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accountName": "herddogg" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = app_for(&server, true).current_user().await.unwrap();
    assert_eq!(response.document().unwrap().fields["accountName"], "herddogg");
}

#[tokio::test]
async fn catalog_failures_are_discovery_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/platform/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    match app_for(&server, false).catalog().await {
        Err(Error::Discovery(DiscoveryError::Status { status, body })) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn catalog_without_links_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/platform/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 0 })))
        .mount(&server)
        .await;

    assert!(matches!(
        app_for(&server, false).catalog().await,
        Err(Error::Discovery(DiscoveryError::MissingLinks))
    ));
}
