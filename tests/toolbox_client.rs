//! Toolbox catalog and invocation tests against a mock HTTP server.

mod common;

use common::{hotel_manifest, MockServerFixture};
use genai_toolbridge::bridge::adapt;
use genai_toolbridge::types::ExternalTool;
use genai_toolbridge::Error;
use serde_json::json;

#[tokio::test]
async fn test_load_toolset() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_get_json("/api/toolset/hotel", 200, &hotel_manifest())
        .await;

    let tools = fixture.toolbox_client().load_toolset("hotel").await.unwrap();
    mock.assert_async().await;

    assert_eq!(tools.len(), 1);
    let tool = &tools[0];
    assert_eq!(tool.name(), "search-hotels-by-name");
    assert_eq!(tool.parameters().len(), 1);

    let decl = adapt(tool);
    let params = decl.parameters.expect("schema adapts");
    assert_eq!(params.required_fields().into_iter().collect::<Vec<_>>(), vec!["country"]);
}

#[tokio::test]
async fn test_load_default_toolset() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_get_json("/api/toolset/", 200, &hotel_manifest()).await;
    let tools = fixture.toolbox_client().load_toolset("").await.unwrap();
    mock.assert_async().await;
    assert_eq!(tools.len(), 1);
}

#[tokio::test]
async fn test_load_single_tool() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_get_json("/api/tool/search-hotels-by-name", 200, &hotel_manifest())
        .await;
    let tool = fixture
        .toolbox_client()
        .load_tool("search-hotels-by-name")
        .await
        .unwrap();
    assert_eq!(tool.description(), "Search for hotels based on country.");

    let missing = fixture.toolbox_client().load_tool("book-hotel").await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_missing_toolset_is_catalog_error() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_get_json("/api/toolset/nope", 404, r#"{"error":"toolset \"nope\" does not exist"}"#)
        .await;
    let err = fixture.toolbox_client().load_toolset("nope").await.unwrap_err();
    match err {
        Error::Catalog { message } => assert!(message.contains("does not exist")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_invoke_returns_result() {
    let fixture = MockServerFixture::new().await;
    let _manifest = fixture
        .mock_get_json("/api/toolset/hotel", 200, &hotel_manifest())
        .await;
    let invoke = fixture
        .mock_post_json(
            "/api/tool/search-hotels-by-name/invoke",
            json!({ "country": "USA" }),
            200,
            r#"{"result":"[{name: Hotel A, country: USA}]"}"#,
        )
        .await;

    let tools = fixture.toolbox_client().load_toolset("hotel").await.unwrap();
    let args = json!({ "country": "USA" }).as_object().cloned().unwrap();
    let result = tools[0].invoke(&args).await.unwrap();

    invoke.assert_async().await;
    assert_eq!(result.to_string(), "[{name: Hotel A, country: USA}]");
}

#[tokio::test]
async fn test_invoke_error_body() {
    let fixture = MockServerFixture::new().await;
    let _manifest = fixture
        .mock_get_json("/api/toolset/hotel", 200, &hotel_manifest())
        .await;
    let _invoke = fixture
        .mock_post_json(
            "/api/tool/search-hotels-by-name/invoke",
            json!({ "country": 7 }),
            400,
            r#"{"error":"parameter country must be a string"}"#,
        )
        .await;

    let tools = fixture.toolbox_client().load_toolset("hotel").await.unwrap();
    let args = json!({ "country": 7 }).as_object().cloned().unwrap();
    match tools[0].invoke(&args).await.unwrap_err() {
        Error::ToolInvocation { tool, message } => {
            assert_eq!(tool, "search-hotels-by-name");
            assert!(message.contains("must be a string"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_client_header_forwarded() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/api/toolset/hotel")
            .match_header("authorization", "Bearer token-1")
            .with_status(200)
            .with_body(hotel_manifest())
            .create_async()
            .await
    };

    let client = fixture
        .toolbox_client()
        .with_client_header("authorization", "Bearer token-1")
        .unwrap();
    client.load_toolset("hotel").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_names_are_percent_encoded_in_paths() {
    let fixture = MockServerFixture::new().await;
    let manifest = json!({
        "serverVersion": "0.7.0",
        "tools": {
            "hotels/search v2": {
                "description": "Search hotels.",
                "parameters": [{ "name": "country", "type": "string", "description": "Country." }]
            }
        }
    })
    .to_string();
    let load = fixture
        .mock_get_json("/api/toolset/team%20a", 200, &manifest)
        .await;
    let invoke = fixture
        .mock_post_json(
            "/api/tool/hotels%2Fsearch%20v2/invoke",
            json!({ "country": "USA" }),
            200,
            r#"{"result":"ok"}"#,
        )
        .await;

    let tools = fixture.toolbox_client().load_toolset("team a").await.unwrap();
    assert_eq!(tools[0].name(), "hotels/search v2");
    let args = json!({ "country": "USA" }).as_object().cloned().unwrap();
    let result = tools[0].invoke(&args).await.unwrap();

    load.assert_async().await;
    invoke.assert_async().await;
    assert_eq!(result.to_string(), "ok");
}
