mod common;

use actix_web::test;
use serde_json::{json, Value};

use common::{Script, TestApp};

#[actix_rt::test]
async fn test_chat_reply() {
    let test_app = TestApp::new();
    test_app.model.reply("**Lisbon** is lovely in spring.");
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({
            "message": "Where should I go in April?",
            "history": [
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello! Where to?"}
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["response"], "**Lisbon** is lovely in spring.");

    let request = test_app.model.last_request().unwrap();
    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[2].content, "Where should I go in April?");
}

#[actix_rt::test]
async fn test_chat_requires_message() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({"message": "  "}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Message is required");
    assert_eq!(test_app.model.calls(), 0);
}

#[actix_rt::test]
async fn test_chat_upstream_failure() {
    let test_app = TestApp::new();
    test_app.model.push(Script::Unavailable);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/chat")
        .set_json(json!({"message": "Hello"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 500);
}

#[actix_rt::test]
async fn test_inspiration_feed() {
    let test_app = TestApp::new();
    test_app.model.reply(
        &json!({
            "posts": [
                {"title": "Kyoto in Autumn", "category": "Culture", "readTime": "6 min read"},
                {"title": "Street Food of Hanoi", "category": "Food"}
            ],
            "tips": [{"icon": "🎒", "title": "Pack light", "description": "Carry-on only."}]
        })
        .to_string(),
    );
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/inspiration").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["posts"][0]["id"], 1);
    assert_eq!(body["posts"][1]["id"], 2);
    assert_eq!(body["posts"][0]["readTime"], "6 min read");
    assert_eq!(body["tips"][0]["title"], "Pack light");
}

#[actix_rt::test]
async fn test_unparseable_inspiration_is_500_with_details() {
    let test_app = TestApp::new();
    test_app.model.reply("Here are six great posts...");
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/inspiration").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Model output could not be parsed");
    assert!(body["details"].is_string());
}
