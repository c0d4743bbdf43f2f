mod common;

use axum::http::{StatusCode, header};

#[tokio::test]
async fn home_page_returns_correct_html() {
    let (router, _state) = common::test_app();

    let response = common::get(&router, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .expect("content type set");
    assert!(content_type.starts_with("text/html"));

    let html = common::body_string(response).await;
    assert!(html.starts_with("<html>"));
    assert!(html.ends_with("</html>"));
    assert!(html.contains("<title>To-Do lists</title>"));
}

#[tokio::test]
async fn home_page_shows_the_new_list_form() {
    let (router, _state) = common::test_app();

    let response = common::get(&router, "/").await;
    let html = common::body_string(response).await;

    assert!(html.contains("action=\"/lists/new\""));
    assert!(html.contains("name=\"item_text\""));
    assert!(html.contains("id=\"id_new_item\""));
}

#[tokio::test]
async fn only_saves_items_when_necessary() {
    let (router, state) = common::test_app();

    common::get(&router, "/").await;

    assert_eq!(state.store().count_items().expect("count works"), 0);
    assert_eq!(state.store().count_lists().expect("count works"), 0);
}
