mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn can_save_a_post_request() {
    let (router, state) = common::test_app();

    common::post_form(&router, "/lists/new", "item_text=A+new+list+item").await;

    assert_eq!(state.store().count_lists().expect("count works"), 1);
    assert_eq!(state.store().count_items().expect("count works"), 1);
    let new_item = state
        .store()
        .first_item()
        .expect("lookup works")
        .expect("item saved");
    assert_eq!(new_item.text, "A new list item");
}

#[tokio::test]
async fn redirects_after_post() {
    let (router, state) = common::test_app();

    let response = common::post_form(&router, "/lists/new", "item_text=A+new+list+item").await;

    let new_list = state
        .store()
        .first_list()
        .expect("lookup works")
        .expect("list saved");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        common::location_header(&response),
        format!("/lists/{}/", new_list.id)
    );
}

#[tokio::test]
async fn first_item_belongs_to_the_new_list() {
    let (router, state) = common::test_app();

    common::post_form(&router, "/lists/new", "item_text=A+new+list+item").await;

    let list = state
        .store()
        .first_list()
        .expect("lookup works")
        .expect("list saved");
    let item = state
        .store()
        .first_item()
        .expect("lookup works")
        .expect("item saved");
    assert_eq!(item.list_id, list.id);
}

#[tokio::test]
async fn missing_item_text_is_accepted_as_empty() {
    let (router, state) = common::test_app();

    let response = common::post_form(&router, "/lists/new", "").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let item = state
        .store()
        .first_item()
        .expect("lookup works")
        .expect("item saved");
    assert_eq!(item.text, "");
}

#[tokio::test]
async fn empty_item_text_is_accepted() {
    let (router, state) = common::test_app();

    let response = common::post_form(&router, "/lists/new", "item_text=").await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(state.store().count_items().expect("count works"), 1);
}
