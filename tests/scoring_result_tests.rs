// tests/scoring_result_tests.rs

mod common;

use common::{TestApp, spawn_app};
use serde_json::{Value, json};

async fn add(app: &TestApp, token: &str, body: Value) -> i64 {
    let response = app.post("/api/scoring_result/add", Some(token), body).await;
    assert_eq!(response["code"], 0, "add failed: {}", response);
    response["data"].as_i64().expect("new id")
}

async fn get_vo(app: &TestApp, id: i64) -> Value {
    app.get(&format!("/api/scoring_result/get/vo?id={}", id), None).await
}

#[tokio::test]
async fn added_tags_come_back_from_get_vo() {
    let app = spawn_app().await;
    let (user_id, token) = app.new_user().await;

    let id = add(
        &app,
        &token,
        json!({
            "result_name": "Extrovert",
            "result_desc": "Energised by people",
            "result_picture": "https://example.com/e.png",
            "result_prop": ["A", "B"],
            "result_score_range": 10,
            "app_id": 7
        }),
    )
    .await;

    let body = get_vo(&app, id).await;
    assert_eq!(body["code"], 0);
    let vo = &body["data"];
    assert_eq!(vo["id"], id);
    assert_eq!(vo["result_prop"], json!(["A", "B"]));
    assert_eq!(vo["result_name"], "Extrovert");
    assert_eq!(vo["result_desc"], "Energised by people");
    assert_eq!(vo["result_picture"], "https://example.com/e.png");
    assert_eq!(vo["result_score_range"], 10);
    assert_eq!(vo["app_id"], 7);
    assert_eq!(vo["user_id"], user_id);
    assert_eq!(vo["user"]["id"], user_id);
}

#[tokio::test]
async fn add_validates_required_fields() {
    let app = spawn_app().await;
    let (_, token) = app.new_user().await;

    let missing_name = app
        .post("/api/scoring_result/add", Some(&token), json!({ "app_id": 1 }))
        .await;
    assert_eq!(missing_name["code"], 40000);

    let missing_app = app
        .post("/api/scoring_result/add", Some(&token), json!({ "result_name": "x" }))
        .await;
    assert_eq!(missing_app["code"], 40000);

    let bad_picture = app
        .post(
            "/api/scoring_result/add",
            Some(&token),
            json!({ "result_name": "x", "app_id": 1, "result_picture": "not a url" }),
        )
        .await;
    assert_eq!(bad_picture["code"], 40000);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM scoring_results")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "rejected adds must not write");
}

#[tokio::test]
async fn get_vo_rejects_bad_ids() {
    let app = spawn_app().await;

    assert_eq!(app.get("/api/scoring_result/get/vo", None).await["code"], 40000);
    assert_eq!(get_vo(&app, 0).await["code"], 40000);
    assert_eq!(get_vo(&app, 999).await["code"], 40400);
}

#[tokio::test]
async fn delete_is_owner_or_admin_only() {
    let app = spawn_app().await;
    let (_, owner) = app.new_user().await;
    let (_, stranger) = app.new_user().await;
    let (_, admin) = app.admin().await;

    let first = add(&app, &owner, json!({ "result_name": "one", "app_id": 1 })).await;
    let second = add(&app, &owner, json!({ "result_name": "two", "app_id": 1 })).await;

    let body = app
        .post("/api/scoring_result/delete", Some(&stranger), json!({ "id": first }))
        .await;
    assert_eq!(body["code"], 40101);
    assert_eq!(get_vo(&app, first).await["code"], 0);

    let body = app
        .post("/api/scoring_result/delete", Some(&owner), json!({ "id": first }))
        .await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"], true);
    assert_eq!(get_vo(&app, first).await["code"], 40400);

    let body = app
        .post("/api/scoring_result/delete", Some(&admin), json!({ "id": second }))
        .await;
    assert_eq!(body["code"], 0);

    let body = app
        .post("/api/scoring_result/delete", Some(&owner), json!({ "id": 424242 }))
        .await;
    assert_eq!(body["code"], 40400);

    let body = app
        .post("/api/scoring_result/delete", Some(&owner), json!({ "id": 0 }))
        .await;
    assert_eq!(body["code"], 40000);
}

#[tokio::test]
async fn non_admin_update_changes_nothing() {
    let app = spawn_app().await;
    let (_, owner) = app.new_user().await;
    let id = add(&app, &owner, json!({ "result_name": "before", "result_prop": ["A"], "app_id": 1 })).await;
    let before = get_vo(&app, id).await;

    let body = app
        .post(
            "/api/scoring_result/update",
            Some(&owner),
            json!({ "id": id, "result_name": "after", "result_prop": ["Z"] }),
        )
        .await;
    assert_ne!(body["code"], 0);
    assert_eq!(body["code"], 40101);

    assert_eq!(get_vo(&app, id).await, before);
}

#[tokio::test]
async fn admin_update_can_reassign_owner() {
    let app = spawn_app().await;
    let (_, owner) = app.new_user().await;
    let (new_owner_id, _) = app.new_user().await;
    let (_, admin) = app.admin().await;
    let id = add(&app, &owner, json!({ "result_name": "before", "app_id": 1 })).await;

    let body = app
        .post(
            "/api/scoring_result/update",
            Some(&admin),
            json!({ "id": id, "result_prop": ["X", "Y"], "user_id": new_owner_id }),
        )
        .await;
    assert_eq!(body["code"], 0, "{}", body);

    let vo = get_vo(&app, id).await;
    assert_eq!(vo["data"]["result_name"], "before");
    assert_eq!(vo["data"]["result_prop"], json!(["X", "Y"]));
    assert_eq!(vo["data"]["user_id"], new_owner_id);

    let body = app
        .post(
            "/api/scoring_result/update",
            Some(&admin),
            json!({ "id": id, "user_id": 987654 }),
        )
        .await;
    assert_eq!(body["code"], 40000);

    let body = app
        .post("/api/scoring_result/update", Some(&admin), json!({ "id": 987654 }))
        .await;
    assert_eq!(body["code"], 40400);
}

#[tokio::test]
async fn edit_is_owner_or_admin_and_partial() {
    let app = spawn_app().await;
    let (_, owner) = app.new_user().await;
    let (_, stranger) = app.new_user().await;
    let id = add(
        &app,
        &owner,
        json!({ "result_name": "name", "result_desc": "desc", "result_prop": ["A"], "app_id": 1 }),
    )
    .await;

    let body = app
        .post(
            "/api/scoring_result/edit",
            Some(&stranger),
            json!({ "id": id, "result_name": "hijacked" }),
        )
        .await;
    assert_eq!(body["code"], 40101);

    let body = app
        .post(
            "/api/scoring_result/edit",
            Some(&owner),
            json!({ "id": id, "result_name": "renamed" }),
        )
        .await;
    assert_eq!(body["code"], 0);

    let vo = get_vo(&app, id).await;
    assert_eq!(vo["data"]["result_name"], "renamed");
    assert_eq!(vo["data"]["result_desc"], "desc");
    assert_eq!(vo["data"]["result_prop"], json!(["A"]));

    let body = app
        .post(
            "/api/scoring_result/edit",
            Some(&owner),
            json!({ "id": id, "result_prop": ["ok", "  "] }),
        )
        .await;
    assert_eq!(body["code"], 40000);

    let body = app
        .post("/api/scoring_result/edit", Some(&owner), json!({ "result_name": "no id" }))
        .await;
    assert_eq!(body["code"], 40000);
}

#[tokio::test]
async fn caller_facing_pages_are_capped_at_twenty() {
    let app = spawn_app().await;
    let (_, token) = app.new_user().await;
    let (_, admin) = app.admin().await;
    add(&app, &token, json!({ "result_name": "x", "app_id": 1 })).await;

    for path in ["/api/scoring_result/list/page/vo", "/api/scoring_result/my/list/page/vo"] {
        let body = app
            .post(path, Some(&token), json!({ "current": 1, "page_size": 21 }))
            .await;
        assert_eq!(body["code"], 40000, "{}", path);

        let body = app
            .post(path, Some(&token), json!({ "current": 1, "page_size": 20 }))
            .await;
        assert_eq!(body["code"], 0, "{}", path);
    }

    let body = app
        .post(
            "/api/scoring_result/list/page",
            Some(&admin),
            json!({ "current": 1, "page_size": 100 }),
        )
        .await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["total"], 1);
    assert!(body["data"]["records"][0]["result_prop"].is_string());
}

#[tokio::test]
async fn admin_listing_is_admin_only() {
    let app = spawn_app().await;
    let (_, token) = app.new_user().await;

    let body = app
        .post("/api/scoring_result/list/page", Some(&token), json!({ "page_size": 5 }))
        .await;
    assert_eq!(body["code"], 40101);
}

#[tokio::test]
async fn my_listing_ignores_owner_override() {
    let app = spawn_app().await;
    let (me, my_token) = app.new_user().await;
    let (other, other_token) = app.new_user().await;

    add(&app, &my_token, json!({ "result_name": "mine", "app_id": 1 })).await;
    add(&app, &other_token, json!({ "result_name": "theirs", "app_id": 1 })).await;
    add(&app, &other_token, json!({ "result_name": "theirs too", "app_id": 1 })).await;

    let body = app
        .post(
            "/api/scoring_result/my/list/page/vo",
            Some(&my_token),
            json!({ "user_id": other, "page_size": 20 }),
        )
        .await;
    assert_eq!(body["code"], 0);
    let records = body["data"]["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records.iter().all(|r| r["user_id"] == me));
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn public_listing_filters_sorts_and_pages() {
    let app = spawn_app().await;
    let (user_id, token) = app.new_user().await;

    add(&app, &token, json!({ "result_name": "alpha", "result_prop": ["I", "N"], "result_score_range": 3, "app_id": 1 })).await;
    add(&app, &token, json!({ "result_name": "beta", "result_prop": ["E", "N"], "result_score_range": 1, "app_id": 1 })).await;
    add(&app, &token, json!({ "result_name": "gamma", "result_prop": ["I", "S"], "result_score_range": 2, "app_id": 2 })).await;

    let body = app
        .post(
            "/api/scoring_result/list/page/vo",
            None,
            json!({ "app_id": 1, "sort_field": "result_score_range", "sort_order": "ascend" }),
        )
        .await;
    assert_eq!(body["code"], 0);
    let names: Vec<&str> = body["data"]["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["result_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["beta", "alpha"]);
    assert_eq!(body["data"]["records"][0]["user"]["id"], user_id);

    let body = app
        .post("/api/scoring_result/list/page/vo", None, json!({ "result_prop": ["I"] }))
        .await;
    assert_eq!(body["data"]["total"], 2);

    let body = app
        .post("/api/scoring_result/list/page/vo", None, json!({ "search_text": "amm" }))
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"][0]["result_name"], "gamma");

    let body = app
        .post(
            "/api/scoring_result/list/page/vo",
            None,
            json!({ "current": 2, "page_size": 2 }),
        )
        .await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["pages"], 2);
    assert_eq!(body["data"]["current"], 2);
    assert_eq!(body["data"]["records"].as_array().unwrap().len(), 1);

    let body = app
        .post("/api/scoring_result/list/page/vo", None, json!({ "sort_field": "password" }))
        .await;
    assert_eq!(body["code"], 40000);
}

#[tokio::test]
async fn corrupt_payload_is_reported_not_hidden() {
    let app = spawn_app().await;
    let (_, token) = app.new_user().await;
    let id = add(&app, &token, json!({ "result_name": "x", "result_prop": ["A"], "app_id": 1 })).await;

    sqlx::query("UPDATE scoring_results SET result_prop = '[\"A\",' WHERE id = ?")
        .bind(id)
        .execute(&app.pool)
        .await
        .unwrap();

    let body = get_vo(&app, id).await;
    assert_eq!(body["code"], 50002);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn tag_filter_matches_whole_tags_only() {
    let app = spawn_app().await;
    let (_, token) = app.new_user().await;

    let quoted = add(&app, &token, json!({ "result_name": "quoted", "result_prop": ["A\",\"B"], "app_id": 5 })).await;
    let plain = add(&app, &token, json!({ "result_name": "plain", "result_prop": ["A", "B"], "app_id": 5 })).await;

    let body = app
        .post("/api/scoring_result/list/page/vo", None, json!({ "app_id": 5, "result_prop": ["B"] }))
        .await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"][0]["id"], plain);

    let body = app
        .post(
            "/api/scoring_result/list/page/vo",
            None,
            json!({ "app_id": 5, "result_prop": ["A\",\"B"] }),
        )
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"][0]["id"], quoted);

    let body = app
        .post(
            "/api/scoring_result/list/page/vo",
            None,
            json!({ "app_id": 5, "result_prop": ["A", "B"] }),
        )
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["records"][0]["id"], plain);
}

#[tokio::test]
async fn out_of_range_paging_gets_an_envelope() {
    let app = spawn_app().await;
    let (_, token) = app.new_user().await;
    let (_, admin) = app.admin().await;
    add(&app, &token, json!({ "result_name": "x", "app_id": 1 })).await;

    let body = app
        .post(
            "/api/scoring_result/list/page/vo",
            None,
            json!({ "current": i64::MAX, "page_size": 20 }),
        )
        .await;
    assert_eq!(body["code"], 40000);

    let body = app
        .post(
            "/api/scoring_result/list/page",
            Some(&admin),
            json!({ "current": 1, "page_size": i64::MAX }),
        )
        .await;
    assert_eq!(body["code"], 0, "{}", body);
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["pages"], 1);
}
