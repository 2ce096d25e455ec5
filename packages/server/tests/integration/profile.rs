use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn the_profile_merges_account_and_client_fields() {
    let app = TestApp::spawn().await;
    let (alice, alice_id) = app.register_user("alice").await;

    let res = app.get_with_token(routes::PROFILE_ME, &alice).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["user_id"], alice_id);
    assert_eq!(res.body["username"], "alice");
    assert_eq!(res.body["email"], "alice@example.com");
    assert_eq!(res.body["is_active"], true);
}

#[tokio::test]
async fn account_and_profile_fields_can_be_patched_together() {
    let app = TestApp::spawn().await;
    let (alice, _) = app.register_user("alice").await;

    let res = app
        .patch_with_token(
            routes::PROFILE_ME,
            &json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "company_name": "Analytical Engines Ltd",
                "phone": "+44 20 0000 0000",
            }),
            &alice,
        )
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["first_name"], "Ada");
    assert_eq!(res.body["company_name"], "Analytical Engines Ltd");
    assert_eq!(res.body["phone"], "+44 20 0000 0000");
}

#[tokio::test]
async fn changing_email_to_another_accounts_address_conflicts() {
    let app = TestApp::spawn().await;
    let (alice, _) = app.register_user("alice").await;
    app.register_user("bob").await;

    let res = app
        .patch_with_token(
            routes::PROFILE_ME,
            &json!({"email": "bob@example.com"}),
            &alice,
        )
        .await;

    assert_eq!(res.status, 409);
    assert_eq!(res.body["code"], "CONFLICT");
}

#[tokio::test]
async fn an_invalid_email_is_rejected() {
    let app = TestApp::spawn().await;
    let (alice, _) = app.register_user("alice").await;

    let res = app
        .patch_with_token(routes::PROFILE_ME, &json!({"email": "nope"}), &alice)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}
