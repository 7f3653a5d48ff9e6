//! Admin management flows: packages, hosting accounts, users, activity log

mod common;

use axum::http::{Method, StatusCode};
use common::{TestContext, PASSWORD};
use serde_json::{json, Value};

fn starter() -> Value {
    json!({
        "name": "Starter",
        "disk_quota": 1024,
        "bandwidth_quota": 10240,
        "max_domains": 1,
        "max_databases": 1,
        "max_emails": 5,
        "max_ftp": 1
    })
}

async fn login(ctx: &TestContext, username: &str, password: &str) -> (StatusCode, Value) {
    ctx.send(
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

#[tokio::test]
async fn test_package_lifecycle() {
    let ctx = TestContext::new().await;

    let id = ctx.create("/api/v1/packages", &ctx.admin, starter()).await;

    let (status, json) = ctx.post("/api/v1/packages", &ctx.admin, starter()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Package already exists");

    let assign_uri = format!("/api/v1/users/{}/package", ctx.alice.id);
    let (status, json) = ctx
        .put(&assign_uri, &ctx.admin, json!({ "package_id": id }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["package_id"], id);

    let user_uri = format!("/api/v1/users/{}", ctx.alice.id);
    let (status, json) = ctx.get(&user_uri, &ctx.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["username"], "alice");
    assert_eq!(json["data"]["package"]["package_id"], id);

    let package_uri = format!("/api/v1/packages/{}", id);
    let (status, json) = ctx.delete(&package_uri, &ctx.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Package is in use");

    let (status, _) = ctx.delete(&assign_uri, &ctx.admin).await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = ctx.get(&user_uri, &ctx.admin).await;
    assert!(json["data"]["package"].is_null());

    let (status, _) = ctx.delete(&package_uri, &ctx.admin).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx.delete(&package_uri, &ctx.admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_package_validation() {
    let ctx = TestContext::new().await;

    let mut negative = starter();
    negative["disk_quota"] = json!(-1);
    let (status, json) = ctx.post("/api/v1/packages", &ctx.admin, negative).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Validation failed");
    assert_eq!(json["details"][0]["field"], "disk_quota");

    let mut unnamed = starter();
    unnamed["name"] = json!(" ");
    let (status, json) = ctx.post("/api/v1/packages", &ctx.admin, unnamed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Package name is required");

    let (status, _) = ctx
        .post("/api/v1/packages", &ctx.admin, json!({ "name": "Partial" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_package_update_and_listing() {
    let ctx = TestContext::new().await;
    let id = ctx.create("/api/v1/packages", &ctx.admin, starter()).await;

    let mut bigger = starter();
    bigger["name"] = json!("Starter Plus");
    bigger["max_domains"] = json!(3);
    let (status, json) = ctx
        .put(&format!("/api/v1/packages/{}", id), &ctx.admin, bigger.clone())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["max_domains"], 3);

    let (status, _) = ctx.put("/api/v1/packages/777", &ctx.admin, bigger).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, json) = ctx.get("/api/v1/packages", &ctx.admin).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["name"], "Starter Plus");
}

#[tokio::test]
async fn test_unassign_without_assignment_is_404() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/v1/users/{}/package", ctx.bob.id);
    let (status, _) = ctx.delete(&uri, &ctx.admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.put(&uri, &ctx.admin, json!({ "package_id": 31337 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_hosting_account_provisioning() {
    let ctx = TestContext::new().await;
    let package_id = ctx.create("/api/v1/packages", &ctx.admin, starter()).await;

    let account_id = ctx
        .create(
            "/api/v1/accounts",
            &ctx.admin,
            json!({
                "username": "carol",
                "email": "carol@example.com",
                "password": "carol-password",
                "domain": "carol.example",
                "package_id": package_id,
            }),
        )
        .await;
    let account_uri = format!("/api/v1/accounts/{}", account_id);

    let (status, json) = ctx.get(&account_uri, &ctx.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["username"], "carol");
    assert_eq!(json["data"]["package_name"], "Starter");
    assert_eq!(json["data"]["domain"], "carol.example");
    assert_eq!(json["data"]["parent_id"], ctx.admin.id);

    // The account can see itself and its domain
    let (status, json) = login(&ctx, "carol", "carol-password").await;
    assert_eq!(status, StatusCode::OK);
    let carol_token = json["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .send(Method::GET, &account_uri, Some(carol_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, domains) = ctx
        .send(Method::GET, "/api/v1/domains", Some(carol_token.as_str()), None)
        .await;
    assert_eq!(domains["data"][0]["document_root"], "/home/carol/public_html/carol.example");

    // Nobody else can, and only admins manage accounts
    assert_eq!(ctx.get(&account_uri, &ctx.alice).await.0, StatusCode::FORBIDDEN);
    let (status, _) = ctx
        .send(Method::DELETE, &account_uri, Some(carol_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, list) = ctx.get("/api/v1/accounts", &ctx.admin).await;
    let usernames: Vec<&str> = list["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["username"].as_str())
        .collect();
    assert_eq!(usernames, ["alice", "bob", "carol"]);

    let (status, _) = ctx.delete(&account_uri, &ctx.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ctx.get(&account_uri, &ctx.admin).await.0, StatusCode::NOT_FOUND);
    assert_eq!(login(&ctx, "carol", "carol-password").await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_hosting_account_is_all_or_nothing() {
    let ctx = TestContext::new().await;
    let package_id = ctx.create("/api/v1/packages", &ctx.admin, starter()).await;
    ctx.create("/api/v1/domains", &ctx.alice, json!({ "name": "taken.example" }))
        .await;

    let (status, _) = ctx
        .post(
            "/api/v1/accounts",
            &ctx.admin,
            json!({
                "username": "dave",
                "email": "dave@example.com",
                "password": "dave-password",
                "domain": "taken.example",
                "package_id": package_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(
            "/api/v1/accounts",
            &ctx.admin,
            json!({
                "username": "erin",
                "email": "erin@example.com",
                "password": "erin-password",
                "domain": "erin.example",
                "package_id": 9999,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, users) = ctx.get("/api/v1/users", &ctx.admin).await;
    let usernames: Vec<&str> = users["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["username"].as_str())
        .collect();
    assert!(!usernames.contains(&"dave"));
    assert!(!usernames.contains(&"erin"));
}

#[tokio::test]
async fn test_admins_are_not_accounts() {
    let ctx = TestContext::new().await;

    let uri = format!("/api/v1/accounts/{}", ctx.admin.id);
    assert_eq!(ctx.get(&uri, &ctx.admin).await.0, StatusCode::NOT_FOUND);

    let uri = format!("/api/v1/accounts/{}/suspend", ctx.admin.id);
    assert_eq!(ctx.post(&uri, &ctx.admin, json!({})).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_management() {
    let ctx = TestContext::new().await;

    let id = ctx
        .create(
            "/api/v1/users",
            &ctx.admin,
            json!({
                "username": "rita",
                "email": "rita@example.com",
                "password": "rita-password",
                "role": "reseller",
            }),
        )
        .await;

    let (status, json) = ctx.get(&format!("/api/v1/users/{}", id), &ctx.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], "reseller");
    assert_eq!(json["data"]["parent_id"], ctx.admin.id);

    let (status, json) = ctx
        .post(
            "/api/v1/users",
            &ctx.admin,
            json!({ "username": "rita", "email": "other@example.com", "password": "rita-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Username or email already exists");

    let (status, _) = ctx
        .post(
            "/api/v1/users",
            &ctx.admin,
            json!({ "username": "root", "email": "root@example.com", "password": "root-password", "role": "root" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = ctx
        .post(
            "/api/v1/users",
            &ctx.admin,
            json!({ "username": "sam", "email": "not-an-email", "password": "sam-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"][0]["field"], "email");

    let (status, json) = ctx
        .put(
            &format!("/api/v1/users/{}", id),
            &ctx.admin,
            json!({ "role": "user", "active": false }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["role"], "user");
    assert_eq!(json["data"]["active"], false);
    assert_eq!(json["data"]["email"], "rita@example.com");

    let (status, _) = ctx.delete(&format!("/api/v1/users/{}", id), &ctx.admin).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx.get(&format!("/api/v1/users/{}", id), &ctx.admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_password_change_takes_effect() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .put(
            &format!("/api/v1/users/{}", ctx.bob.id),
            &ctx.admin,
            json!({ "password": "brand-new-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(login(&ctx, "bob", PASSWORD).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(login(&ctx, "bob", "brand-new-password").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_cannot_delete_itself() {
    let ctx = TestContext::new().await;

    let (status, json) = ctx
        .delete(&format!("/api/v1/users/{}", ctx.admin.id), &ctx.admin)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Cannot delete your own account");
}

#[tokio::test]
async fn test_admin_cannot_demote_or_suspend_itself() {
    let ctx = TestContext::new().await;
    let uri = format!("/api/v1/users/{}", ctx.admin.id);

    let (status, json) = ctx.put(&uri, &ctx.admin, json!({ "role": "user" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Cannot change your own role");

    let (status, json) = ctx.put(&uri, &ctx.admin, json!({ "active": false })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Cannot suspend your own account");

    let (_, json) = ctx.get(&uri, &ctx.admin).await;
    assert_eq!(json["data"]["role"], "admin");
    assert_eq!(json["data"]["active"], true);

    let (status, json) = ctx
        .put(&uri, &ctx.admin, json!({ "role": "admin", "email": "root@example.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["email"], "root@example.com");
}

#[tokio::test]
async fn test_deleting_user_removes_owned_resources() {
    let ctx = TestContext::new().await;
    ctx.create("/api/v1/domains", &ctx.bob, json!({ "name": "bob.example" }))
        .await;

    let (status, _) = ctx.delete(&format!("/api/v1/users/{}", ctx.bob.id), &ctx.admin).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = ctx.get("/api/v1/domains", &ctx.admin).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_mutations_are_recorded() {
    let ctx = TestContext::new().await;

    assert_eq!(login(&ctx, "alice", PASSWORD).await.0, StatusCode::OK);
    ctx.create("/api/v1/domains", &ctx.alice, json!({ "name": "audit.example" }))
        .await;
    let id = ctx.create("/api/v1/packages", &ctx.admin, starter()).await;
    ctx.delete(&format!("/api/v1/packages/{}", id), &ctx.admin).await;

    let (status, json) = ctx.get("/api/v1/activity", &ctx.admin).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|entry| entry["action"].as_str())
        .collect();
    assert_eq!(
        actions,
        ["package.delete", "package.create", "domain.create", "user.login"]
    );

    let (_, json) = ctx.get("/api/v1/activity?limit=1", &ctx.admin).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (status, _) = ctx.get("/api/v1/activity?limit=lots", &ctx.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
