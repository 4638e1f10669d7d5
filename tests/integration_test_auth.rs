mod common;

use axum::http::{header, StatusCode};
use common::{parse_body, session_cookie, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_first_registration_creates_management_and_admin() {
    let app = TestApp::new().await;

    let (_cookie, body) = app.register("Principal", "Principal@Sunrise.edu", "password123").await;

    assert_eq!(body["user"]["email"], "principal@sunrise.edu");
    assert_eq!(body["user"]["role"], "admin");
    assert!(body["user"].get("passwordHash").is_none());

    let management_id = body["management"]["managementId"].as_str().unwrap();
    assert!(management_id.starts_with("MGT-"));
    assert_eq!(management_id.len(), 12);
    assert_eq!(body["management"]["emailDomain"], "sunrise.edu");
    assert_eq!(body["management"]["name"], "Sunrise");
    assert_eq!(body["management"]["adminId"], body["user"]["id"]);
}

#[tokio::test]
async fn test_later_registrations_join_existing_management() {
    let app = TestApp::new().await;

    let (admin, first) = app.register("Principal", "principal@sunrise.edu", "password123").await;
    app.create("/coaches", &admin, json!({"name": "Asha", "email": "asha@sunrise.edu"})).await;

    let (_, coach) = app.register("Asha", "asha@sunrise.edu", "password123").await;
    let (_, student) = app.register("Kid", "kid@sunrise.edu", "password123").await;

    assert_eq!(coach["user"]["role"], "coach");
    assert_eq!(student["user"]["role"], "student");
    assert_eq!(coach["management"]["managementId"], first["management"]["managementId"]);
    assert_eq!(student["management"]["managementId"], first["management"]["managementId"]);
    assert_eq!(student["management"]["adminId"], first["user"]["id"]);

    let managements: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM managements")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(managements, 1);
}

#[tokio::test]
async fn test_registration_validation_and_duplicates() {
    let app = TestApp::new().await;
    app.register("Principal", "principal@sunrise.edu", "password123").await;

    let dup = app.send("POST", "/auth/register", None, Some(json!({
        "name": "Again", "email": "PRINCIPAL@sunrise.edu", "password": "password123"
    }))).await;
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    let short = app.send("POST", "/auth/register", None, Some(json!({
        "name": "Shorty", "email": "shorty@sunrise.edu", "password": "short"
    }))).await;
    assert_eq!(short.status(), StatusCode::BAD_REQUEST);

    let bad_email = app.send("POST", "/auth/register", None, Some(json!({
        "name": "Nobody", "email": "not-an-email", "password": "password123"
    }))).await;
    assert_eq!(bad_email.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_sets_hardened_cookie() {
    let app = TestApp::new().await;
    app.register("Principal", "principal@sunrise.edu", "password123").await;

    let res = app.send("POST", "/auth/login", None, Some(json!({
        "email": "principal@sunrise.edu", "password": "password123"
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);

    let set_cookie = res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|h| h.to_str().unwrap().to_string())
        .find(|c| c.starts_with("auth_session="))
        .expect("no session cookie");
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=604800"));

    let body = parse_body(res).await;
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["management"]["emailDomain"], "sunrise.edu");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = TestApp::new().await;
    app.register("Principal", "principal@sunrise.edu", "password123").await;

    let wrong = app.send("POST", "/auth/login", None, Some(json!({
        "email": "principal@sunrise.edu", "password": "wrong-password"
    }))).await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown = app.send("POST", "/auth/login", None, Some(json!({
        "email": "ghost@sunrise.edu", "password": "password123"
    }))).await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_endpoint_and_logout() {
    let app = TestApp::new().await;
    let (cookie, body) = app.register("Principal", "principal@sunrise.edu", "password123").await;

    let res = app.send("GET", "/auth/session", Some(&cookie), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let session = parse_body(res).await;
    assert_eq!(session["userId"], body["user"]["id"]);
    assert_eq!(session["managementId"], body["management"]["managementId"]);
    assert_eq!(session["email"], "principal@sunrise.edu");
    assert_eq!(session["role"], "admin");

    let res = app.send("GET", "/auth/session", None, None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.send("POST", "/auth/logout", Some(&cookie), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = session_cookie(&res).expect("logout should overwrite the cookie");
    assert_eq!(cleared, "auth_session=");
}

#[tokio::test]
async fn test_tampered_session_cookie_is_rejected() {
    let app = TestApp::new().await;
    let (cookie, _) = app.register("Kid", "kid@sunrise.edu", "password123").await;

    // Flip one character of the signature.
    let mut tampered = cookie.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let res = app.send("GET", "/auth/session", Some(&tampered), None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_update_and_password_change() {
    let app = TestApp::new().await;
    let (cookie, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;

    let res = app.send("PUT", "/users", Some(&cookie), Some(json!({"name": "Head of School"}))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["name"], "Head of School");

    let res = app.send("PUT", "/users", Some(&cookie), Some(json!({
        "currentPassword": "wrong-password", "newPassword": "new-password-1"
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.send("PUT", "/users", Some(&cookie), Some(json!({
        "currentPassword": "password123", "newPassword": "new-password-1"
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);

    app.login("principal@sunrise.edu", "new-password-1").await;

    let profile = parse_body(app.send("GET", "/users", Some(&cookie), None).await).await;
    assert_eq!(profile["name"], "Head of School");
}

#[tokio::test]
async fn test_failed_admin_insert_leaves_no_management_behind() {
    use coaching_backend::domain::models::{management::Management, user::{Role, User}};

    let app = TestApp::new().await;
    app.register("Principal", "principal@sunrise.edu", "password123").await;

    // The admin's email is already taken, as when a concurrent registration wins the users index.
    let management = Management::new("moonlight.org".to_string());
    let admin = User::new(
        management.management_id.clone(),
        "principal@sunrise.edu".to_string(),
        "Racer".to_string(),
        "not-a-real-hash".to_string(),
        Role::Admin,
    );
    let result = app.state.management_repo.create_with_admin(&management, &admin).await;
    assert!(result.is_err());

    let orphaned: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM managements WHERE email_domain = 'moonlight.org'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(orphaned, 0);

    let (_, body) = app.register("Director", "director@moonlight.org", "password123").await;
    assert_eq!(body["user"]["role"], "admin");
    assert_eq!(body["management"]["adminId"], body["user"]["id"]);
}
