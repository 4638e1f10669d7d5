mod common;

use axum::http::StatusCode;
use common::{parse_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_management_profile_is_admin_editable() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;
    let (student, _) = app.register("Kid", "kid@sunrise.edu", "password123").await;

    let res = app.send("GET", "/management", Some(&student), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["emailDomain"], "sunrise.edu");

    let res = app.send("PUT", "/management", Some(&student), Some(json!({"name": "Hijacked"}))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.send("PUT", "/management", Some(&admin), Some(json!({
        "name": "Sunrise Academy", "logo": "https://cdn.test/logo.png", "numCoaches": 4
    }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["name"], "Sunrise Academy");
    assert_eq!(body["logo"], "https://cdn.test/logo.png");
    assert_eq!(body["numCoaches"], 4);

    let res = app.send("PUT", "/management", Some(&admin), Some(json!({"numStudents": -1}))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_count_tenant_records() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;
    let (student, _) = app.register("Kid", "kid@sunrise.edu", "password123").await;

    let coach = app.create("/coaches", &admin, json!({"name": "Asha", "email": "asha@sunrise.edu"})).await;
    let class = app.create("/classes", &admin, json!({"name": "Physics", "coachId": coach["coachId"]})).await;
    app.create("/students", &admin, json!({"name": "Ravi", "classId": class["classId"]})).await;
    app.create("/students", &admin, json!({"name": "Meena", "classId": class["classId"]})).await;

    let res = app.send("GET", "/management/stats", Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let stats = parse_body(res).await;
    assert_eq!(stats["totalClasses"], 1);
    assert_eq!(stats["totalCoaches"], 1);
    assert_eq!(stats["totalStudents"], 2);
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["attendanceRecordsToday"], 0);

    let res = app.send("GET", "/management/stats", Some(&student), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_coach_crud_and_duplicate_email() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;

    let coach = app.create("/coaches", &admin, json!({
        "name": "Asha", "email": "Asha@Sunrise.edu", "subject": "Physics"
    })).await;
    assert_eq!(coach["email"], "asha@sunrise.edu");
    let coach_id = coach["coachId"].as_str().unwrap().to_string();

    let res = app.send("POST", "/coaches", Some(&admin), Some(json!({
        "name": "Asha Again", "email": "asha@sunrise.edu"
    }))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.send("PUT", &format!("/coaches/{}", coach_id), Some(&admin), Some(json!({"phone": "98765"}))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["phone"], "98765");

    let list = parse_body(app.send("GET", "/coaches", Some(&admin), None).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let res = app.send("DELETE", &format!("/coaches/{}", coach_id), Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.send("GET", &format!("/coaches/{}", coach_id), Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.send("DELETE", &format!("/coaches/{}", coach_id), Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_coach_unassigns_classes() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;

    let coach = app.create("/coaches", &admin, json!({"name": "Asha", "email": "asha@sunrise.edu"})).await;
    let class = app.create("/classes", &admin, json!({"name": "Physics", "coachId": coach["coachId"]})).await;
    assert_eq!(class["coachId"], coach["coachId"]);

    let res = app.send("DELETE", &format!("/coaches/{}", coach["coachId"].as_str().unwrap()), Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let class = parse_body(app.send("GET", &format!("/classes/{}", class["classId"].as_str().unwrap()), Some(&admin), None).await).await;
    assert!(class["coachId"].is_null());
}

#[tokio::test]
async fn test_class_crud_rules() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;

    let res = app.send("POST", "/classes", Some(&admin), Some(json!({"name": "Physics", "coachId": "no-such-coach"}))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let coach = app.create("/coaches", &admin, json!({"name": "Asha", "email": "asha@sunrise.edu"})).await;
    let class = app.create("/classes", &admin, json!({"name": "Physics", "batch": "2026"})).await;
    let class_uri = format!("/classes/{}", class["classId"].as_str().unwrap());
    assert!(class["coachId"].is_null());

    let res = app.send("PUT", &class_uri, Some(&admin), Some(json!({"coachId": coach["coachId"]}))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["coachId"], coach["coachId"]);

    let res = app.send("PUT", &class_uri, Some(&admin), Some(json!({"coachId": ""}))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(parse_body(res).await["coachId"].is_null());

    let student = app.create("/students", &admin, json!({"name": "Ravi", "classId": class["classId"]})).await;
    assert_eq!(student["batch"], "2026");

    let res = app.send("DELETE", &class_uri, Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.send("DELETE", &format!("/students/{}", student["id"].as_str().unwrap()), Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.send("DELETE", &class_uri, Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_coach_sees_only_assigned_classes_and_students() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;
    let coach = app.create("/coaches", &admin, json!({"name": "Asha", "email": "asha@sunrise.edu"})).await;
    let (coach_cookie, _) = app.register("Asha", "asha@sunrise.edu", "password123").await;

    let mine = app.create("/classes", &admin, json!({"name": "Physics", "coachId": coach["coachId"]})).await;
    let other = app.create("/classes", &admin, json!({"name": "Chemistry"})).await;
    app.create("/students", &admin, json!({"name": "Ravi", "classId": mine["classId"]})).await;
    let outsider = app.create("/students", &admin, json!({"name": "Meena", "classId": other["classId"]})).await;

    let classes = parse_body(app.send("GET", "/classes", Some(&coach_cookie), None).await).await;
    let classes = classes.as_array().unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0]["classId"], mine["classId"]);

    let students = parse_body(app.send("GET", "/students", Some(&coach_cookie), None).await).await;
    let students = students.as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["name"], "Ravi");

    let res = app.send("GET", &format!("/students/{}", outsider["id"].as_str().unwrap()), Some(&coach_cookie), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.send("POST", "/classes", Some(&coach_cookie), Some(json!({"name": "Biology"}))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.send("POST", "/students", Some(&coach_cookie), Some(json!({
        "name": "Sneaky", "classId": other["classId"]
    }))).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let created = app.create("/students", &coach_cookie, json!({"name": "Arjun", "classId": mine["classId"]})).await;
    assert_eq!(created["classId"], mine["classId"]);
}

#[tokio::test]
async fn test_marks_crud_and_score_validation() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;
    let class = app.create("/classes", &admin, json!({"name": "Physics"})).await;
    let student = app.create("/students", &admin, json!({"name": "Ravi", "classId": class["classId"]})).await;

    let res = app.send("POST", "/marks", Some(&admin), Some(json!({
        "studentId": student["id"], "subject": "Physics", "examName": "Unit 1", "score": 120, "maxScore": 100
    }))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.send("POST", "/marks", Some(&admin), Some(json!({
        "studentId": "ghost", "subject": "Physics", "examName": "Unit 1", "score": 10, "maxScore": 100
    }))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let mark = app.create("/marks", &admin, json!({
        "studentId": student["id"], "subject": "Physics", "examName": "Unit 1",
        "score": 78.5, "maxScore": 100, "examDate": "2026-07-01"
    })).await;
    assert_eq!(mark["classId"], class["classId"]);
    assert_eq!(mark["score"], 78.5);
    let mark_uri = format!("/marks/{}", mark["id"].as_str().unwrap());

    let res = app.send("PUT", &mark_uri, Some(&admin), Some(json!({"maxScore": 50}))).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.send("PUT", &mark_uri, Some(&admin), Some(json!({"score": 91}))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["score"], 91.0);

    let uri = format!("/marks?studentId={}", student["id"].as_str().unwrap());
    let list = parse_body(app.send("GET", &uri, Some(&admin), None).await).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let res = app.send("DELETE", &mark_uri, Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let list = parse_body(app.send("GET", &uri, Some(&admin), None).await).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let app = TestApp::new().await;
    let (sunrise, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;
    let (moonlight, _) = app.register("Director", "director@moonlight.org", "password123").await;

    let class = app.create("/classes", &sunrise, json!({"name": "Physics"})).await;
    let class_uri = format!("/classes/{}", class["classId"].as_str().unwrap());

    let res = app.send("GET", &class_uri, Some(&moonlight), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.send("DELETE", &class_uri, Some(&moonlight), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app.send("POST", "/students", Some(&moonlight), Some(json!({
        "name": "Intruder", "classId": class["classId"]
    }))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let classes = parse_body(app.send("GET", "/classes", Some(&moonlight), None).await).await;
    assert!(classes.as_array().unwrap().is_empty());

    let users = parse_body(app.send("GET", "/users/all", Some(&moonlight), None).await).await;
    let users = users.as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["email"], "director@moonlight.org");
}

#[tokio::test]
async fn test_user_directory_is_admin_only() {
    let app = TestApp::new().await;
    let (admin, _) = app.register("Principal", "principal@sunrise.edu", "password123").await;
    let (student, _) = app.register("Kid", "kid@sunrise.edu", "password123").await;

    let res = app.send("GET", "/users/all", Some(&student), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.send("GET", "/users/all", Some(&admin), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let users = parse_body(res).await;
    assert_eq!(users.as_array().unwrap().len(), 2);

    let profile = parse_body(app.send("GET", "/users", Some(&student), None).await).await;
    assert_eq!(profile["email"], "kid@sunrise.edu");
    assert_eq!(profile["role"], "student");
}
