use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::json;

use rust_homework_review::models::users::entities::UserRole;

mod helpers;
use helpers::{create_user, send, setup_storage, test_app};

#[actix_web::test]
async fn test_admin_changes_role_and_it_applies_immediately() {
    let storage = setup_storage().await;
    let admin = create_user(&storage, "admin@x.com", UserRole::Admin).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let app = test_app!(storage);

    // 学生还不能创建作业
    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(student.bearer())
        .set_json(json!({"title": "HW1", "dueDate": "2030-01-01T00:00:00Z"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/users/{}/role", student.id()))
        .insert_header(admin.bearer())
        .set_json(json!({"role": "ta"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "ta");
    assert!(body.get("passwordHash").is_none());

    // 旧令牌中的角色不影响判断，角色以数据库为准
    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(student.bearer())
        .set_json(json!({"title": "HW1", "dueDate": "2030-01-01T00:00:00Z"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[actix_web::test]
async fn test_non_admin_cannot_change_roles() {
    let storage = setup_storage().await;
    let instructor = create_user(&storage, "i@x.com", UserRole::Instructor).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let app = test_app!(storage);

    for actor in [&instructor, &student] {
        let req = test::TestRequest::patch()
            .uri(&format!("/api/users/{}/role", student.id()))
            .insert_header(actor.bearer())
            .set_json(json!({"role": "admin"}))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .to_lowercase()
                .contains("permission")
        );
    }
}

#[actix_web::test]
async fn test_role_update_validation_and_missing_user() {
    let storage = setup_storage().await;
    let admin = create_user(&storage, "admin@x.com", UserRole::Admin).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let app = test_app!(storage);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/users/{}/role", student.id()))
        .insert_header(admin.bearer())
        .set_json(json!({"role": "teacher"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid role");

    let req = test::TestRequest::patch()
        .uri("/api/users/9999/role")
        .insert_header(admin.bearer())
        .set_json(json!({"role": "ta"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::patch()
        .uri("/api/users/abc/role")
        .insert_header(admin.bearer())
        .set_json(json!({"role": "ta"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_list_users_with_role_filter_and_pagination() {
    let storage = setup_storage().await;
    let admin = create_user(&storage, "admin@x.com", UserRole::Admin).await;
    create_user(&storage, "s1@x.com", UserRole::Student).await;
    create_user(&storage, "s2@x.com", UserRole::Student).await;
    create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let app = test_app!(storage);

    let req = test::TestRequest::get()
        .uri("/api/users?page=0&limit=2")
        .insert_header(admin.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["total"], 4);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::get()
        .uri("/api/users?role=student")
        .insert_header(admin.bearer())
        .to_request();
    let (_, body) = send(&app, req).await;
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u["role"] == "student"));

    let req = test::TestRequest::get()
        .uri("/api/users?role=wizard")
        .insert_header(admin.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert!(body["users"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_list_users_requires_admin() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let app = test_app!(storage);

    let req = test::TestRequest::get()
        .uri("/api/users")
        .insert_header(ta.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
