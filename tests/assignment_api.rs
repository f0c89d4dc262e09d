use actix_web::http::{StatusCode, header};
use actix_web::test;
use chrono::{Duration, Utc};
use serde_json::json;

use rust_homework_review::models::users::entities::UserRole;

mod helpers;
use helpers::{
    create_assignment, create_user, multipart_body, send, setup_storage, test_app, upload_dir,
};

// create

#[actix_web::test]
async fn test_staff_create_assignment_with_defaults() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let app = test_app!(storage);

    let due = (Utc::now() + Duration::days(7)).to_rfc3339();
    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(ta.bearer())
        .set_json(json!({"title": "HW1", "dueDate": due}))
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_i64().unwrap() > 0);
    assert_eq!(body["title"], "HW1");
    assert_eq!(body["createdBy"], ta.id());
    assert_eq!(body["creatorName"], "Test ta");
    assert_eq!(body["allowLateSubmission"], false);
    assert_eq!(body["allowedFileTypes"], json!([]));
}

#[actix_web::test]
async fn test_create_assignment_validation_and_roles() {
    let storage = setup_storage().await;
    let instructor = create_user(&storage, "i@x.com", UserRole::Instructor).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let app = test_app!(storage);

    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(instructor.bearer())
        .set_json(json!({"title": "HW1"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title and due date are required");

    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(instructor.bearer())
        .set_json(json!({"title": "HW1", "dueDate": "next tuesday"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/assignments")
        .insert_header(student.bearer())
        .set_json(json!({"title": "HW1", "dueDate": "2030-01-01T00:00:00Z"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// read

#[actix_web::test]
async fn test_get_and_list_assignments() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    for i in 0..3 {
        create_assignment(&storage, &ta, &format!("HW{i}"), Utc::now(), false).await;
    }
    let first = create_assignment(&storage, &ta, "Final", Utc::now(), false).await;
    let app = test_app!(storage);

    let req = test::TestRequest::get()
        .uri(&format!("/api/assignments/{}", first.id))
        .insert_header(student.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Final");

    let req = test::TestRequest::get()
        .uri("/api/assignments?page=0&limit=3")
        .insert_header(student.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["total"], 4);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["assignments"].as_array().unwrap().len(), 3);

    let req = test::TestRequest::get()
        .uri("/api/assignments?page=2&limit=3")
        .insert_header(student.bearer())
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["assignments"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri("/api/assignments?page=9223372036854775807&limit=100")
        .insert_header(student.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["page"], i64::MAX / 100);
    assert_eq!(body["assignments"], json!([]));

    let req = test::TestRequest::get()
        .uri("/api/assignments/9999")
        .insert_header(student.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Assignment not found");

    let req = test::TestRequest::get()
        .uri("/api/assignments/not-a-number")
        .insert_header(student.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// update

#[actix_web::test]
async fn test_update_assignment_ownership() {
    let storage = setup_storage().await;
    let owner = create_user(&storage, "ta1@x.com", UserRole::Ta).await;
    let other_ta = create_user(&storage, "ta2@x.com", UserRole::Ta).await;
    let instructor = create_user(&storage, "i@x.com", UserRole::Instructor).await;
    let hw = create_assignment(&storage, &owner, "HW1", Utc::now(), false).await;
    let app = test_app!(storage);

    let req = test::TestRequest::put()
        .uri(&format!("/api/assignments/{}", hw.id))
        .insert_header(other_ta.bearer())
        .set_json(json!({"title": "Hijacked"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/assignments/{}", hw.id))
        .insert_header(owner.bearer())
        .set_json(json!({"title": "HW1 (revised)", "allowLateSubmission": true, "createdBy": other_ta.id()}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "HW1 (revised)");
    assert_eq!(body["allowLateSubmission"], true);
    assert_eq!(body["createdBy"], owner.id());

    let req = test::TestRequest::put()
        .uri(&format!("/api/assignments/{}", hw.id))
        .insert_header(instructor.bearer())
        .set_json(json!({"description": "Read chapter 3"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Read chapter 3");
    assert_eq!(body["title"], "HW1 (revised)");
}

#[actix_web::test]
async fn test_missing_assignment_is_not_found_before_forbidden() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let app = test_app!(storage);

    let req = test::TestRequest::put()
        .uri("/api/assignments/9999")
        .insert_header(ta.bearer())
        .set_json(json!({"title": "x"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// delete

#[actix_web::test]
async fn test_delete_assignment_cascades() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let instructor = create_user(&storage, "i@x.com", UserRole::Instructor).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let hw = create_assignment(&storage, &ta, "HW1", Utc::now() + Duration::days(1), false).await;

    let app = test_app!(storage);

    let (content_type, body) = multipart_body(
        &[
            ("assignmentId", hw.id.to_string().as_str()),
            ("textContent", "answer"),
            ("status", "submitted"),
        ],
        &[("report.pdf", "application/pdf", b"%PDF-1.4 report".as_slice())],
    );
    let req = test::TestRequest::post()
        .uri("/api/submissions")
        .insert_header(student.bearer())
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let (status, created) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    let submission_id = created["id"].as_i64().unwrap();
    let attachment_id = created["attachments"][0]["id"].as_i64().unwrap();

    let stored_name = storage
        .get_attachment_by_id(attachment_id)
        .await
        .unwrap()
        .unwrap()
        .attachment
        .file_path;
    let stored_file = upload_dir().join(&stored_name);
    assert!(stored_file.exists());

    let feedback = storage
        .record_feedback(submission_id, ta.id(), "Good".to_string(), Some(90.0))
        .await
        .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/assignments/{}", hw.id))
        .insert_header(ta.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/assignments/{}", hw.id))
        .insert_header(instructor.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    assert!(storage.get_assignment_by_id(hw.id).await.unwrap().is_none());
    assert!(storage.get_submission_by_id(submission_id).await.unwrap().is_none());
    assert!(storage.get_feedback_by_id(feedback.id).await.unwrap().is_none());
    assert!(storage.get_attachment_by_id(attachment_id).await.unwrap().is_none());
    assert!(!stored_file.exists());

    let req = test::TestRequest::delete()
        .uri(&format!("/api/assignments/{}", hw.id))
        .insert_header(instructor.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
