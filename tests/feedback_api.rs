use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Duration, Utc};
use serde_json::json;

use rust_homework_review::models::submissions::entities::{SubmissionStatus, SubmissionUpsert};
use rust_homework_review::models::users::entities::UserRole;
use rust_homework_review::storage::Storage;

mod helpers;
use helpers::{TestUser, create_assignment, create_user, send, setup_storage, test_app};

async fn submitted(storage: &std::sync::Arc<dyn Storage>, ta: &TestUser, student: &TestUser) -> i64 {
    let hw = create_assignment(storage, ta, "HW1", Utc::now() + Duration::days(1), false).await;
    storage
        .upsert_submission(SubmissionUpsert {
            assignment_id: hw.id,
            student_id: student.id(),
            text_content: Some("answer".to_string()),
            status: SubmissionStatus::Submitted,
            attachments: Vec::new(),
        })
        .await
        .unwrap()
        .submission
        .id
}

// create

#[actix_web::test]
async fn test_feedback_grades_submission() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let submission_id = submitted(&storage, &ta, &student).await;
    let app = test_app!(storage);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header(ta.bearer())
        .set_json(json!({"submissionId": submission_id, "content": "Good", "grade": 85}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["content"], "Good");
    assert_eq!(body["reviewerId"], ta.id());
    assert_eq!(body["grade"], 85.0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/submissions/{submission_id}"))
        .insert_header(student.bearer())
        .to_request();
    let (status, detail) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["status"], "graded");
    assert_eq!(detail["grade"], 85.0);
    let feedback = detail["feedback"].as_array().unwrap();
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0]["reviewerName"], "Test ta");
}

#[actix_web::test]
async fn test_feedback_without_grade_keeps_status() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let submission_id = submitted(&storage, &ta, &student).await;
    let app = test_app!(storage);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header(ta.bearer())
        .set_json(json!({"submissionId": submission_id, "content": "Looking at it"}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["grade"].is_null());

    let submission = storage.get_submission_by_id(submission_id).await.unwrap().unwrap();
    assert_eq!(submission.status, SubmissionStatus::Submitted);
    assert_eq!(submission.grade, None);
}

#[actix_web::test]
async fn test_grade_boundaries() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let submission_id = submitted(&storage, &ta, &student).await;
    let app = test_app!(storage);

    for grade in [0.0, 100.0] {
        let req = test::TestRequest::post()
            .uri("/api/feedback")
            .insert_header(ta.bearer())
            .set_json(json!({"submissionId": submission_id, "content": "ok", "grade": grade}))
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED, "grade {grade} should be accepted");
    }

    for grade in [-0.001, 100.001] {
        let req = test::TestRequest::post()
            .uri("/api/feedback")
            .insert_header(ta.bearer())
            .set_json(json!({"submissionId": submission_id, "content": "ok", "grade": grade}))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "grade {grade} should be rejected");
        assert_eq!(body["error"], "Grade must be between 0 and 100");
    }

    // 最后一次有效分数生效
    let submission = storage.get_submission_by_id(submission_id).await.unwrap().unwrap();
    assert_eq!(submission.grade, Some(100.0));
}

#[actix_web::test]
async fn test_create_feedback_errors() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let submission_id = submitted(&storage, &ta, &student).await;
    let app = test_app!(storage);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header(ta.bearer())
        .set_json(json!({"submissionId": submission_id, "content": "   "}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header(ta.bearer())
        .set_json(json!({"submissionId": 9999, "content": "Good"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header(student.bearer())
        .set_json(json!({"submissionId": submission_id, "content": "I deserve 100", "grade": 100}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// update

#[actix_web::test]
async fn test_update_feedback_ownership_and_regrade() {
    let storage = setup_storage().await;
    let reviewer = create_user(&storage, "ta1@x.com", UserRole::Ta).await;
    let other_ta = create_user(&storage, "ta2@x.com", UserRole::Ta).await;
    let instructor = create_user(&storage, "i@x.com", UserRole::Instructor).await;
    let student = create_user(&storage, "s@x.com", UserRole::Student).await;
    let submission_id = submitted(&storage, &reviewer, &student).await;
    let feedback = storage
        .record_feedback(submission_id, reviewer.id(), "Good".to_string(), Some(70.0))
        .await
        .unwrap();
    let app = test_app!(storage);

    let req = test::TestRequest::put()
        .uri(&format!("/api/feedback/{}", feedback.id))
        .insert_header(other_ta.bearer())
        .set_json(json!({"content": "Mine now"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("/api/feedback/{}", feedback.id))
        .insert_header(reviewer.bearer())
        .set_json(json!({"content": "Better after re-read", "grade": 80}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Better after re-read");
    assert_eq!(body["grade"], 80.0);

    let req = test::TestRequest::put()
        .uri(&format!("/api/feedback/{}", feedback.id))
        .insert_header(instructor.bearer())
        .set_json(json!({"grade": 95}))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "Better after re-read");

    let submission = storage.get_submission_by_id(submission_id).await.unwrap().unwrap();
    assert_eq!(submission.grade, Some(95.0));
    assert_eq!(submission.status, SubmissionStatus::Graded);

    let req = test::TestRequest::put()
        .uri(&format!("/api/feedback/{}", feedback.id))
        .insert_header(reviewer.bearer())
        .set_json(json!({"grade": 101}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("/api/feedback/{}", feedback.id))
        .insert_header(reviewer.bearer())
        .set_json(json!({"content": ""}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri("/api/feedback/9999")
        .insert_header(other_ta.bearer())
        .set_json(json!({"content": "x"}))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// list

#[actix_web::test]
async fn test_feedback_history_is_additive_and_owner_visible() {
    let storage = setup_storage().await;
    let ta = create_user(&storage, "ta@x.com", UserRole::Ta).await;
    let instructor = create_user(&storage, "i@x.com", UserRole::Instructor).await;
    let owner = create_user(&storage, "s1@x.com", UserRole::Student).await;
    let other = create_user(&storage, "s2@x.com", UserRole::Student).await;
    let submission_id = submitted(&storage, &ta, &owner).await;
    storage
        .record_feedback(submission_id, ta.id(), "First pass".to_string(), Some(60.0))
        .await
        .unwrap();
    storage
        .record_feedback(submission_id, instructor.id(), "Second look".to_string(), Some(75.0))
        .await
        .unwrap();
    let app = test_app!(storage);

    let req = test::TestRequest::get()
        .uri(&format!("/api/feedback/by-submission/{submission_id}"))
        .insert_header(owner.bearer())
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["content"], "First pass");
    assert_eq!(entries[1]["content"], "Second look");
    assert!(entries.iter().all(|e| e["grade"] == 75.0));

    let req = test::TestRequest::get()
        .uri(&format!("/api/feedback/by-submission/{submission_id}"))
        .insert_header(other.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/feedback/by-submission/9999")
        .insert_header(other.bearer())
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
