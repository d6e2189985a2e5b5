#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use common::{bearer, cleanup_user, db_pool, lazy_pool, register_confirm_login, test_state};

fn contact_payload(first_name: &str, email: &str) -> Value {
    json!({
        "first_name": first_name,
        "second_name": "Tester",
        "email": email,
        "phone_number": "+380501234567",
        "birthday": null,
        "additional_data": null
    })
}

#[actix_rt::test]
async fn test_contacts_require_authentication() {
    let app = test_app!(test_state(lazy_pool()));
    let id = uuid::Uuid::new_v4();

    let requests = vec![
        test::TestRequest::get().uri("/api/contacts"),
        test::TestRequest::get().uri("/api/contacts/birthdays"),
        test::TestRequest::get().uri(&format!("/api/contacts/{}", id)),
        test::TestRequest::post()
            .uri("/api/contacts")
            .set_json(contact_payload("Ann", "ann@example.com")),
        test::TestRequest::put()
            .uri(&format!("/api/contacts/{}", id))
            .set_json(json!({ "first_name": "Bob" })),
        test::TestRequest::delete().uri(&format!("/api/contacts/{}", id)),
    ];

    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_contact_crud_flow() {
    let pool = db_pool().await;
    cleanup_user(&pool, "crud_user").await;
    let app = test_app!(test_state(pool.clone()));
    let (access, _) = register_confirm_login(&app, "crud_user", "crud@example.com").await;

    // Validation failures never reach the database.
    let mut bad_phone = contact_payload("Ann", "ann@example.com");
    bad_phone["phone_number"] = json!("12-34");
    let req = test::TestRequest::post()
        .uri("/api/contacts")
        .insert_header(bearer(&access))
        .set_json(&bad_phone)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = test::TestRequest::post()
        .uri("/api/contacts")
        .insert_header(bearer(&access))
        .set_json(contact_payload("Ann", "ann@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["first_name"], "Ann");

    let req = test::TestRequest::get()
        .uri(&format!("/api/contacts/{}", id))
        .insert_header(bearer(&access))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    let req = test::TestRequest::put()
        .uri(&format!("/api/contacts/{}", id))
        .insert_header(bearer(&access))
        .set_json(json!({ "first_name": "Anna" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["first_name"], "Anna");
    assert_eq!(updated["second_name"], "Tester");
    assert_eq!(updated["email"], "ann@example.com");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/contacts/{}", id))
        .insert_header(bearer(&access))
        .to_request();
    let deleted: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(deleted["id"], id.as_str());

    let req = test::TestRequest::get()
        .uri(&format!("/api/contacts/{}", id))
        .insert_header(bearer(&access))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Contact not found");

    cleanup_user(&pool, "crud_user").await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_contacts_are_private_to_their_owner() {
    let pool = db_pool().await;
    cleanup_user(&pool, "owner_user").await;
    cleanup_user(&pool, "other_user").await;
    let app = test_app!(test_state(pool.clone()));
    let (owner, _) = register_confirm_login(&app, "owner_user", "owner@example.com").await;
    let (other, _) = register_confirm_login(&app, "other_user", "other@example.com").await;

    let req = test::TestRequest::post()
        .uri("/api/contacts")
        .insert_header(bearer(&owner))
        .set_json(contact_payload("Secret", "secret@example.com"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/api/contacts/{}", created["id"].as_str().unwrap());

    let req = test::TestRequest::get().uri(&uri).insert_header(bearer(&other)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put()
        .uri(&uri)
        .insert_header(bearer(&other))
        .set_json(json!({ "first_name": "Hijacked" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete().uri(&uri).insert_header(bearer(&other)).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/contacts")
        .insert_header(bearer(&other))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, json!([]));

    // Removing the owner removes their contacts with them.
    cleanup_user(&pool, "owner_user").await;
    let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contacts WHERE email = $1")
        .bind("secret@example.com")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(remaining.0, 0);

    cleanup_user(&pool, "other_user").await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_search_and_pagination() {
    let pool = db_pool().await;
    cleanup_user(&pool, "search_user").await;
    let app = test_app!(test_state(pool.clone()));
    let (access, _) = register_confirm_login(&app, "search_user", "search@example.com").await;

    for (name, email) in [
        ("Alice", "alice@work.com"),
        ("Alina", "alina@home.com"),
        ("Bob", "bob@work.com"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(bearer(&access))
            .set_json(contact_payload(name, email))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let list = |query: &str| {
        test::TestRequest::get()
            .uri(&format!("/api/contacts{}", query))
            .insert_header(bearer(&access))
            .to_request()
    };
    let names = |body: Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|c| c["first_name"].as_str().unwrap().to_string())
            .collect()
    };

    let body: Value = test::call_and_read_body_json(&app, list("")).await;
    assert_eq!(names(body), vec!["Alice", "Alina", "Bob"]);

    let body: Value = test::call_and_read_body_json(&app, list("?first_name=ALI")).await;
    assert_eq!(names(body), vec!["Alice", "Alina"]);

    let body: Value = test::call_and_read_body_json(&app, list("?first_name=ali&email=work")).await;
    assert_eq!(names(body), vec!["Alice"]);

    let body: Value = test::call_and_read_body_json(&app, list("?skip=1&limit=1")).await;
    assert_eq!(names(body), vec!["Alina"]);

    let body: Value = test::call_and_read_body_json(&app, list("?email=%25")).await;
    assert_eq!(names(body), Vec::<String>::new());

    let resp = test::call_service(&app, list("?limit=0")).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    cleanup_user(&pool, "search_user").await;
}

#[actix_rt::test]
#[ignore = "requires DATABASE_URL"]
async fn test_upcoming_birthdays() {
    let pool = db_pool().await;
    cleanup_user(&pool, "bday_user").await;
    let app = test_app!(test_state(pool.clone()));
    let (access, _) = register_confirm_login(&app, "bday_user", "bday@example.com").await;

    let today = Utc::now().date_naive();
    let birthdays = [
        ("Soon", today + Duration::days(3)),
        ("Later", today + Duration::days(30)),
    ];
    for (name, date) in birthdays {
        let mut payload = contact_payload(name, &format!("{}@example.com", name.to_lowercase()));
        payload["birthday"] = json!(date.to_string());
        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(bearer(&access))
            .set_json(&payload)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/contacts/birthdays")
        .insert_header(bearer(&access))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let upcoming: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["first_name"].as_str().unwrap())
        .collect();
    assert_eq!(upcoming, vec!["Soon"]);

    cleanup_user(&pool, "bday_user").await;
}
