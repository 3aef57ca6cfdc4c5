use rocket::http::{ContentType, Status};

use crate::common::{create_user, json, location, tracked_client, users, TEST_PASSWORD};

mod common;

#[tokio::test]
async fn signup_sends_user_to_login() {
    let client = tracked_client().await;

    let response = client
        .post("/auth/signup")
        .header(ContentType::Form)
        .body("username=Danya&password=secret")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Found);
    assert_eq!(location(&response), Some("/auth/login".to_string()));
    assert!(users(&client).find_by_username("Danya").unwrap().is_some());
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let client = tracked_client().await;
    create_user(&client, "Danya").await;

    let response = client
        .post("/auth/signup")
        .header(ContentType::Form)
        .body("username=Danya&password=other")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body = json(response).await;
    assert_eq!(
        body["form"]["errors"]["username"][0],
        "A user with that username already exists."
    );
}

#[tokio::test]
async fn login_follows_next_and_opens_pages() {
    let client = tracked_client().await;
    create_user(&client, "Danya").await;

    let response = client.get("/notes").dispatch().await;
    assert_eq!(
        location(&response),
        Some("/auth/login?next=/notes".to_string())
    );

    let response = client
        .post("/auth/login?next=/notes")
        .header(ContentType::Form)
        .body(format!("username=Danya&password={TEST_PASSWORD}"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Found);
    assert_eq!(location(&response), Some("/notes".to_string()));

    let response = client.get("/notes").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let client = tracked_client().await;
    create_user(&client, "Danya").await;

    let response = client
        .post("/auth/login")
        .header(ContentType::Form)
        .body("username=Danya&password=wrong")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body = json(response).await;
    assert_eq!(body["form"]["username"], "Danya");
    assert_eq!(
        body["form"]["errors"]["password"][0],
        "Please enter a correct username and password."
    );

    let response = client.get("/notes").dispatch().await;
    assert_eq!(response.status(), Status::Found);
}

#[tokio::test]
async fn logout_ends_the_session() {
    let client = tracked_client().await;
    create_user(&client, "Danya").await;

    client
        .post("/auth/login")
        .header(ContentType::Form)
        .body(format!("username=Danya&password={TEST_PASSWORD}"))
        .dispatch()
        .await;
    assert_eq!(client.get("/notes").dispatch().await.status(), Status::Ok);

    let response = client.post("/auth/logout").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let response = client.get("/notes").dispatch().await;
    assert_eq!(response.status(), Status::Found);
}

#[tokio::test]
async fn malformed_next_falls_back_to_home() {
    let client = tracked_client().await;
    create_user(&client, "Danya").await;

    for next in ["/%5Cevil.example", "//evil.example", "/with%20space"] {
        let response = client
            .post(format!("/auth/login?next={next}"))
            .header(ContentType::Form)
            .body(format!("username=Danya&password={TEST_PASSWORD}"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Found, "next={next}");
        assert_eq!(location(&response), Some("/".to_string()), "next={next}");
    }
}
