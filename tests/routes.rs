use rocket::http::Status;
use slugnotes::session_cookie;

use crate::common::{client, create_note, create_user, location};

mod common;

#[tokio::test]
async fn pages_available_to_authenticated_user() {
    let client = client().await;
    let commoner = create_user(&client, "Aleksandr").await;

    for url in ["/add", "/notes", "/done"] {
        let response = client
            .get(url)
            .private_cookie(session_cookie(&commoner))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok, "GET {url}");
    }
}

#[tokio::test]
async fn pages_available_to_anonymous_user() {
    let client = client().await;

    for url in ["/", "/auth/login", "/auth/signup"] {
        let response = client.get(url).dispatch().await;
        assert_eq!(response.status(), Status::Ok, "GET {url}");
    }

    let response = client.post("/auth/logout").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}

#[tokio::test]
async fn note_pages_only_open_for_author() {
    let client = client().await;
    let author = create_user(&client, "Vlad").await;
    let commoner = create_user(&client, "Aleksandr").await;
    let note = create_note(&client, &author, "Заголовок", "Текст");
    assert_eq!(note.slug, "zagolovok");

    for (user, status) in [(&author, Status::Ok), (&commoner, Status::NotFound)] {
        for prefix in ["/edit", "/delete", "/note"] {
            let url = format!("{}/{}", prefix, note.slug);
            let response = client
                .get(url.as_str())
                .private_cookie(session_cookie(user))
                .dispatch()
                .await;
            assert_eq!(response.status(), status, "GET {url} as {}", user.username);
        }
    }
}

#[tokio::test]
async fn anonymous_user_is_sent_to_login() {
    let client = client().await;
    let author = create_user(&client, "Vlad").await;
    let note = create_note(&client, &author, "Заголовок", "Текст");

    let urls = [
        format!("/edit/{}", note.slug),
        format!("/delete/{}", note.slug),
        "/add".to_string(),
        format!("/note/{}", note.slug),
        "/notes".to_string(),
        "/done".to_string(),
    ];
    for url in urls {
        let response = client.get(url.as_str()).dispatch().await;
        assert_eq!(response.status(), Status::Found, "GET {url}");
        assert_eq!(
            location(&response),
            Some(format!("/auth/login?next={url}")),
            "GET {url}"
        );
    }
}

#[tokio::test]
async fn anonymous_redirect_keeps_the_query() {
    let client = client().await;

    let response = client.get("/notes?page=2").dispatch().await;
    assert_eq!(response.status(), Status::Found);
    assert_eq!(
        location(&response),
        Some("/auth/login?next=/notes%3Fpage%3D2".to_string())
    );
}

#[tokio::test]
async fn missing_note_is_not_found() {
    let client = client().await;
    let user = create_user(&client, "Vlad").await;

    let response = client
        .get("/note/does-not-exist")
        .private_cookie(session_cookie(&user))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

#[tokio::test]
async fn session_of_unknown_user_is_anonymous() {
    let client = client().await;
    let other = client_user_elsewhere().await;

    let response = client
        .get("/notes")
        .private_cookie(session_cookie(&other))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Found);
}

/// A user registered in a different server instance.
async fn client_user_elsewhere() -> slugnotes::User {
    let elsewhere = client().await;
    create_user(&elsewhere, "Stranger").await
}
