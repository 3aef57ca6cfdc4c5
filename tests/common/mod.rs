#![allow(dead_code)]

use rocket::local::asynchronous::{Client, LocalResponse};
use serde_json::Value;
use slugnotes::{
    build_rocket, Config, HasherConfig, Identity, Note, NoteForm, NoteStorage, NoteStore, Notes,
    NotesService, User, UserDirectory,
};

pub const TEST_PASSWORD: &str = "password";

/// Cheap argon2 parameters so tests don't spend their time hashing.
pub const TEST_HASHER: HasherConfig = HasherConfig {
    memory_kib: 8,
    iterations: 1,
};

fn test_rocket() -> rocket::Rocket<rocket::Build> {
    let config = Config {
        persist: false,
        ..Config::default()
    };
    let figment = rocket::Config::figment().merge(("log_level", "off"));
    let users = UserDirectory::in_memory(TEST_HASHER).expect("user directory");
    build_rocket(
        figment,
        config,
        NotesService::new(NoteStorage::in_memory()),
        users,
    )
}

/// Client whose requests carry only the cookies attached to them.
pub async fn client() -> Client {
    Client::untracked(test_rocket())
        .await
        .expect("valid rocket instance")
}

/// Client that keeps cookies between requests, like a browser.
pub async fn tracked_client() -> Client {
    Client::tracked(test_rocket())
        .await
        .expect("valid rocket instance")
}

pub fn users(client: &Client) -> &UserDirectory {
    client
        .rocket()
        .state::<UserDirectory>()
        .expect("users are managed")
}

pub fn notes(client: &Client) -> &Notes {
    client.rocket().state::<Notes>().expect("notes are managed")
}

pub async fn create_user(client: &Client, username: &str) -> User {
    users(client)
        .signup(username, TEST_PASSWORD)
        .await
        .expect("signup succeeds")
}

pub fn create_note(client: &Client, author: &User, title: &str, text: &str) -> Note {
    notes(client)
        .create(&Identity::User(author.id), NoteForm::new(title, text))
        .expect("note is created")
}

pub fn note_count(client: &Client) -> usize {
    notes(client).store().count().expect("count")
}

pub fn stored_note(client: &Client, slug: &str) -> Option<Note> {
    notes(client).store().find_by_slug(slug).expect("lookup")
}

pub fn location(response: &LocalResponse<'_>) -> Option<String> {
    response.headers().get_one("Location").map(str::to_string)
}

pub async fn json(response: LocalResponse<'_>) -> Value {
    response.into_json::<Value>().await.expect("JSON body")
}
