//! Login, logout and signup pages.
use log::info;
use rocket::form::Form;
use rocket::http::uri::Origin;
use rocket::http::CookieJar;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{get, post, routes, FromForm, Responder, Route, State};
use serde::Serialize;

use crate::web::errors::{form_errors, into_field_error, FormErrors, WebError};
use crate::web::identity::{end_session, start_session};
use crate::{Config, FieldError, FormField, NotesError, UserDirectory};

#[derive(Serialize, Default)]
struct CredentialsView {
    username: String,
    errors: FormErrors,
}

#[derive(Serialize)]
struct CredentialsPage {
    form: CredentialsView,
    next: Option<String>,
}

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

#[derive(FromForm)]
struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Responder)]
enum CredentialsOutcome {
    Accepted(Redirect),
    #[response(status = 422)]
    Invalid(Json<CredentialsPage>),
}

/// Only follows redirects that stay on this site.
fn local_target(next: Option<&str>) -> String {
    next.filter(|next| !next.starts_with("//") && !next.starts_with("/\\"))
        .and_then(|next| Origin::parse(next).ok())
        .map(|origin| origin.to_string())
        .unwrap_or_else(|| "/".to_string())
}

fn invalid(username: String, error: FieldError, next: Option<String>) -> CredentialsOutcome {
    CredentialsOutcome::Invalid(Json(CredentialsPage {
        form: CredentialsView {
            username,
            errors: form_errors(error),
        },
        next,
    }))
}

#[get("/login?<next>")]
fn login_page(next: Option<String>) -> Json<CredentialsPage> {
    Json(CredentialsPage {
        form: CredentialsView::default(),
        next,
    })
}

#[post("/login?<next>", data = "<form>")]
async fn login(
    users: &State<UserDirectory>,
    cookies: &CookieJar<'_>,
    next: Option<String>,
    form: Form<Credentials>,
) -> Result<CredentialsOutcome, WebError> {
    let Credentials { username, password } = form.into_inner();
    let username = username.unwrap_or_default();

    match users
        .authenticate(&username, &password.unwrap_or_default())
        .await
    {
        Ok(user) => {
            start_session(cookies, &user);
            info!("User {} logged in", user.username);
            Ok(CredentialsOutcome::Accepted(Redirect::found(local_target(
                next.as_deref(),
            ))))
        }
        Err(NotesError::InvalidCredentials) => {
            let error = FieldError {
                field: FormField::Password,
                message: "Please enter a correct username and password.".to_string(),
            };
            Ok(invalid(username, error, next))
        }
        Err(e) => Err(e.into()),
    }
}

#[post("/logout")]
fn logout(cookies: &CookieJar<'_>) -> Json<Message> {
    end_session(cookies);
    Json(Message {
        message: "You have been logged out.",
    })
}

#[get("/signup")]
fn signup_page() -> Json<CredentialsPage> {
    Json(CredentialsPage {
        form: CredentialsView::default(),
        next: None,
    })
}

#[post("/signup", data = "<form>")]
async fn signup(
    users: &State<UserDirectory>,
    config: &State<Config>,
    form: Form<Credentials>,
) -> Result<CredentialsOutcome, WebError> {
    let Credentials { username, password } = form.into_inner();
    let username = username.unwrap_or_default();

    match users
        .signup(&username, &password.unwrap_or_default())
        .await
    {
        Ok(_) => Ok(CredentialsOutcome::Accepted(Redirect::found(
            config.login_url.clone(),
        ))),
        Err(e) => Ok(invalid(username, into_field_error(e)?, None)),
    }
}

pub fn auth_routes() -> Vec<Route> {
    routes![login_page, login, logout, signup_page, signup]
}
