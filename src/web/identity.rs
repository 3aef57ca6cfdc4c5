use async_trait::async_trait;
use log::{debug, error};
use rocket::http::{Cookie, CookieJar, Status};
use rocket::outcome::try_outcome;
use rocket::request::{FromRequest, Outcome};
use rocket::{Request, State};
use uuid::Uuid;

use crate::{Identity, User, UserDirectory, UserId};

/// Private cookie carrying the id of the logged-in user.
pub const SESSION_COOKIE: &str = "slugnotes_user";

/// Resolves the request identity from the session cookie. Missing, tampered
/// or stale cookies all mean anonymous.
#[async_trait]
impl<'r> FromRequest<'r> for Identity {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let users = try_outcome!(request.guard::<&State<UserDirectory>>().await);

        let cookie = match request.cookies().get_private(SESSION_COOKIE) {
            Some(cookie) => cookie,
            None => return Outcome::Success(Identity::Anonymous),
        };
        let id = match cookie.value().parse::<Uuid>() {
            Ok(id) => UserId(id),
            Err(_) => {
                debug!("Ignoring malformed session cookie");
                return Outcome::Success(Identity::Anonymous);
            }
        };

        match users.get(id) {
            Ok(Some(user)) => Outcome::Success(user.id.into()),
            Ok(None) => {
                debug!("Session refers to unknown user {}", id);
                Outcome::Success(Identity::Anonymous)
            }
            Err(e) => {
                error!("Failed to resolve session user {}: {}", id, e);
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

pub fn session_cookie(user: &User) -> Cookie<'static> {
    Cookie::new(SESSION_COOKIE, user.id.to_string())
}

pub fn start_session(cookies: &CookieJar<'_>, user: &User) {
    cookies.add_private(session_cookie(user));
}

pub fn end_session(cookies: &CookieJar<'_>) {
    cookies.remove_private(SESSION_COOKIE);
}
