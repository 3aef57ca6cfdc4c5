//! HTTP layer: routes, session handling and error translation.
mod auth;
mod errors;
mod identity;
mod notes;

use log::info;
use rocket::figment::Figment;
use rocket::{Build, Rocket};

use crate::{Config, NoteStorage, NotesService, Result, UserDirectory};

pub use errors::{login_redirect, WebError};
pub use identity::{session_cookie, SESSION_COOKIE};
pub use notes::DONE_URL;

/// The notes service as managed by rocket.
pub type Notes = NotesService<NoteStorage>;

/// Assembles the server around already opened stores.
pub fn build_rocket(
    figment: Figment,
    config: Config,
    service: Notes,
    users: UserDirectory,
) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(config)
        .manage(service)
        .manage(users)
        .mount("/", notes::note_routes())
        .mount("/auth", auth::auth_routes())
}

/// Opens the stores named by the configuration and assembles the server.
pub fn rocket_from_figment(figment: Figment) -> Result<Rocket<Build>> {
    let config = Config::from_figment(&figment)?;
    let service = NotesService::new(NoteStorage::from_config(&config)?);
    let users = UserDirectory::from_config(&config)?;
    info!(
        "Serving notes from {}",
        if config.persist {
            config.data_dir.display().to_string()
        } else {
            "memory".to_string()
        }
    );
    Ok(build_rocket(figment, config, service, users))
}
