use rocket::form::Form;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::{delete, get, post, routes, FromForm, Responder, Route, State};
use serde::Serialize;

use crate::web::errors::{form_errors, into_field_error, FormErrors, WebError};
use crate::web::Notes;
use crate::{AccessPolicy, Identity, Note, NoteForm, NotesError};

/// Where successful form submissions land.
pub const DONE_URL: &str = "/done";

type PageResult<T> = Result<Json<T>, WebError>;

#[derive(Serialize)]
struct HomePage {
    authenticated: bool,
}

#[derive(Serialize)]
struct NoteListPage {
    object_list: Vec<Note>,
}

#[derive(Serialize)]
struct NotePage {
    note: Note,
}

#[derive(Serialize)]
struct Message {
    message: &'static str,
}

#[derive(Serialize, Default)]
struct NoteFormView {
    title: String,
    text: String,
    slug: String,
    errors: FormErrors,
}

#[derive(Serialize)]
struct FormPage {
    form: NoteFormView,
}

#[derive(FromForm)]
struct NoteFormData {
    title: Option<String>,
    text: Option<String>,
    slug: Option<String>,
}

#[derive(FromForm)]
struct EditFormData {
    title: Option<String>,
    text: Option<String>,
}

#[derive(Responder)]
enum FormOutcome {
    Saved(Redirect),
    #[response(status = 422)]
    Invalid(Json<FormPage>),
}

fn saved() -> FormOutcome {
    FormOutcome::Saved(Redirect::found(DONE_URL))
}

#[get("/")]
fn home(identity: Identity) -> Json<HomePage> {
    Json(HomePage {
        authenticated: identity.is_authenticated(),
    })
}

#[get("/notes")]
fn list(identity: Identity, notes: &State<Notes>) -> PageResult<NoteListPage> {
    Ok(Json(NoteListPage {
        object_list: notes.list(&identity)?,
    }))
}

#[get("/add")]
fn add_form(identity: Identity) -> PageResult<FormPage> {
    if !AccessPolicy::can_create(&identity) {
        return Err(NotesError::AuthenticationRequired.into());
    }
    Ok(Json(FormPage {
        form: NoteFormView::default(),
    }))
}

#[post("/add", data = "<form>")]
fn add(
    identity: Identity,
    notes: &State<Notes>,
    form: Form<NoteFormData>,
) -> Result<FormOutcome, WebError> {
    let NoteFormData { title, text, slug } = form.into_inner();
    let form = NoteForm {
        title: title.unwrap_or_default(),
        text: text.unwrap_or_default(),
        slug,
    };

    match notes.create(&identity, form.clone()) {
        Ok(_) => Ok(saved()),
        Err(e) => {
            let error = into_field_error(e)?;
            Ok(FormOutcome::Invalid(Json(FormPage {
                form: NoteFormView {
                    title: form.title,
                    text: form.text,
                    slug: form.slug.unwrap_or_default(),
                    errors: form_errors(error),
                },
            })))
        }
    }
}

#[get("/note/<slug>")]
fn detail(identity: Identity, notes: &State<Notes>, slug: &str) -> PageResult<NotePage> {
    Ok(Json(NotePage {
        note: notes.view(&identity, slug)?,
    }))
}

#[get("/edit/<slug>")]
fn edit_form(identity: Identity, notes: &State<Notes>, slug: &str) -> PageResult<FormPage> {
    let note = notes.get_for_edit(&identity, slug)?;
    Ok(Json(FormPage {
        form: NoteFormView {
            title: note.title,
            text: note.text,
            slug: note.slug,
            errors: FormErrors::new(),
        },
    }))
}

#[post("/edit/<slug>", data = "<form>")]
fn edit(
    identity: Identity,
    notes: &State<Notes>,
    slug: &str,
    form: Form<EditFormData>,
) -> Result<FormOutcome, WebError> {
    let EditFormData { title, text } = form.into_inner();
    let (title, text) = (title.unwrap_or_default(), text.unwrap_or_default());

    match notes.edit(&identity, slug, title.clone(), text.clone()) {
        Ok(_) => Ok(saved()),
        Err(e) => {
            let error = into_field_error(e)?;
            Ok(FormOutcome::Invalid(Json(FormPage {
                form: NoteFormView {
                    title,
                    text,
                    slug: slug.to_string(),
                    errors: form_errors(error),
                },
            })))
        }
    }
}

#[get("/delete/<slug>")]
fn delete_confirm(identity: Identity, notes: &State<Notes>, slug: &str) -> PageResult<NotePage> {
    Ok(Json(NotePage {
        note: notes.get_for_edit(&identity, slug)?,
    }))
}

fn remove(identity: Identity, notes: &Notes, slug: &str) -> Result<Redirect, WebError> {
    notes.delete(&identity, slug)?;
    Ok(Redirect::found(DONE_URL))
}

#[post("/delete/<slug>")]
fn delete_by_form(identity: Identity, notes: &State<Notes>, slug: &str) -> Result<Redirect, WebError> {
    remove(identity, notes, slug)
}

#[delete("/delete/<slug>")]
fn delete_by_method(identity: Identity, notes: &State<Notes>, slug: &str) -> Result<Redirect, WebError> {
    remove(identity, notes, slug)
}

#[get("/done")]
fn done(identity: Identity) -> PageResult<Message> {
    identity.require()?;
    Ok(Json(Message {
        message: "Done.",
    }))
}

pub fn note_routes() -> Vec<Route> {
    routes![
        home,
        list,
        add_form,
        add,
        detail,
        edit_form,
        edit,
        delete_confirm,
        delete_by_form,
        delete_by_method,
        done,
    ]
}
