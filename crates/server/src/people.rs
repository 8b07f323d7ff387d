//! People API endpoints

use api_types::person::{Person, PersonNew};
use axum::{Json, extract::State, http::StatusCode};

use crate::{JsonBody, PathParam, ServerError, server::ServerState};

fn person_view(person: engine::Person) -> Person {
    Person {
        id: person.id,
        name: person.name,
        phone: person.phone,
        created_at: person.created_at,
    }
}

pub async fn person_new(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<PersonNew>,
) -> Result<(StatusCode, Json<Person>), ServerError> {
    let person = state
        .engine
        .new_person(&payload.name, payload.phone.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(person_view(person))))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Person>>, ServerError> {
    let people = state.engine.people().await?;
    Ok(Json(people.into_iter().map(person_view).collect()))
}

pub async fn get(
    State(state): State<ServerState>,
    PathParam(person_id): PathParam<i32>,
) -> Result<Json<Person>, ServerError> {
    let person = state.engine.person(person_id).await?;
    Ok(Json(person_view(person)))
}
