//! Resource HTTP Routes
//!
//! CRUD and relationship endpoints for people, families and universes.
//! Bodies and responses are JSON:API-shaped documents.
//!
//! Every service call takes the table lock and, on a durable store, fsyncs
//! the image, so it runs on the blocking pool.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::errors::{ApiError, ApiResult};
use crate::model::{FamilyId, NameIdentifier, PersonId, RecordKind, UniverseId};
use crate::resources::{
    Document, InboundDocument, RelationshipDocument, Resource, ResourceIdentifier,
    ResourceObject, ResourceResult, ResourceService,
};

// ==================
// Shared State
// ==================

/// Resource state shared across handlers
pub struct ResourceState {
    pub service: ResourceService,
}

impl ResourceState {
    pub fn new(service: ResourceService) -> Self {
        Self { service }
    }
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct FamilyListQuery {
    #[serde(default)]
    pub name_identifier: Option<NameIdentifier>,
}

type IdPath<T> = Result<Path<T>, PathRejection>;
type Body<T> = Result<Json<T>, JsonRejection>;

type ObjectResponse = Json<Document<ResourceObject>>;
type ListResponse = Json<Document<Vec<ResourceObject>>>;
type CreatedResponse = (StatusCode, Json<Document<ResourceObject>>);
type ToOneResponse = Json<Document<Option<ResourceIdentifier>>>;
type ToManyResponse = Json<Document<Vec<ResourceIdentifier>>>;

/// Run one service call off the async workers
async fn blocking<T, F>(state: &ResourceState, f: F) -> ApiResult<T>
where
    F: FnOnce(&ResourceService) -> ResourceResult<T> + Send + 'static,
    T: Send + 'static,
{
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;
    Ok(result)
}

fn object<R: Resource>(record: &R) -> ObjectResponse {
    Json(Document::new(record.to_object(), record.self_path()))
}

fn list<R: Resource>(records: &[R], self_link: String) -> ListResponse {
    Json(Document::new(
        records.iter().map(Resource::to_object).collect(),
        self_link,
    ))
}

fn created<R: Resource>(record: &R) -> CreatedResponse {
    (StatusCode::CREATED, object(record))
}

fn identifiers<R: Resource>(records: &[R], self_link: String) -> ToManyResponse {
    Json(Document::new(
        records.iter().map(Resource::identifier).collect(),
        self_link,
    ))
}

// ==================
// Resource Routes
// ==================

/// Create resource routes
pub fn resource_routes(state: Arc<ResourceState>) -> Router {
    Router::new()
        // People
        .route("/people", get(list_people_handler).post(create_person_handler))
        .route(
            "/family/:id/people",
            get(family_people_handler).post(create_family_person_handler),
        )
        .route(
            "/person/:id",
            get(get_person_handler)
                .patch(update_person_handler)
                .delete(delete_person_handler),
        )
        .route(
            "/people/:id/relationships/family",
            get(person_family_handler).patch(set_person_family_handler),
        )
        // Families
        .route("/families", get(list_families_handler).post(create_family_handler))
        .route(
            "/universe/:id/families",
            get(universe_families_handler).post(create_universe_family_handler),
        )
        .route(
            "/family/:id",
            get(get_family_handler)
                .patch(update_family_handler)
                .delete(delete_family_handler),
        )
        .route("/family/:id/relationships/people", get(family_people_link_handler))
        .route(
            "/family/:id/relationships/universe",
            get(family_universe_handler).patch(set_family_universe_handler),
        )
        // Universes
        .route("/universes", get(list_universes_handler).post(create_universe_handler))
        .route(
            "/universe/:id",
            get(get_universe_handler)
                .patch(update_universe_handler)
                .delete(delete_universe_handler),
        )
        .route(
            "/universe/:id/relationships/families",
            get(universe_families_link_handler),
        )
        .with_state(state)
}

// ==================
// People Handlers
// ==================

async fn list_people_handler(State(state): State<Arc<ResourceState>>) -> ApiResult<ListResponse> {
    let people = blocking(&state, |service| service.list_people()).await?;
    Ok(list(&people, "/people".to_string()))
}

async fn create_person_handler(
    State(state): State<Arc<ResourceState>>,
    body: Body<InboundDocument>,
) -> ApiResult<CreatedResponse> {
    let Json(document) = body?;
    let person = blocking(&state, move |service| {
        service.create_person(&document.data, None)
    })
    .await?;
    Ok(created(&person))
}

async fn family_people_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<FamilyId>,
) -> ApiResult<ListResponse> {
    let Path(id) = path?;
    let people = blocking(&state, move |service| service.family_people(id)).await?;
    Ok(list(&people, format!("/family/{}/people", id)))
}

async fn create_family_person_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<FamilyId>,
    body: Body<InboundDocument>,
) -> ApiResult<CreatedResponse> {
    let Path(id) = path?;
    let Json(document) = body?;
    let person = blocking(&state, move |service| {
        service.create_person(&document.data, Some(id))
    })
    .await?;
    Ok(created(&person))
}

async fn get_person_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<PersonId>,
) -> ApiResult<ObjectResponse> {
    let Path(id) = path?;
    let person = blocking(&state, move |service| service.get_person(id)).await?;
    Ok(object(&person))
}

async fn update_person_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<PersonId>,
    body: Body<InboundDocument>,
) -> ApiResult<ObjectResponse> {
    let Path(id) = path?;
    let Json(document) = body?;
    let person = blocking(&state, move |service| {
        service.update_person(id, &document.data)
    })
    .await?;
    Ok(object(&person))
}

async fn delete_person_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<PersonId>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    blocking(&state, move |service| service.delete_person(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn person_family_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<PersonId>,
) -> ApiResult<ToOneResponse> {
    let Path(id) = path?;
    let linkage = blocking(&state, move |service| service.person_family(id)).await?;
    Ok(Json(Document::new(
        linkage,
        format!("/people/{}/relationships/family", id),
    )))
}

async fn set_person_family_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<PersonId>,
    body: Body<RelationshipDocument>,
) -> ApiResult<ToOneResponse> {
    let Path(id) = path?;
    let Json(document) = body?;
    let person = blocking(&state, move |service| {
        service.set_person_family(id, document.data.as_ref())
    })
    .await?;
    Ok(Json(Document::new(
        person
            .family_id
            .map(|f| ResourceIdentifier::new(RecordKind::Family, f)),
        format!("/people/{}/relationships/family", id),
    )))
}

// ==================
// Family Handlers
// ==================

async fn list_families_handler(
    State(state): State<Arc<ResourceState>>,
    query: Result<Query<FamilyListQuery>, QueryRejection>,
) -> ApiResult<ListResponse> {
    let Query(query) = query?;
    let families = blocking(&state, move |service| {
        service.list_families(query.name_identifier)
    })
    .await?;
    Ok(list(&families, "/families".to_string()))
}

async fn create_family_handler(
    State(state): State<Arc<ResourceState>>,
    body: Body<InboundDocument>,
) -> ApiResult<CreatedResponse> {
    let Json(document) = body?;
    let family = blocking(&state, move |service| {
        service.create_family(&document.data, None)
    })
    .await?;
    Ok(created(&family))
}

async fn universe_families_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<UniverseId>,
) -> ApiResult<ListResponse> {
    let Path(id) = path?;
    let families = blocking(&state, move |service| service.universe_families(id)).await?;
    Ok(list(&families, format!("/universe/{}/families", id)))
}

async fn create_universe_family_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<UniverseId>,
    body: Body<InboundDocument>,
) -> ApiResult<CreatedResponse> {
    let Path(id) = path?;
    let Json(document) = body?;
    let family = blocking(&state, move |service| {
        service.create_family(&document.data, Some(id))
    })
    .await?;
    Ok(created(&family))
}

async fn get_family_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<FamilyId>,
) -> ApiResult<ObjectResponse> {
    let Path(id) = path?;
    let family = blocking(&state, move |service| service.get_family(id)).await?;
    Ok(object(&family))
}

async fn update_family_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<FamilyId>,
    body: Body<InboundDocument>,
) -> ApiResult<ObjectResponse> {
    let Path(id) = path?;
    let Json(document) = body?;
    let family = blocking(&state, move |service| {
        service.update_family(id, &document.data)
    })
    .await?;
    Ok(object(&family))
}

async fn delete_family_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<FamilyId>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    blocking(&state, move |service| service.delete_family(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn family_people_link_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<FamilyId>,
) -> ApiResult<ToManyResponse> {
    let Path(id) = path?;
    let people = blocking(&state, move |service| service.family_people(id)).await?;
    Ok(identifiers(&people, format!("/family/{}/relationships/people", id)))
}

async fn family_universe_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<FamilyId>,
) -> ApiResult<ToOneResponse> {
    let Path(id) = path?;
    let linkage = blocking(&state, move |service| service.family_universe(id)).await?;
    Ok(Json(Document::new(
        linkage,
        format!("/family/{}/relationships/universe", id),
    )))
}

async fn set_family_universe_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<FamilyId>,
    body: Body<RelationshipDocument>,
) -> ApiResult<ToOneResponse> {
    let Path(id) = path?;
    let Json(document) = body?;
    let family = blocking(&state, move |service| {
        service.set_family_universe(id, document.data.as_ref())
    })
    .await?;
    Ok(Json(Document::new(
        family
            .universe_id
            .map(|u| ResourceIdentifier::new(RecordKind::Universe, u)),
        format!("/family/{}/relationships/universe", id),
    )))
}

// ==================
// Universe Handlers
// ==================

async fn list_universes_handler(
    State(state): State<Arc<ResourceState>>,
) -> ApiResult<ListResponse> {
    let universes = blocking(&state, |service| service.list_universes()).await?;
    Ok(list(&universes, "/universes".to_string()))
}

async fn create_universe_handler(
    State(state): State<Arc<ResourceState>>,
    body: Body<InboundDocument>,
) -> ApiResult<CreatedResponse> {
    let Json(document) = body?;
    let universe = blocking(&state, move |service| {
        service.create_universe(&document.data)
    })
    .await?;
    Ok(created(&universe))
}

async fn get_universe_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<UniverseId>,
) -> ApiResult<ObjectResponse> {
    let Path(id) = path?;
    let universe = blocking(&state, move |service| service.get_universe(id)).await?;
    Ok(object(&universe))
}

async fn update_universe_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<UniverseId>,
    body: Body<InboundDocument>,
) -> ApiResult<ObjectResponse> {
    let Path(id) = path?;
    let Json(document) = body?;
    let universe = blocking(&state, move |service| {
        service.update_universe(id, &document.data)
    })
    .await?;
    Ok(object(&universe))
}

async fn delete_universe_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<UniverseId>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    blocking(&state, move |service| service.delete_universe(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn universe_families_link_handler(
    State(state): State<Arc<ResourceState>>,
    path: IdPath<UniverseId>,
) -> ApiResult<ToManyResponse> {
    let Path(id) = path?;
    let families = blocking(&state, move |service| service.universe_families(id)).await?;
    Ok(identifiers(
        &families,
        format!("/universe/{}/relationships/families", id),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_list_query_defaults() {
        let query: FamilyListQuery = serde_json::from_str("{}").unwrap();
        assert!(query.name_identifier.is_none());
    }
}
