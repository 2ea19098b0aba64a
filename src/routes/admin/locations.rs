use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::{Client, Collection};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::location::{LocationInput, StateRegion, University};
use crate::services::events::{ChangeOp, EventBus};

/// States and universities are the same shape with different collections;
/// the handlers share these generic bodies.
async fn list_all<T>(client: &Client, collection_name: &'static str) -> HttpResponse
where
    T: Serialize + DeserializeOwned + Send + Sync + Unpin,
{
    let collection: Collection<T> = mongo::collection(client, collection_name);
    match collection.find(doc! {}).sort(doc! { "name": 1 }).await {
        Ok(cursor) => match cursor.try_collect::<Vec<T>>().await {
            Ok(items) => HttpResponse::Ok().json(items),
            Err(err) => {
                eprintln!("Failed to collect {}: {:?}", collection_name, err);
                HttpResponse::InternalServerError().body("Failed to fetch locations")
            }
        },
        Err(err) => {
            eprintln!("Failed to find {}: {:?}", collection_name, err);
            HttpResponse::InternalServerError().body("Failed to fetch locations")
        }
    }
}

async fn create_location(
    client: &Client,
    bus: &EventBus,
    collection_name: &'static str,
    input: LocationInput,
) -> HttpResponse {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({ "error": "Name is required", "field": "name" }));
    }

    let collection = client
        .database(mongo::DB_NAME)
        .collection::<mongodb::bson::Document>(collection_name);

    // Unique index on name; code 11000 is the duplicate write error.
    let now = DateTime::now();
    let document = doc! {
        "name": &name,
        "is_active": input.is_active.unwrap_or(true),
        "created_at": now,
        "updated_at": now,
    };

    match collection.insert_one(document).await {
        Ok(result) => {
            let id = result.inserted_id.as_object_id().map(|id| id.to_hex());
            bus.publish(collection_name, ChangeOp::Insert, id.clone());
            HttpResponse::Ok().json(json!({ "location_id": id }))
        }
        Err(err) => {
            let duplicate = matches!(
                *err.kind,
                mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                    ref write_error
                )) if write_error.code == 11000
            );
            if duplicate {
                return HttpResponse::Conflict()
                    .json(json!({ "error": "A location with this name already exists" }));
            }
            eprintln!("Failed to create location: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create location")
        }
    }
}

async fn toggle_location(
    client: &Client,
    bus: &EventBus,
    collection_name: &'static str,
    id: &str,
    input: LocationInput,
) -> HttpResponse {
    let location_id = match ObjectId::parse_str(id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid location ID"),
    };

    let mut set = doc! { "updated_at": DateTime::now() };
    if !input.name.trim().is_empty() {
        set.insert("name", input.name.trim());
    }
    if let Some(is_active) = input.is_active {
        set.insert("is_active", is_active);
    }

    let collection = client
        .database(mongo::DB_NAME)
        .collection::<mongodb::bson::Document>(collection_name);

    match collection
        .update_one(doc! { "_id": location_id }, doc! { "$set": set })
        .await
    {
        Ok(result) if result.matched_count == 0 => {
            HttpResponse::NotFound().body("Location not found")
        }
        Ok(_) => {
            bus.publish(collection_name, ChangeOp::Update, Some(location_id.to_hex()));
            HttpResponse::Ok().json(json!({ "updated": true }))
        }
        Err(err) => {
            eprintln!("Failed to update location: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to update location")
        }
    }
}

async fn delete_location(
    client: &Client,
    bus: &EventBus,
    collection_name: &'static str,
    id: &str,
) -> HttpResponse {
    let location_id = match ObjectId::parse_str(id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid location ID"),
    };

    let collection = client
        .database(mongo::DB_NAME)
        .collection::<mongodb::bson::Document>(collection_name);

    match collection.delete_one(doc! { "_id": location_id }).await {
        Ok(result) if result.deleted_count == 0 => {
            HttpResponse::NotFound().body("Location not found")
        }
        Ok(_) => {
            bus.publish(collection_name, ChangeOp::Delete, Some(location_id.to_hex()));
            HttpResponse::Ok().json(json!({ "deleted": true }))
        }
        Err(err) => {
            eprintln!("Failed to delete location: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to delete location")
        }
    }
}

pub async fn list_states(data: web::Data<Arc<Client>>) -> impl Responder {
    list_all::<StateRegion>(&data.into_inner(), mongo::STATES).await
}

pub async fn create_state(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    input: web::Json<LocationInput>,
) -> impl Responder {
    create_location(&data.into_inner(), &bus, mongo::STATES, input.into_inner()).await
}

pub async fn update_state(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
    input: web::Json<LocationInput>,
) -> impl Responder {
    toggle_location(
        &data.into_inner(),
        &bus,
        mongo::STATES,
        &path.into_inner().0,
        input.into_inner(),
    )
    .await
}

pub async fn delete_state(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
) -> impl Responder {
    delete_location(&data.into_inner(), &bus, mongo::STATES, &path.into_inner().0).await
}

pub async fn list_universities(data: web::Data<Arc<Client>>) -> impl Responder {
    list_all::<University>(&data.into_inner(), mongo::UNIVERSITIES).await
}

pub async fn create_university(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    input: web::Json<LocationInput>,
) -> impl Responder {
    create_location(
        &data.into_inner(),
        &bus,
        mongo::UNIVERSITIES,
        input.into_inner(),
    )
    .await
}

pub async fn update_university(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
    input: web::Json<LocationInput>,
) -> impl Responder {
    toggle_location(
        &data.into_inner(),
        &bus,
        mongo::UNIVERSITIES,
        &path.into_inner().0,
        input.into_inner(),
    )
    .await
}

pub async fn delete_university(
    data: web::Data<Arc<Client>>,
    bus: web::Data<EventBus>,
    path: web::Path<(String,)>,
) -> impl Responder {
    delete_location(
        &data.into_inner(),
        &bus,
        mongo::UNIVERSITIES,
        &path.into_inner().0,
    )
    .await
}
