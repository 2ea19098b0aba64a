use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::vehicle::Vehicle;

/// Active vehicles, for the wizard's vehicle step and the admin dropdowns.
pub async fn get_vehicles(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection = mongo::collection::<Vehicle>(&client, mongo::VEHICLES);

    match collection
        .find(doc! { "is_active": { "$ne": false } })
        .sort(doc! { "name": 1 })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Vehicle>>().await {
            Ok(vehicles) => HttpResponse::Ok().json(vehicles),
            Err(err) => {
                eprintln!("Failed to collect vehicles: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to collect vehicles")
            }
        },
        Err(err) => {
            eprintln!("Failed to find vehicles: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to find vehicles")
        }
    }
}
