use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{options::FindOptions, Client};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::db::mongo;
use crate::models::location::{StateRegion, University};

#[derive(serde::Deserialize)]
pub struct QueryParams {
    limit: Option<u16>,
    search: Option<String>,
}

async fn find_active<T: DeserializeOwned + serde::Serialize + Send + Sync>(
    client: &Client,
    collection_name: &str,
    params: &QueryParams,
) -> Result<Vec<T>, mongodb::error::Error> {
    let collection = mongo::collection::<T>(client, collection_name);

    let mut options = FindOptions::default();
    if let Some(limit) = params.limit {
        options.limit = Some(limit.into());
    }
    options.sort = Some(doc! { "name": 1 });

    let mut filter = doc! { "is_active": { "$ne": false } };
    if let Some(search_text) = &params.search {
        if !search_text.is_empty() {
            filter.insert(
                "name",
                doc! {
                    "$regex": format!("^{}", regex::escape(search_text)),
                    "$options": "i"
                },
            );
        }
    }

    collection
        .find(filter)
        .with_options(options)
        .await?
        .try_collect::<Vec<T>>()
        .await
}

pub async fn get_states(
    data: web::Data<Arc<Client>>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let client = data.into_inner();
    match find_active::<StateRegion>(&client, mongo::STATES, &params).await {
        Ok(states) => HttpResponse::Ok().json(states),
        Err(err) => {
            eprintln!("Failed to fetch states: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch states")
        }
    }
}

pub async fn get_universities(
    data: web::Data<Arc<Client>>,
    params: web::Query<QueryParams>,
) -> impl Responder {
    let client = data.into_inner();
    match find_active::<University>(&client, mongo::UNIVERSITIES, &params).await {
        Ok(universities) => HttpResponse::Ok().json(universities),
        Err(err) => {
            eprintln!("Failed to fetch universities: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch universities")
        }
    }
}
