use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, Collection, IndexModel,
};
use std::sync::Arc;
use std::time::Duration;

/// Single application database; collection names mirror the tables the
/// marketplace frontends talk about.
pub const DB_NAME: &str = "unirides";

pub const PROFILES: &str = "profiles";
pub const DRIVER_PROFILES: &str = "driver_profiles";
pub const STATES: &str = "states";
pub const UNIVERSITIES: &str = "universities";
pub const VEHICLES: &str = "vehicles";
pub const ROUTE_PRICING: &str = "route_pricing";
pub const ROUTE_VEHICLE_PRICING: &str = "route_vehicle_pricing";
pub const RIDES: &str = "rides";
pub const BOOKINGS: &str = "bookings";
pub const BOOKING_DRAFTS: &str = "booking_drafts";

pub fn collection<T: Send + Sync>(client: &Client, name: &str) -> Collection<T> {
    client.database(DB_NAME).collection::<T>(name)
}

pub async fn create_mongo_client(uri: &String) -> Arc<Client> {
    println!("Connecting to MongoDB...");

    // Configure MongoDB client options with more robust settings
    let mut client_options = ClientOptions::parse(uri)
        .await
        .expect("MongoDB URI may be incorrect! Failed to parse.");

    // Set a reasonable timeout for operations
    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    // Set the server API if using MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    // Create the client and check if it can connect
    let client =
        Client::with_options(client_options).expect("Failed to create MongoDB client with options");

    // Test the connection to make sure it works
    match client
        .database(DB_NAME)
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => println!("Successfully connected to MongoDB and verified with ping command"),
        Err(e) => {
            eprintln!("WARNING: Connected to MongoDB but ping test failed: {}", e);
            eprintln!("The API may still work, but some functionality might be impaired");
        }
    }

    Arc::new(client)
}

/// Indexes the API relies on: duplicate signups surface through the unique
/// email index (write error 11000), and booking recounts go through ride_id.
pub async fn ensure_indexes(client: &Client) {
    let unique_email = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    if let Err(e) = collection::<bson::Document>(client, PROFILES)
        .create_index(unique_email)
        .await
    {
        log::warn!("Failed to ensure unique email index on profiles: {}", e);
    }

    let booking_ride = IndexModel::builder().keys(doc! { "ride_id": 1 }).build();
    if let Err(e) = collection::<bson::Document>(client, BOOKINGS)
        .create_index(booking_ride)
        .await
    {
        log::warn!("Failed to ensure ride_id index on bookings: {}", e);
    }

    for locations in [STATES, UNIVERSITIES] {
        let unique_name = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        if let Err(e) = collection::<bson::Document>(client, locations)
            .create_index(unique_name)
            .await
        {
            log::warn!("Failed to ensure unique name index on {}: {}", locations, e);
        }
    }

    let draft_owner = IndexModel::builder()
        .keys(doc! { "user_id": 1, "updated_at": -1 })
        .build();
    if let Err(e) = collection::<bson::Document>(client, BOOKING_DRAFTS)
        .create_index(draft_owner)
        .await
    {
        log::warn!("Failed to ensure owner index on booking_drafts: {}", e);
    }
}
