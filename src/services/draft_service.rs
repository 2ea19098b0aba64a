use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::{Client, Collection};

use crate::db::mongo;
use crate::models::booking_flow::{BookingDraft, BookingFlow};

/// Server-side wizard drafts. One in-progress wizard per rider, single-use:
/// a draft is only removed once its flow completes successfully, so a failed
/// payment or insert leaves it in place for a retry.
pub struct DraftService;

impl DraftService {
    fn collection(client: &Client) -> Collection<BookingDraft> {
        mongo::collection::<BookingDraft>(client, mongo::BOOKING_DRAFTS)
    }

    /// Open a fresh draft. Starting over discards whatever the rider had in
    /// progress before.
    pub async fn start(
        client: &Client,
        user_id: ObjectId,
        flow: BookingFlow,
    ) -> Result<BookingDraft, mongodb::error::Error> {
        let collection = Self::collection(client);

        if let Err(err) = collection.delete_many(doc! { "user_id": user_id }).await {
            eprintln!("Failed to clear previous drafts: {:?}", err);
        }

        let now = DateTime::now();
        let mut draft = BookingDraft {
            id: None,
            user_id,
            flow,
            created_at: Some(now),
            updated_at: Some(now),
        };
        let result = collection.insert_one(&draft).await?;
        draft.id = result.inserted_id.as_object_id();
        Ok(draft)
    }

    /// A draft is only visible to the rider who opened it.
    pub async fn find_owned(
        client: &Client,
        draft_id: ObjectId,
        user_id: ObjectId,
    ) -> Result<Option<BookingDraft>, mongodb::error::Error> {
        Self::collection(client)
            .find_one(doc! { "_id": draft_id, "user_id": user_id })
            .await
    }

    pub async fn latest(
        client: &Client,
        user_id: ObjectId,
    ) -> Result<Option<BookingDraft>, mongodb::error::Error> {
        Self::collection(client)
            .find_one(doc! { "user_id": user_id })
            .sort(doc! { "updated_at": -1 })
            .await
    }

    pub async fn save_flow(
        client: &Client,
        draft: &BookingDraft,
        flow: &BookingFlow,
    ) -> Result<(), mongodb::error::Error> {
        let flow_bson = mongodb::bson::to_bson(flow).map_err(mongodb::error::Error::custom)?;
        Self::collection(client)
            .update_one(
                doc! { "_id": draft.id },
                doc! { "$set": { "flow": flow_bson, "updated_at": DateTime::now() } },
            )
            .await?;
        Ok(())
    }

    /// Remove a consumed draft. Errors are logged, not surfaced: at this
    /// point the booking already exists and a leftover draft is harmless.
    pub async fn consume(client: &Client, draft: &BookingDraft) {
        if let Err(err) = Self::collection(client)
            .delete_one(doc! { "_id": draft.id })
            .await
        {
            eprintln!("Failed to delete consumed draft: {:?}", err);
        }
    }
}
