// Visits, including the whole-visit bulk endpoints.
//
// A bulk save creates or replaces the visit, its machine restocks and their
// entries in one transaction on the backend, so it invalidates the same
// views as any other visit write.

use serde::Serialize;

use crate::cache::ResourceFamily;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{BulkVisitPayload, Visit};
use crate::params::QueryParams;

const FAMILY: ResourceFamily = ResourceFamily::Visits;

impl ApiClient {
    pub async fn list_visits(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Vec<Visit>, Error> {
        self.list(&FAMILY.collection_path(), params, skip_cache).await
    }

    pub async fn get_visit(&self, id: i64) -> Result<Visit, Error> {
        self.read_as(&FAMILY.item_path(id), &QueryParams::new(), false)
            .await
    }

    pub async fn create_visit<B: Serialize + ?Sized>(&self, body: &B) -> Result<Visit, Error> {
        self.create(FAMILY, &FAMILY.collection_path(), body).await
    }

    pub async fn update_visit<B: Serialize + ?Sized>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<Visit, Error> {
        self.update(FAMILY, &FAMILY.item_path(id), body).await
    }

    pub async fn delete_visit(&self, id: i64) -> Result<(), Error> {
        self.remove(FAMILY, &FAMILY.item_path(id)).await
    }

    // ── Bulk ─────────────────────────────────────────────────────────

    /// `POST /visits/bulk-save/`: create a visit with every restock at once.
    pub async fn create_visit_bulk(&self, payload: &BulkVisitPayload) -> Result<Visit, Error> {
        self.create(FAMILY, "/visits/bulk-save/", payload).await
    }

    /// `PUT /visits/{id}/bulk-update/`: replace a visit's restocks wholesale.
    pub async fn update_visit_bulk(
        &self,
        id: i64,
        payload: &BulkVisitPayload,
    ) -> Result<Visit, Error> {
        self.update(FAMILY, &format!("/visits/{id}/bulk-update/"), payload)
            .await
    }
}
