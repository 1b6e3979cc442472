// Machine restocks and their per-product entries.
//
// Only the sequential visit save writes these directly; the bulk
// endpoints cover the normal path.

use serde::Serialize;

use crate::cache::ResourceFamily;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Restock, RestockEntry};
use crate::params::QueryParams;

const RESTOCKS: ResourceFamily = ResourceFamily::Restocks;
const ENTRIES: ResourceFamily = ResourceFamily::RestockEntries;

impl ApiClient {
    // ── Machine restocks ─────────────────────────────────────────────

    /// Filter with `visit` and/or `machine`.
    pub async fn list_restocks(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Vec<Restock>, Error> {
        self.list(&RESTOCKS.collection_path(), params, skip_cache)
            .await
    }

    pub async fn get_restock(&self, id: i64) -> Result<Restock, Error> {
        self.read_as(&RESTOCKS.item_path(id), &QueryParams::new(), false)
            .await
    }

    pub async fn create_restock<B: Serialize + ?Sized>(&self, body: &B) -> Result<Restock, Error> {
        self.create(RESTOCKS, &RESTOCKS.collection_path(), body)
            .await
    }

    pub async fn update_restock<B: Serialize + ?Sized>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<Restock, Error> {
        self.update(RESTOCKS, &RESTOCKS.item_path(id), body).await
    }

    pub async fn delete_restock(&self, id: i64) -> Result<(), Error> {
        self.remove(RESTOCKS, &RESTOCKS.item_path(id)).await
    }

    // ── Restock entries ──────────────────────────────────────────────

    /// Filter with `visit_machine_restock` and/or `product`.
    pub async fn list_restock_entries(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Vec<RestockEntry>, Error> {
        self.list(&ENTRIES.collection_path(), params, skip_cache)
            .await
    }

    pub async fn get_restock_entry(&self, id: i64) -> Result<RestockEntry, Error> {
        self.read_as(&ENTRIES.item_path(id), &QueryParams::new(), false)
            .await
    }

    pub async fn create_restock_entry<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<RestockEntry, Error> {
        self.create(ENTRIES, &ENTRIES.collection_path(), body).await
    }

    pub async fn update_restock_entry<B: Serialize + ?Sized>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<RestockEntry, Error> {
        self.update(ENTRIES, &ENTRIES.item_path(id), body).await
    }

    pub async fn delete_restock_entry(&self, id: i64) -> Result<(), Error> {
        self.remove(ENTRIES, &ENTRIES.item_path(id)).await
    }
}
