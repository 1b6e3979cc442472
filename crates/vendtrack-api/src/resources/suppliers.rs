use serde::Serialize;

use crate::cache::ResourceFamily;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Supplier;
use crate::params::QueryParams;

const FAMILY: ResourceFamily = ResourceFamily::Suppliers;

impl ApiClient {
    pub async fn list_suppliers(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Vec<Supplier>, Error> {
        self.list(&FAMILY.collection_path(), params, skip_cache).await
    }

    /// Suppliers with `is_active = true` (`GET /suppliers/active/`).
    pub async fn list_active_suppliers(&self, skip_cache: bool) -> Result<Vec<Supplier>, Error> {
        self.list("/suppliers/active/", &QueryParams::new(), skip_cache)
            .await
    }

    pub async fn get_supplier(&self, id: i64) -> Result<Supplier, Error> {
        self.read_as(&FAMILY.item_path(id), &QueryParams::new(), false)
            .await
    }

    pub async fn create_supplier<B: Serialize + ?Sized>(&self, body: &B) -> Result<Supplier, Error> {
        self.create(FAMILY, &FAMILY.collection_path(), body).await
    }

    pub async fn update_supplier<B: Serialize + ?Sized>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<Supplier, Error> {
        self.update(FAMILY, &FAMILY.item_path(id), body).await
    }

    pub async fn delete_supplier(&self, id: i64) -> Result<(), Error> {
        self.remove(FAMILY, &FAMILY.item_path(id)).await
    }

    /// Flip `is_active`; the backend answers with the updated supplier.
    pub async fn toggle_supplier_active(&self, id: i64) -> Result<Supplier, Error> {
        self.action(FAMILY, &format!("/suppliers/{id}/toggle_active/"))
            .await
    }
}
