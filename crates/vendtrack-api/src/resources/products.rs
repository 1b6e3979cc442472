use serde::Serialize;

use crate::cache::ResourceFamily;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Product, ProductCost};
use crate::params::QueryParams;

const FAMILY: ResourceFamily = ResourceFamily::Products;

impl ApiClient {
    pub async fn list_products(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Vec<Product>, Error> {
        self.list(&FAMILY.collection_path(), params, skip_cache).await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product, Error> {
        self.read_as(&FAMILY.item_path(id), &QueryParams::new(), false)
            .await
    }

    pub async fn create_product<B: Serialize + ?Sized>(&self, body: &B) -> Result<Product, Error> {
        self.create(FAMILY, &FAMILY.collection_path(), body).await
    }

    pub async fn update_product<B: Serialize + ?Sized>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<Product, Error> {
        self.update(FAMILY, &FAMILY.item_path(id), body).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), Error> {
        self.remove(FAMILY, &FAMILY.item_path(id)).await
    }

    // ── Cost history ─────────────────────────────────────────────────

    /// Every recorded unit cost for one product, oldest first as served.
    pub async fn product_cost_history(
        &self,
        product_id: i64,
        skip_cache: bool,
    ) -> Result<Vec<ProductCost>, Error> {
        let params = QueryParams::new().with("product", product_id);
        self.list(
            &ResourceFamily::ProductCosts.collection_path(),
            &params,
            skip_cache,
        )
        .await
    }
}
