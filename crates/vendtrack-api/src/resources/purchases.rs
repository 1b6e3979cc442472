// Wholesale purchases. A purchase changes a product's average cost, so
// writes also drop cached product and product-cost reads.

use serde::Serialize;

use crate::cache::ResourceFamily;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Purchase;
use crate::params::QueryParams;

const FAMILY: ResourceFamily = ResourceFamily::Purchases;

impl ApiClient {
    pub async fn list_purchases(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Vec<Purchase>, Error> {
        self.list(&FAMILY.collection_path(), params, skip_cache).await
    }

    pub async fn get_purchase(&self, id: i64) -> Result<Purchase, Error> {
        self.read_as(&FAMILY.item_path(id), &QueryParams::new(), false)
            .await
    }

    pub async fn create_purchase<B: Serialize + ?Sized>(&self, body: &B) -> Result<Purchase, Error> {
        self.create(FAMILY, &FAMILY.collection_path(), body).await
    }

    pub async fn update_purchase<B: Serialize + ?Sized>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<Purchase, Error> {
        self.update(FAMILY, &FAMILY.item_path(id), body).await
    }

    pub async fn delete_purchase(&self, id: i64) -> Result<(), Error> {
        self.remove(FAMILY, &FAMILY.item_path(id)).await
    }
}
