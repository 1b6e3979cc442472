use serde::Serialize;

use crate::cache::ResourceFamily;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Machine;
use crate::params::QueryParams;

const FAMILY: ResourceFamily = ResourceFamily::Machines;

impl ApiClient {
    /// Machines, optionally filtered (e.g. `location`).
    pub async fn list_machines(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Vec<Machine>, Error> {
        self.list(&FAMILY.collection_path(), params, skip_cache).await
    }

    pub async fn get_machine(&self, id: i64) -> Result<Machine, Error> {
        self.read_as(&FAMILY.item_path(id), &QueryParams::new(), false)
            .await
    }

    pub async fn create_machine<B: Serialize + ?Sized>(&self, body: &B) -> Result<Machine, Error> {
        self.create(FAMILY, &FAMILY.collection_path(), body).await
    }

    pub async fn update_machine<B: Serialize + ?Sized>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<Machine, Error> {
        self.update(FAMILY, &FAMILY.item_path(id), body).await
    }

    pub async fn delete_machine(&self, id: i64) -> Result<(), Error> {
        self.remove(FAMILY, &FAMILY.item_path(id)).await
    }
}
