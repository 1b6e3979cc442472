// Products slotted into machines, with sell prices and current stock.

use serde::Serialize;

use crate::cache::ResourceFamily;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::MachineItem;
use crate::params::QueryParams;

const FAMILY: ResourceFamily = ResourceFamily::MachineItems;

impl ApiClient {
    /// Slot assignments, usually filtered by `machine`.
    pub async fn list_machine_items(
        &self,
        params: &QueryParams,
        skip_cache: bool,
    ) -> Result<Vec<MachineItem>, Error> {
        self.list(&FAMILY.collection_path(), params, skip_cache).await
    }

    pub async fn get_machine_item(&self, id: i64) -> Result<MachineItem, Error> {
        self.read_as(&FAMILY.item_path(id), &QueryParams::new(), false)
            .await
    }

    pub async fn create_machine_item<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<MachineItem, Error> {
        self.create(FAMILY, &FAMILY.collection_path(), body).await
    }

    pub async fn update_machine_item<B: Serialize + ?Sized>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<MachineItem, Error> {
        self.update(FAMILY, &FAMILY.item_path(id), body).await
    }

    pub async fn delete_machine_item(&self, id: i64) -> Result<(), Error> {
        self.remove(FAMILY, &FAMILY.item_path(id)).await
    }
}
