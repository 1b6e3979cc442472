use serde::{Deserialize, Serialize};

use crate::cache::ResourceFamily;
use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Location;
use crate::params::QueryParams;

const FAMILY: ResourceFamily = ResourceFamily::Locations;

impl ApiClient {
    pub async fn list_locations(&self, skip_cache: bool) -> Result<Vec<Location>, Error> {
        self.list(&FAMILY.collection_path(), &QueryParams::new(), skip_cache)
            .await
    }

    pub async fn get_location(&self, id: i64) -> Result<Location, Error> {
        self.read_as(&FAMILY.item_path(id), &QueryParams::new(), false)
            .await
    }

    pub async fn create_location<B: Serialize + ?Sized>(&self, body: &B) -> Result<Location, Error> {
        self.create(FAMILY, &FAMILY.collection_path(), body).await
    }

    pub async fn update_location<B: Serialize + ?Sized>(
        &self,
        id: i64,
        body: &B,
    ) -> Result<Location, Error> {
        self.update(FAMILY, &FAMILY.item_path(id), body).await
    }

    pub async fn delete_location(&self, id: i64) -> Result<(), Error> {
        self.remove(FAMILY, &FAMILY.item_path(id)).await
    }

    /// Distinct route names used to group locations (`GET /locations/routes/`).
    pub async fn list_routes(&self, skip_cache: bool) -> Result<Vec<String>, Error> {
        #[derive(Deserialize)]
        struct Routes {
            #[serde(default)]
            routes: Vec<String>,
        }

        let body: Routes = self
            .read_as("/locations/routes/", &QueryParams::new(), skip_cache)
            .await?;
        Ok(body.routes)
    }
}
