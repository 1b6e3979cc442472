// Endpoint methods, one file per resource family.
//
// Every file is an `impl ApiClient` block. Reads take a parameter bag and
// a `skip_cache` flag; writes go through `ApiClient::{create, update,
// remove}` so invalidation always follows the dependency table.

mod locations;
mod machine_items;
mod machines;
mod products;
mod purchases;
pub mod reports;
mod restocks;
mod suppliers;
mod visits;
