// Restock visits: the editable form and the two ways of saving it.

pub mod form;
pub mod save;

pub use form::{FormError, MachineRows, ProductRow, RestockForm, VISIT_DATE_FORMAT};
pub use save::{RestockEditor, SAVE_FAILED};
