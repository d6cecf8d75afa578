pub mod error;
#[cfg(test)]
pub mod fake;
pub mod gateway;
pub mod models;
pub mod postgres;
#[cfg(test)]
mod tests;

pub use error::CatalogError;
#[cfg(test)]
pub use fake::FakeCatalog;
pub use gateway::Catalog;
pub use models::{
    Assignment, EventType, ImageRecord, ImageSource, ImageStatus, IngestEvent, NewDerivative,
    NewImage,
};
#[allow(unused_imports)]
pub use postgres::PostgresCatalog;

/// Role under which this pipeline assigns images to cards.
pub const PRIMARY_FRONT_ROLE: &str = "primary_front";
