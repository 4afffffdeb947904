pub mod aggregator;
pub mod budget;
pub mod calculator;
pub mod comparison;
pub mod csv_io;
pub mod format;
pub mod payment;
pub mod policy;
pub mod project;
pub mod store;

pub use csv_io::{CreatedRow, ImportReport, RowError};
pub use policy::ItemView;
pub use project::{ProjectService, ServiceError};
pub use store::{ItemDefaults, ItemStore};
