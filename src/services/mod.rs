pub mod bootstrap;
pub mod repository;
pub mod signals;
pub mod sqlite_store;
pub mod validation;

pub use bootstrap::{seed_if_empty, BootstrapError, RowOutcome, RowResult, SeedOutcome, SeedReport};
pub use repository::{MarketDataRepository, StoreError};
pub use signals::{CrossoverEngine, SignalError};
pub use sqlite_store::SqliteStore;
pub use validation::{validate_new_record, FieldError, ValidationErrors};
