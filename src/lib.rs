// Food Rescue Ledger - Core Library
// Exposes the donation store, report catalog and claim broker to the CLI,
// the API server and tests

pub mod db;
pub mod error;
pub mod entities;
pub mod aggregate;      // Grouping, ranking, percentages, date windows
pub mod reports;        // The fifteen-report catalog
pub mod claims;         // Claim broker: claimable inventory + atomic claim
pub mod registrar;      // Providers, receivers and new listings
pub mod import;         // CSV bulk load
pub mod config;
pub mod telemetry;

// Re-export commonly used types
pub use db::{
    Event, TableCounts,
    open_database, setup_database, table_counts,
    insert_event, get_events_for_entity,
};
pub use error::{FoodError, FoodResult, ParseEnumError};
pub use entities::{
    Provider, ProviderType, NewProvider,
    Receiver, ReceiverType, NewReceiver,
    FoodListing, FoodType, MealType, NewListing,
    Claim, ClaimStatus,
    get_provider, get_all_providers, get_receiver, get_all_receivers,
    get_listing, get_all_listings, get_claim, get_claims_for_listing,
};
pub use aggregate::Grouped;
pub use reports::{Report, ReportOutput, ReportParams, run_all};
pub use claims::{list_claimable, claim_food, is_claimable, local_now, local_today};
pub use registrar::{list_food, register_provider, register_receiver};
pub use import::{import_directory, ImportSummary, TableImport};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
