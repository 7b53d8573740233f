// Entity Models
//
// Four flat, append-mostly entities. Enum columns are stored as their
// display names so the database stays readable from the sqlite3 shell.

pub mod provider;
pub mod receiver;
pub mod listing;
pub mod claim;

pub use provider::{Provider, ProviderType, NewProvider, get_provider, get_all_providers};
pub use receiver::{Receiver, ReceiverType, NewReceiver, get_receiver, get_all_receivers};
pub use listing::{FoodListing, FoodType, MealType, NewListing, get_listing, get_all_listings};
pub use claim::{Claim, ClaimStatus, get_claim, get_claims_for_listing};

/// Stored format for claim timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Implements parsing, display and SQLite text mapping for a fieldless enum
/// that exposes `ALL` and `as_str()`.
macro_rules! text_enum {
    ($ty:ty, $kind:literal) => {
        impl std::str::FromStr for $ty {
            type Err = crate::error::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == trimmed)
                    .ok_or_else(|| crate::error::ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl rusqlite::types::ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }

        impl rusqlite::types::FromSql for $ty {
            fn column_result(
                value: rusqlite::types::ValueRef<'_>,
            ) -> rusqlite::types::FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

pub(crate) use text_enum;
