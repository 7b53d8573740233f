// 🏪 Provider Entity - restaurants, bakeries and shops donating surplus food

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::text_enum;

// ============================================================================
// PROVIDER TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderType {
    Restaurant,
    Bakery,
    Supermarket,
    #[serde(rename = "Grocery Store")]
    GroceryStore,
    #[serde(rename = "Catering Service")]
    CateringService,
}

impl ProviderType {
    pub const ALL: [ProviderType; 5] = [
        ProviderType::Restaurant,
        ProviderType::Bakery,
        ProviderType::Supermarket,
        ProviderType::GroceryStore,
        ProviderType::CateringService,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Restaurant => "Restaurant",
            ProviderType::Bakery => "Bakery",
            ProviderType::Supermarket => "Supermarket",
            ProviderType::GroceryStore => "Grocery Store",
            ProviderType::CateringService => "Catering Service",
        }
    }
}

text_enum!(ProviderType, "provider type");

// ============================================================================
// PROVIDER ENTITY
// ============================================================================

/// A registered food provider. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub contact: String,
    pub address: String,
    pub city: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
}

impl Provider {
    pub(crate) const COLUMNS: &'static str = "id, name, contact, address, city, type";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Provider {
            id: row.get(0)?,
            name: row.get(1)?,
            contact: row.get(2)?,
            address: row.get(3)?,
            city: row.get(4)?,
            provider_type: row.get(5)?,
        })
    }
}

/// Input for registering a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProvider {
    pub name: String,
    pub contact: String,
    #[serde(default)]
    pub address: String,
    pub city: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
}

pub fn get_provider(conn: &Connection, id: i64) -> rusqlite::Result<Option<Provider>> {
    conn.query_row(
        &format!("SELECT {} FROM providers WHERE id = ?1", Provider::COLUMNS),
        params![id],
        Provider::from_row,
    )
    .optional()
}

pub fn get_all_providers(conn: &Connection) -> rusqlite::Result<Vec<Provider>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM providers ORDER BY id",
        Provider::COLUMNS
    ))?;

    let providers = stmt
        .query_map([], Provider::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(providers)
}
