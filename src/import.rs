// 📥 CSV Import - bulk load the four donation tables
//
// Expected files in the import directory (any may be missing):
//   providers_data.csv, receivers_data.csv, food_listings_data.csv, claims_data.csv
//
// Rows keep their CSV ids. Rows the store rejects (duplicate id, second
// active claim, dangling reference, bad quantity) are counted as skipped,
// as are rows whose enum or date values don't parse.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, ErrorCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::db::{insert_event, Event};
use crate::entities::{
    ClaimStatus, FoodType, MealType, ProviderType, ReceiverType, TIMESTAMP_FORMAT,
};

pub const PROVIDERS_FILE: &str = "providers_data.csv";
pub const RECEIVERS_FILE: &str = "receivers_data.csv";
pub const LISTINGS_FILE: &str = "food_listings_data.csv";
pub const CLAIMS_FILE: &str = "claims_data.csv";

// ============================================================================
// CSV RECORDS
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ProviderRecord {
    #[serde(rename = "Provider_ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub provider_type: String,
    #[serde(rename = "Address", default)]
    pub address: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Contact")]
    pub contact: String,
}

#[derive(Debug, Deserialize)]
pub struct ReceiverRecord {
    #[serde(rename = "Receiver_ID")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub receiver_type: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Contact")]
    pub contact: String,
}

#[derive(Debug, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "Food_ID")]
    pub id: i64,
    #[serde(rename = "Food_Name")]
    pub food_name: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "Expiry_Date")]
    pub expiry_date: String,
    #[serde(rename = "Provider_ID")]
    pub provider_id: i64,
    #[serde(rename = "Provider_Type")]
    pub provider_type: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Food_Type")]
    pub food_type: String,
    #[serde(rename = "Meal_Type")]
    pub meal_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRecord {
    #[serde(rename = "Claim_ID")]
    pub id: i64,
    #[serde(rename = "Food_ID")]
    pub food_id: i64,
    #[serde(rename = "Receiver_ID")]
    pub receiver_id: i64,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableImport {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub providers: TableImport,
    pub receivers: TableImport,
    pub food_listings: TableImport,
    pub claims: TableImport,
}

// ============================================================================
// PARSING HELPERS
// ============================================================================

/// Accepts YYYY-MM-DD or MM/DD/YYYY
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%m/%d/%Y"))
        .ok()
}

/// Accepts YYYY-MM-DD HH:MM[:SS] or MM/DD/YYYY HH:MM[:SS]
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

pub fn load_records<T: DeserializeOwned>(csv_path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file {}", csv_path.display()))?;

    let mut records = Vec::new();
    for (line, result) in rdr.deserialize().enumerate() {
        let record: T = result
            .with_context(|| format!("Failed to deserialize {} row {}", csv_path.display(), line + 2))?;
        records.push(record);
    }

    Ok(records)
}

/// Outcome of one insert: constraint violations count as skips, anything else is fatal
fn record_insert(result: rusqlite::Result<usize>, stats: &mut TableImport, table: &str, id: i64) -> Result<()> {
    match result {
        Ok(_) => stats.inserted += 1,
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
            warn!(table, id, "row rejected by store constraints");
            stats.skipped += 1;
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to insert {table} row {id}")),
    }
    Ok(())
}

fn skip_unparsable(stats: &mut TableImport, table: &str, id: i64, reason: &str) {
    warn!(table, id, reason, "row skipped");
    stats.skipped += 1;
}

// ============================================================================
// TABLE IMPORTS
// ============================================================================

pub fn insert_providers(conn: &Connection, records: &[ProviderRecord]) -> Result<TableImport> {
    let mut stats = TableImport::default();

    for rec in records {
        let provider_type: ProviderType = match rec.provider_type.parse() {
            Ok(t) => t,
            Err(e) => {
                skip_unparsable(&mut stats, "providers", rec.id, &e.to_string());
                continue;
            }
        };
        if rec.name.is_empty() || rec.contact.is_empty() || rec.city.is_empty() {
            skip_unparsable(&mut stats, "providers", rec.id, "missing required text");
            continue;
        }

        let result = conn.execute(
            "INSERT INTO providers (id, name, contact, address, city, type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![rec.id, rec.name, rec.contact, rec.address, rec.city, provider_type],
        );
        record_insert(result, &mut stats, "providers", rec.id)?;
    }

    Ok(stats)
}

pub fn insert_receivers(conn: &Connection, records: &[ReceiverRecord]) -> Result<TableImport> {
    let mut stats = TableImport::default();

    for rec in records {
        let receiver_type: ReceiverType = match rec.receiver_type.parse() {
            Ok(t) => t,
            Err(e) => {
                skip_unparsable(&mut stats, "receivers", rec.id, &e.to_string());
                continue;
            }
        };
        if rec.name.is_empty() || rec.contact.is_empty() || rec.city.is_empty() {
            skip_unparsable(&mut stats, "receivers", rec.id, "missing required text");
            continue;
        }

        let result = conn.execute(
            "INSERT INTO receivers (id, name, contact, city, type) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![rec.id, rec.name, rec.contact, rec.city, receiver_type],
        );
        record_insert(result, &mut stats, "receivers", rec.id)?;
    }

    Ok(stats)
}

/// Listings keep the provider type and location recorded in the file
pub fn insert_listings(conn: &Connection, records: &[ListingRecord]) -> Result<TableImport> {
    let mut stats = TableImport::default();

    for rec in records {
        let parsed = (
            rec.provider_type.parse::<ProviderType>(),
            rec.food_type.parse::<FoodType>(),
            rec.meal_type.parse::<MealType>(),
            parse_date(&rec.expiry_date),
        );
        let (provider_type, food_type, meal_type, expiry_date) = match parsed {
            (Ok(p), Ok(f), Ok(m), Some(d)) => (p, f, m, d),
            (Err(e), ..) | (_, Err(e), ..) | (_, _, Err(e), _) => {
                skip_unparsable(&mut stats, "food_listings", rec.id, &e.to_string());
                continue;
            }
            (.., None) => {
                skip_unparsable(&mut stats, "food_listings", rec.id, "unparsable expiry date");
                continue;
            }
        };
        if rec.food_name.is_empty() {
            skip_unparsable(&mut stats, "food_listings", rec.id, "missing food name");
            continue;
        }

        let result = conn.execute(
            "INSERT INTO food_listings (id, provider_id, provider_type, location, food_name,
                food_type, quantity, expiry_date, meal_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                rec.id,
                rec.provider_id,
                provider_type,
                rec.location,
                rec.food_name,
                food_type,
                rec.quantity,
                expiry_date,
                meal_type,
            ],
        );
        record_insert(result, &mut stats, "food_listings", rec.id)?;
    }

    Ok(stats)
}

/// Claims may carry any status; a second active claim for a listing is skipped
pub fn insert_claims(conn: &Connection, records: &[ClaimRecord]) -> Result<TableImport> {
    let mut stats = TableImport::default();

    for rec in records {
        let status: ClaimStatus = match rec.status.parse() {
            Ok(s) => s,
            Err(e) => {
                skip_unparsable(&mut stats, "claims", rec.id, &e.to_string());
                continue;
            }
        };
        let Some(timestamp) = parse_timestamp(&rec.timestamp) else {
            skip_unparsable(&mut stats, "claims", rec.id, "unparsable timestamp");
            continue;
        };

        let result = conn.execute(
            "INSERT INTO claims (id, food_id, receiver_id, status, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                rec.id,
                rec.food_id,
                rec.receiver_id,
                status,
                timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ],
        );
        record_insert(result, &mut stats, "claims", rec.id)?;
    }

    Ok(stats)
}

fn import_file<T, F>(conn: &Connection, dir: &Path, file: &str, insert: F) -> Result<TableImport>
where
    T: DeserializeOwned,
    F: FnOnce(&Connection, &[T]) -> Result<TableImport>,
{
    let path = dir.join(file);
    if !path.exists() {
        info!(file, "no CSV file, skipping table");
        return Ok(TableImport::default());
    }

    let records: Vec<T> = load_records(&path)?;
    let stats = insert(conn, &records)?;
    info!(file, inserted = stats.inserted, skipped = stats.skipped, "imported CSV");
    Ok(stats)
}

/// Import every known CSV file in `dir` inside a single transaction
pub fn import_directory(conn: &mut Connection, dir: &Path) -> Result<ImportSummary> {
    let tx = conn.transaction().context("Failed to start import transaction")?;

    let summary = ImportSummary {
        providers: import_file(&tx, dir, PROVIDERS_FILE, insert_providers)?,
        receivers: import_file(&tx, dir, RECEIVERS_FILE, insert_receivers)?,
        food_listings: import_file(&tx, dir, LISTINGS_FILE, insert_listings)?,
        claims: import_file(&tx, dir, CLAIMS_FILE, insert_claims)?,
    };

    insert_event(
        &tx,
        &Event::new(
            "csv_imported",
            "import",
            dir.display(),
            serde_json::to_value(summary)?,
            "csv_importer",
        ),
    )?;

    tx.commit().context("Failed to commit import")?;
    Ok(summary)
}
