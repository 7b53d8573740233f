// 🧾 Claim Entity - a receiver's reservation against one listing

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    Pending,
    Completed,
    Cancelled,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 3] = [
        ClaimStatus::Pending,
        ClaimStatus::Completed,
        ClaimStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Pending => "Pending",
            ClaimStatus::Completed => "Completed",
            ClaimStatus::Cancelled => "Cancelled",
        }
    }
}

text_enum!(ClaimStatus, "claim status");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: i64,
    pub food_id: i64,
    pub receiver_id: i64,
    pub status: ClaimStatus,
    pub timestamp: NaiveDateTime,
}

impl Claim {
    pub(crate) const COLUMNS: &'static str = "id, food_id, receiver_id, status, timestamp";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Claim {
            id: row.get(0)?,
            food_id: row.get(1)?,
            receiver_id: row.get(2)?,
            status: row.get(3)?,
            timestamp: row.get(4)?,
        })
    }
}

pub fn get_claim(conn: &Connection, id: i64) -> rusqlite::Result<Option<Claim>> {
    conn.query_row(
        &format!("SELECT {} FROM claims WHERE id = ?1", Claim::COLUMNS),
        params![id],
        Claim::from_row,
    )
    .optional()
}

/// Every claim ever made against a listing, oldest first
pub fn get_claims_for_listing(conn: &Connection, food_id: i64) -> rusqlite::Result<Vec<Claim>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM claims WHERE food_id = ?1 ORDER BY id",
        Claim::COLUMNS
    ))?;

    let claims = stmt
        .query_map(params![food_id], Claim::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(claims)
}
