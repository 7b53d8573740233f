// 🤝 Receiver Entity - organisations and people who claim donated food

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiverType {
    #[serde(rename = "Non-profit")]
    NonProfit,
    #[serde(rename = "Community Center")]
    CommunityCenter,
    Individual,
    Other,
}

impl ReceiverType {
    pub const ALL: [ReceiverType; 4] = [
        ReceiverType::NonProfit,
        ReceiverType::CommunityCenter,
        ReceiverType::Individual,
        ReceiverType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiverType::NonProfit => "Non-profit",
            ReceiverType::CommunityCenter => "Community Center",
            ReceiverType::Individual => "Individual",
            ReceiverType::Other => "Other",
        }
    }
}

text_enum!(ReceiverType, "receiver type");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub id: i64,
    pub name: String,
    pub contact: String,
    pub city: String,
    #[serde(rename = "type")]
    pub receiver_type: ReceiverType,
}

impl Receiver {
    pub(crate) const COLUMNS: &'static str = "id, name, contact, city, type";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Receiver {
            id: row.get(0)?,
            name: row.get(1)?,
            contact: row.get(2)?,
            city: row.get(3)?,
            receiver_type: row.get(4)?,
        })
    }
}

/// Input for registering a receiver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReceiver {
    pub name: String,
    pub contact: String,
    pub city: String,
    #[serde(rename = "type")]
    pub receiver_type: ReceiverType,
}

pub fn get_receiver(conn: &Connection, id: i64) -> rusqlite::Result<Option<Receiver>> {
    conn.query_row(
        &format!("SELECT {} FROM receivers WHERE id = ?1", Receiver::COLUMNS),
        params![id],
        Receiver::from_row,
    )
    .optional()
}

pub fn receiver_exists(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM receivers WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

pub fn get_all_receivers(conn: &Connection) -> rusqlite::Result<Vec<Receiver>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM receivers ORDER BY id",
        Receiver::COLUMNS
    ))?;

    let receivers = stmt
        .query_map([], Receiver::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(receivers)
}
