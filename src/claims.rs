// 🛒 Claim Broker - claimable inventory and the atomic claim transition
//
// A listing is claimable when no active claim (Pending or Completed)
// references it and its expiry date is strictly after today. The check and
// the insert run inside one IMMEDIATE transaction, so the write lock is held
// from the moment claimability is read until the new claim is committed.

use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, ErrorCode, TransactionBehavior};
use tracing::{info, warn};

use crate::aggregate::NO_ACTIVE_CLAIM;
use crate::db::{insert_event, Event};
use crate::entities::receiver::receiver_exists;
use crate::entities::{ClaimStatus, FoodListing, TIMESTAMP_FORMAT};
use crate::error::{FoodError, FoodResult};

/// Wall-clock timestamp used for new claims
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Wall-clock date used for claimability and expiry windows
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Every listing that can be claimed right now, ordered by listing id
pub fn list_claimable(conn: &Connection, today: NaiveDate) -> FoodResult<Vec<FoodListing>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {}
         FROM food_listings f
         WHERE {NO_ACTIVE_CLAIM}
           AND f.expiry_date > ?1
         ORDER BY f.id",
        FoodListing::COLUMNS
    ))?;

    let listings = stmt
        .query_map(params![today], FoodListing::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(listings)
}

/// Same predicate as `list_claimable`, narrowed to one listing
pub fn is_claimable(conn: &Connection, food_id: i64, today: NaiveDate) -> FoodResult<bool> {
    let claimable = conn.query_row(
        &format!(
            "SELECT EXISTS(
                SELECT 1 FROM food_listings f
                WHERE f.id = ?1
                  AND {NO_ACTIVE_CLAIM}
                  AND f.expiry_date > ?2
            )"
        ),
        params![food_id, today],
        |row| row.get(0),
    )?;

    Ok(claimable)
}

/// Claim `food_id` for `receiver_id`, returning the new claim's id.
///
/// Fails with [`FoodError::NotClaimable`] when the listing does not exist, is
/// already actively claimed, or has expired as of `now`; and with
/// [`FoodError::UnknownReceiver`] when the receiver is not registered.
pub fn claim_food(
    conn: &mut Connection,
    food_id: i64,
    receiver_id: i64,
    now: NaiveDateTime,
) -> FoodResult<i64> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if !is_claimable(&tx, food_id, now.date())? {
        return Err(FoodError::NotClaimable(food_id));
    }

    if !receiver_exists(&tx, receiver_id)? {
        return Err(FoodError::UnknownReceiver(receiver_id));
    }

    let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
    let inserted = tx.execute(
        "INSERT INTO claims (food_id, receiver_id, status, timestamp)
         VALUES (?1, ?2, ?3, ?4)",
        params![food_id, receiver_id, ClaimStatus::Pending, timestamp],
    );

    match inserted {
        Ok(_) => {}
        // The active-claim unique index caught a writer that bypassed the lock
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            warn!(food_id, receiver_id, "active claim index rejected a second claim");
            return Err(FoodError::NotClaimable(food_id));
        }
        Err(e) => return Err(e.into()),
    }

    let claim_id = tx.last_insert_rowid();

    insert_event(
        &tx,
        &Event::new(
            "claim_created",
            "claim",
            claim_id,
            serde_json::json!({
                "food_id": food_id,
                "receiver_id": receiver_id,
                "status": ClaimStatus::Pending.as_str(),
                "timestamp": timestamp,
            }),
            "claim_broker",
        ),
    )?;

    tx.commit()?;

    info!(claim_id, food_id, receiver_id, "food claimed");
    Ok(claim_id)
}
