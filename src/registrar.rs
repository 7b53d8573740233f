// ➕ Listing Registrar - providers, receivers and new food listings
//
// Simple validated inserts. A new listing copies its provider's current type
// and city; later changes to the provider never touch existing listings.

use rusqlite::{params, Connection};
use tracing::info;

use crate::db::{insert_event, Event};
use crate::entities::provider::get_provider;
use crate::entities::{NewListing, NewProvider, NewReceiver};
use crate::error::{FoodError, FoodResult};

fn require_text(field: &'static str, value: &str) -> FoodResult<()> {
    if value.trim().is_empty() {
        return Err(FoodError::invalid(field, "must not be empty"));
    }
    Ok(())
}

pub fn register_provider(conn: &Connection, provider: &NewProvider) -> FoodResult<i64> {
    require_text("name", &provider.name)?;
    require_text("contact", &provider.contact)?;
    require_text("city", &provider.city)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO providers (name, contact, address, city, type)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            provider.name,
            provider.contact,
            provider.address,
            provider.city,
            provider.provider_type,
        ],
    )?;
    let id = tx.last_insert_rowid();

    insert_event(
        &tx,
        &Event::new(
            "provider_registered",
            "provider",
            id,
            serde_json::json!({
                "name": provider.name,
                "city": provider.city,
                "type": provider.provider_type.as_str(),
            }),
            "registrar",
        ),
    )?;
    tx.commit()?;

    info!(provider_id = id, city = %provider.city, "provider registered");
    Ok(id)
}

pub fn register_receiver(conn: &Connection, receiver: &NewReceiver) -> FoodResult<i64> {
    require_text("name", &receiver.name)?;
    require_text("contact", &receiver.contact)?;
    require_text("city", &receiver.city)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO receivers (name, contact, city, type) VALUES (?1, ?2, ?3, ?4)",
        params![
            receiver.name,
            receiver.contact,
            receiver.city,
            receiver.receiver_type,
        ],
    )?;
    let id = tx.last_insert_rowid();

    insert_event(
        &tx,
        &Event::new(
            "receiver_registered",
            "receiver",
            id,
            serde_json::json!({
                "name": receiver.name,
                "city": receiver.city,
                "type": receiver.receiver_type.as_str(),
            }),
            "registrar",
        ),
    )?;
    tx.commit()?;

    info!(receiver_id = id, city = %receiver.city, "receiver registered");
    Ok(id)
}

/// Record a new food listing for an existing provider
pub fn list_food(conn: &Connection, listing: &NewListing) -> FoodResult<i64> {
    require_text("food_name", &listing.food_name)?;
    if listing.quantity < 1 {
        return Err(FoodError::invalid(
            "quantity",
            format!("must be at least 1, got {}", listing.quantity),
        ));
    }

    let tx = conn.unchecked_transaction()?;

    let provider = get_provider(&tx, listing.provider_id)?
        .ok_or(FoodError::UnknownProvider(listing.provider_id))?;

    tx.execute(
        "INSERT INTO food_listings (provider_id, provider_type, location, food_name,
            food_type, quantity, expiry_date, meal_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            provider.id,
            provider.provider_type,
            provider.city,
            listing.food_name,
            listing.food_type,
            listing.quantity,
            listing.expiry_date,
            listing.meal_type,
        ],
    )?;
    let id = tx.last_insert_rowid();

    insert_event(
        &tx,
        &Event::new(
            "food_listed",
            "food_listing",
            id,
            serde_json::json!({
                "provider_id": provider.id,
                "food_name": listing.food_name,
                "quantity": listing.quantity,
                "expiry_date": listing.expiry_date.to_string(),
            }),
            "registrar",
        ),
    )?;
    tx.commit()?;

    info!(
        listing_id = id,
        provider_id = provider.id,
        quantity = listing.quantity,
        "food listed"
    );
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_events_for_entity, setup_database, table_counts};
    use crate::entities::listing::get_listing;
    use crate::entities::{FoodType, MealType, ProviderType, ReceiverType};
    use chrono::NaiveDate;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn bakery(city: &str) -> NewProvider {
        NewProvider {
            name: "Sunrise Bakery".to_string(),
            contact: "+1-555-0100".to_string(),
            address: "1 Main St".to_string(),
            city: city.to_string(),
            provider_type: ProviderType::Bakery,
        }
    }

    fn bread(provider_id: i64, quantity: i64) -> NewListing {
        NewListing {
            provider_id,
            food_name: "Sourdough".to_string(),
            food_type: FoodType::Bakery,
            quantity,
            expiry_date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            meal_type: MealType::Breakfast,
        }
    }

    #[test]
    fn test_list_food_denormalizes_provider() {
        let conn = setup();
        let provider_id = register_provider(&conn, &bakery("Springfield")).unwrap();

        let listing_id = list_food(&conn, &bread(provider_id, 8)).unwrap();
        let listing = get_listing(&conn, listing_id).unwrap().unwrap();

        assert_eq!(listing.provider_type, ProviderType::Bakery);
        assert_eq!(listing.location, "Springfield");
        assert_eq!(listing.quantity, 8);
    }

    #[test]
    fn test_listing_keeps_city_at_listing_time() {
        let conn = setup();
        let provider_id = register_provider(&conn, &bakery("Springfield")).unwrap();
        let listing_id = list_food(&conn, &bread(provider_id, 3)).unwrap();

        conn.execute(
            "UPDATE providers SET city = 'Shelbyville', type = 'Supermarket' WHERE id = ?1",
            params![provider_id],
        )
        .unwrap();

        let listing = get_listing(&conn, listing_id).unwrap().unwrap();
        assert_eq!(listing.location, "Springfield");
        assert_eq!(listing.provider_type, ProviderType::Bakery);

        let newer = list_food(&conn, &bread(provider_id, 3)).unwrap();
        let newer = get_listing(&conn, newer).unwrap().unwrap();
        assert_eq!(newer.location, "Shelbyville", "new listings pick up the current city");
    }

    #[test]
    fn test_unknown_provider() {
        let conn = setup();
        let result = list_food(&conn, &bread(7, 3));
        assert!(matches!(result, Err(FoodError::UnknownProvider(7))));
        assert_eq!(table_counts(&conn).unwrap().food_listings, 0);
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let conn = setup();
        let provider_id = register_provider(&conn, &bakery("Springfield")).unwrap();

        for quantity in [0, -4] {
            let result = list_food(&conn, &bread(provider_id, quantity));
            assert!(
                matches!(result, Err(FoodError::InvalidInput { field: "quantity", .. })),
                "quantity {quantity} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_blank_food_name() {
        let conn = setup();
        let provider_id = register_provider(&conn, &bakery("Springfield")).unwrap();

        let mut listing = bread(provider_id, 2);
        listing.food_name = "   ".to_string();

        let result = list_food(&conn, &listing);
        assert!(matches!(result, Err(FoodError::InvalidInput { field: "food_name", .. })));
    }

    #[test]
    fn test_register_requires_contact_fields() {
        let conn = setup();

        let mut provider = bakery("Springfield");
        provider.contact = String::new();
        assert!(matches!(
            register_provider(&conn, &provider),
            Err(FoodError::InvalidInput { field: "contact", .. })
        ));

        let mut provider = bakery("Springfield");
        provider.address = String::new();
        assert!(register_provider(&conn, &provider).is_ok(), "address is optional");

        let receiver = NewReceiver {
            name: "Food Bank".to_string(),
            contact: "fb@example.org".to_string(),
            city: "".to_string(),
            receiver_type: ReceiverType::NonProfit,
        };
        assert!(matches!(
            register_receiver(&conn, &receiver),
            Err(FoodError::InvalidInput { field: "city", .. })
        ));
    }

    #[test]
    fn test_registration_is_audited() {
        let conn = setup();
        let receiver_id = register_receiver(
            &conn,
            &NewReceiver {
                name: "Food Bank".to_string(),
                contact: "fb@example.org".to_string(),
                city: "Springfield".to_string(),
                receiver_type: ReceiverType::CommunityCenter,
            },
        )
        .unwrap();

        let events = get_events_for_entity(&conn, "receiver", &receiver_id.to_string()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data["type"], "Community Center");
    }
}
