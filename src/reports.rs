// 📈 Report Catalog - fifteen read-only views over the donation ledger
//
// Each report is a plain function of the current store contents (plus the
// evaluation date or a city for the two parameterized ones). `Report` ties
// them together into one catalog for the CLI and the API server.
//
// Reports 2 and 6 group by the provider type / city recorded on each listing
// at listing time, not the provider's current attributes.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;
use tracing::debug;

use crate::aggregate::{
    date_window, grouped_query, max_ties, percentage_of_total, rank_descending, sort_by_key,
    top_n, top_one, Grouped,
};
use crate::error::{FoodError, FoodResult};

/// Days ahead (inclusive) that count as "near expiry"
pub const NEAR_EXPIRY_DAYS: u64 = 3;

/// Row limit for the claims-by-city leaderboard
pub const TOP_CITIES_LIMIT: usize = 10;

// ============================================================================
// ROW TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityPresence {
    pub city: String,
    pub providers: i64,
    pub receivers: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderContact {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpiringItem {
    pub id: i64,
    pub food_name: String,
    pub expiry_date: NaiveDate,
    pub quantity: i64,
}

// ============================================================================
// REPORTS
// ============================================================================

/// 1. Provider and receiver counts for every city that has a provider
pub fn providers_receivers_per_city(conn: &Connection) -> FoodResult<Vec<CityPresence>> {
    let mut stmt = conn.prepare(
        "SELECT p.city, COUNT(DISTINCT p.id), COUNT(DISTINCT r.id)
         FROM providers p
         LEFT JOIN receivers r ON p.city = r.city
         GROUP BY p.city
         ORDER BY p.city",
    )?;

    let rows = stmt
        .query_map([], |row| {
            Ok(CityPresence {
                city: row.get(0)?,
                providers: row.get(1)?,
                receivers: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// 2. Provider type with the largest total listed quantity
pub fn top_provider_type(conn: &Connection) -> FoodResult<Option<Grouped<i64>>> {
    let groups = grouped_query(
        conn,
        "SELECT provider_type, SUM(quantity) FROM food_listings GROUP BY provider_type",
        [],
    )?;
    Ok(top_one(groups))
}

/// 3. Names and contacts of providers in exactly `city` (case-sensitive)
pub fn provider_contacts(conn: &Connection, city: &str) -> FoodResult<Vec<ProviderContact>> {
    let mut stmt = conn.prepare(
        "SELECT name, contact FROM providers WHERE city = ?1 ORDER BY id",
    )?;

    let rows = stmt
        .query_map(params![city], |row| {
            Ok(ProviderContact {
                name: row.get(0)?,
                contact: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// 4. Every receiver tied for the highest number of claims
pub fn top_receivers(conn: &Connection) -> FoodResult<Vec<Grouped<i64>>> {
    let groups = grouped_query(
        conn,
        "SELECT r.name, COUNT(c.id)
         FROM receivers r
         JOIN claims c ON r.id = c.receiver_id
         GROUP BY r.id",
        [],
    )?;
    Ok(max_ties(groups))
}

/// 5. Total quantity across all listings, claimed or not
pub fn total_quantity(conn: &Connection) -> FoodResult<i64> {
    let total = conn.query_row(
        "SELECT COALESCE(SUM(quantity), 0) FROM food_listings",
        [],
        |row| row.get(0),
    )?;
    Ok(total)
}

/// 6. City with the most listings
pub fn city_with_most_listings(conn: &Connection) -> FoodResult<Option<Grouped<i64>>> {
    let groups = grouped_query(
        conn,
        "SELECT location, COUNT(id) FROM food_listings GROUP BY location",
        [],
    )?;
    Ok(top_one(groups))
}

/// 7. Listing count per food type, most common first
pub fn food_type_distribution(conn: &Connection) -> FoodResult<Vec<Grouped<i64>>> {
    let mut groups = grouped_query(
        conn,
        "SELECT food_type, COUNT(*) FROM food_listings GROUP BY food_type",
        [],
    )?;
    rank_descending(&mut groups);
    Ok(groups)
}

/// 8. Claim count per food name; items never claimed do not appear
pub fn claims_per_food_item(conn: &Connection) -> FoodResult<Vec<Grouped<i64>>> {
    let mut groups = grouped_query(
        conn,
        "SELECT f.food_name, COUNT(c.id)
         FROM food_listings f
         JOIN claims c ON f.id = c.food_id
         GROUP BY f.food_name",
        [],
    )?;
    sort_by_key(&mut groups);
    Ok(groups)
}

/// 9. Provider with the most completed claims against its listings
pub fn top_provider_by_completed_claims(conn: &Connection) -> FoodResult<Option<Grouped<i64>>> {
    let groups = grouped_query(
        conn,
        "SELECT p.name, COUNT(c.id)
         FROM providers p
         JOIN food_listings f ON p.id = f.provider_id
         JOIN claims c ON f.id = c.food_id
         WHERE c.status = 'Completed'
         GROUP BY p.id",
        [],
    )?;
    Ok(top_one(groups))
}

/// 10. Share of claims in each status, as percentages rounded to 2 decimals
pub fn claim_status_distribution(conn: &Connection) -> FoodResult<Vec<Grouped<f64>>> {
    let mut counts = grouped_query(
        conn,
        "SELECT status, COUNT(*) FROM claims GROUP BY status",
        [],
    )?;
    sort_by_key(&mut counts);
    Ok(percentage_of_total(&counts))
}

/// 11. Mean quantity of the listings each receiver has claimed
pub fn average_quantity_per_receiver(conn: &Connection) -> FoodResult<Vec<Grouped<f64>>> {
    let mut groups = grouped_query(
        conn,
        "SELECT r.name, AVG(f.quantity)
         FROM receivers r
         JOIN claims c ON r.id = c.receiver_id
         JOIN food_listings f ON c.food_id = f.id
         GROUP BY r.id",
        [],
    )?;
    sort_by_key(&mut groups);
    Ok(groups)
}

/// 12. Claim count per meal type, most claimed first
pub fn claims_by_meal_type(conn: &Connection) -> FoodResult<Vec<Grouped<i64>>> {
    let mut groups = grouped_query(
        conn,
        "SELECT f.meal_type, COUNT(c.id)
         FROM food_listings f
         JOIN claims c ON f.id = c.food_id
         GROUP BY f.meal_type",
        [],
    )?;
    rank_descending(&mut groups);
    Ok(groups)
}

/// 13. Total listed quantity per provider, largest donor first
pub fn total_donated_per_provider(conn: &Connection) -> FoodResult<Vec<Grouped<i64>>> {
    let mut groups = grouped_query(
        conn,
        "SELECT p.name, SUM(f.quantity)
         FROM providers p
         JOIN food_listings f ON p.id = f.provider_id
         GROUP BY p.id",
        [],
    )?;
    rank_descending(&mut groups);
    Ok(groups)
}

/// 14. Listings expiring between `today` and `today + 3 days`, inclusive
pub fn items_near_expiry(conn: &Connection, today: NaiveDate) -> FoodResult<Vec<ExpiringItem>> {
    let (start, end) = date_window(today, NEAR_EXPIRY_DAYS);

    let mut stmt = conn.prepare(
        "SELECT id, food_name, expiry_date, quantity
         FROM food_listings
         WHERE expiry_date BETWEEN ?1 AND ?2
         ORDER BY expiry_date, id",
    )?;

    let rows = stmt
        .query_map(params![start, end], |row| {
            Ok(ExpiringItem {
                id: row.get(0)?,
                food_name: row.get(1)?,
                expiry_date: row.get(2)?,
                quantity: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// 15. The ten cities with the most claims against their listings
pub fn top_cities_by_claims(conn: &Connection) -> FoodResult<Vec<Grouped<i64>>> {
    let groups = grouped_query(
        conn,
        "SELECT f.location, COUNT(c.id)
         FROM food_listings f
         JOIN claims c ON f.id = c.food_id
         GROUP BY f.location",
        [],
    )?;
    Ok(top_n(groups, TOP_CITIES_LIMIT))
}

// ============================================================================
// CATALOG
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    ProvidersReceiversPerCity,
    TopProviderType,
    ProviderContacts,
    TopReceivers,
    TotalQuantity,
    CityWithMostListings,
    FoodTypeDistribution,
    ClaimsPerFoodItem,
    TopProviderByCompletedClaims,
    ClaimStatusDistribution,
    AverageQuantityPerReceiver,
    ClaimsByMealType,
    TotalDonatedPerProvider,
    ItemsNearExpiry,
    TopCitiesByClaims,
}

/// Inputs a report may need besides the store
#[derive(Debug, Clone)]
pub struct ReportParams {
    pub city: Option<String>,
    pub today: NaiveDate,
}

impl ReportParams {
    pub fn new(today: NaiveDate) -> Self {
        ReportParams { city: None, today }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }
}

/// One catalog entry's output, ready for display
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub number: u8,
    pub slug: &'static str,
    pub title: &'static str,
    pub data: serde_json::Value,
}

impl Report {
    pub const ALL: [Report; 15] = [
        Report::ProvidersReceiversPerCity,
        Report::TopProviderType,
        Report::ProviderContacts,
        Report::TopReceivers,
        Report::TotalQuantity,
        Report::CityWithMostListings,
        Report::FoodTypeDistribution,
        Report::ClaimsPerFoodItem,
        Report::TopProviderByCompletedClaims,
        Report::ClaimStatusDistribution,
        Report::AverageQuantityPerReceiver,
        Report::ClaimsByMealType,
        Report::TotalDonatedPerProvider,
        Report::ItemsNearExpiry,
        Report::TopCitiesByClaims,
    ];

    pub fn number(&self) -> u8 {
        match self {
            Report::ProvidersReceiversPerCity => 1,
            Report::TopProviderType => 2,
            Report::ProviderContacts => 3,
            Report::TopReceivers => 4,
            Report::TotalQuantity => 5,
            Report::CityWithMostListings => 6,
            Report::FoodTypeDistribution => 7,
            Report::ClaimsPerFoodItem => 8,
            Report::TopProviderByCompletedClaims => 9,
            Report::ClaimStatusDistribution => 10,
            Report::AverageQuantityPerReceiver => 11,
            Report::ClaimsByMealType => 12,
            Report::TotalDonatedPerProvider => 13,
            Report::ItemsNearExpiry => 14,
            Report::TopCitiesByClaims => 15,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Report::ProvidersReceiversPerCity => "providers-receivers-per-city",
            Report::TopProviderType => "top-provider-type",
            Report::ProviderContacts => "provider-contacts",
            Report::TopReceivers => "top-receivers",
            Report::TotalQuantity => "total-quantity",
            Report::CityWithMostListings => "city-with-most-listings",
            Report::FoodTypeDistribution => "food-type-distribution",
            Report::ClaimsPerFoodItem => "claims-per-food-item",
            Report::TopProviderByCompletedClaims => "top-provider-by-completed-claims",
            Report::ClaimStatusDistribution => "claim-status-distribution",
            Report::AverageQuantityPerReceiver => "average-quantity-per-receiver",
            Report::ClaimsByMealType => "claims-by-meal-type",
            Report::TotalDonatedPerProvider => "total-donated-per-provider",
            Report::ItemsNearExpiry => "items-near-expiry",
            Report::TopCitiesByClaims => "top-cities-by-claims",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Report::ProvidersReceiversPerCity => "Providers & Receivers per City",
            Report::TopProviderType => "Top Provider Type by Contribution",
            Report::ProviderContacts => "Provider Contacts in City",
            Report::TopReceivers => "Receivers with Most Claims",
            Report::TotalQuantity => "Total Food Available",
            Report::CityWithMostListings => "City with Most Food Listings",
            Report::FoodTypeDistribution => "Most Common Food Types",
            Report::ClaimsPerFoodItem => "Claims per Food Item",
            Report::TopProviderByCompletedClaims => "Top Provider by Successful Claims",
            Report::ClaimStatusDistribution => "Claims Percentage by Status",
            Report::AverageQuantityPerReceiver => "Average Quantity Claimed per Receiver",
            Report::ClaimsByMealType => "Most Claimed Meal Type",
            Report::TotalDonatedPerProvider => "Total Food Donated per Provider",
            Report::ItemsNearExpiry => "Food Items Near Expiry (Next 3 Days)",
            Report::TopCitiesByClaims => "Top 10 Cities by Food Claims",
        }
    }

    /// Accepts the slug or the report number
    pub fn from_slug(value: &str) -> Option<Report> {
        let value = value.trim();
        Report::ALL
            .iter()
            .copied()
            .find(|r| r.slug() == value || r.number().to_string() == value)
    }

    pub fn needs_city(&self) -> bool {
        matches!(self, Report::ProviderContacts)
    }

    /// Run this report and render its rows as JSON
    pub fn run(&self, conn: &Connection, params: &ReportParams) -> FoodResult<serde_json::Value> {
        debug!(report = self.slug(), "running report");

        let value = match self {
            Report::ProvidersReceiversPerCity => serde_json::to_value(providers_receivers_per_city(conn)?)?,
            Report::TopProviderType => serde_json::to_value(top_provider_type(conn)?)?,
            Report::ProviderContacts => {
                let city = params
                    .city
                    .as_deref()
                    .ok_or_else(|| FoodError::invalid("city", "required for provider contacts"))?;
                serde_json::to_value(provider_contacts(conn, city)?)?
            }
            Report::TopReceivers => serde_json::to_value(top_receivers(conn)?)?,
            Report::TotalQuantity => serde_json::to_value(total_quantity(conn)?)?,
            Report::CityWithMostListings => serde_json::to_value(city_with_most_listings(conn)?)?,
            Report::FoodTypeDistribution => serde_json::to_value(food_type_distribution(conn)?)?,
            Report::ClaimsPerFoodItem => serde_json::to_value(claims_per_food_item(conn)?)?,
            Report::TopProviderByCompletedClaims => {
                serde_json::to_value(top_provider_by_completed_claims(conn)?)?
            }
            Report::ClaimStatusDistribution => serde_json::to_value(claim_status_distribution(conn)?)?,
            Report::AverageQuantityPerReceiver => {
                serde_json::to_value(average_quantity_per_receiver(conn)?)?
            }
            Report::ClaimsByMealType => serde_json::to_value(claims_by_meal_type(conn)?)?,
            Report::TotalDonatedPerProvider => serde_json::to_value(total_donated_per_provider(conn)?)?,
            Report::ItemsNearExpiry => serde_json::to_value(items_near_expiry(conn, params.today)?)?,
            Report::TopCitiesByClaims => serde_json::to_value(top_cities_by_claims(conn)?)?,
        };

        Ok(value)
    }

    pub fn output(&self, conn: &Connection, params: &ReportParams) -> FoodResult<ReportOutput> {
        Ok(ReportOutput {
            number: self.number(),
            slug: self.slug(),
            title: self.title(),
            data: self.run(conn, params)?,
        })
    }
}

/// Run the whole catalog in order. The city report is skipped when no city is given.
pub fn run_all(conn: &Connection, params: &ReportParams) -> FoodResult<Vec<ReportOutput>> {
    Report::ALL
        .iter()
        .filter(|report| !report.needs_city() || params.city.is_some())
        .map(|report| report.output(conn, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::setup_database;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn add_provider(conn: &Connection, id: i64, name: &str, city: &str, kind: &str) {
        conn.execute(
            "INSERT INTO providers (id, name, contact, city, type) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, name, format!("{name}@example.com"), city, kind],
        )
        .unwrap();
    }

    fn add_receiver(conn: &Connection, id: i64, name: &str, city: &str) {
        conn.execute(
            "INSERT INTO receivers (id, name, contact, city, type) VALUES (?1, ?2, 'c', ?3, 'Individual')",
            params![id, name, city],
        )
        .unwrap();
    }

    /// Listing whose denormalized type/city are copied from the provider row
    fn add_listing(conn: &Connection, id: i64, provider_id: i64, food: &str, quantity: i64, days_out: i64) {
        let expiry = today() + chrono::Duration::days(days_out);
        conn.execute(
            "INSERT INTO food_listings (id, provider_id, provider_type, location, food_name,
                food_type, quantity, expiry_date, meal_type)
             SELECT ?1, p.id, p.type, p.city, ?2, 'Fruits', ?3, ?4, 'Lunch'
             FROM providers p WHERE p.id = ?5",
            params![id, food, quantity, expiry, provider_id],
        )
        .unwrap();
    }

    fn add_claim(conn: &Connection, food_id: i64, receiver_id: i64, status: &str) {
        conn.execute(
            "INSERT INTO claims (food_id, receiver_id, status, timestamp)
             VALUES (?1, ?2, ?3, '2025-03-09 10:00:00')",
            params![food_id, receiver_id, status],
        )
        .unwrap();
    }

    /// P1 Bakery in X with L1 (qty 5), P2 Restaurant in Y with L2 (qty 10)
    fn scenario() -> Connection {
        let conn = setup();
        add_provider(&conn, 1, "P1", "X", "Bakery");
        add_provider(&conn, 2, "P2", "Y", "Restaurant");
        add_listing(&conn, 1, 1, "Bread", 5, 5);
        add_listing(&conn, 2, 2, "Soup", 10, 5);
        conn
    }

    #[test]
    fn test_scenario_totals() {
        let conn = scenario();

        assert_eq!(total_quantity(&conn).unwrap(), 15);
        assert_eq!(
            top_provider_type(&conn).unwrap(),
            Some(Grouped::new("Restaurant", 10))
        );
    }

    #[test]
    fn test_total_quantity_ignores_claim_status() {
        let conn = scenario();
        add_receiver(&conn, 1, "R1", "X");
        add_claim(&conn, 1, 1, "Completed");
        add_claim(&conn, 2, 1, "Pending");

        assert_eq!(total_quantity(&conn).unwrap(), 15, "claimed listings still count");
    }

    #[test]
    fn test_empty_store() {
        let conn = setup();

        assert_eq!(total_quantity(&conn).unwrap(), 0);
        assert_eq!(top_provider_type(&conn).unwrap(), None);
        assert!(claim_status_distribution(&conn).unwrap().is_empty());
        assert!(top_receivers(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_top_provider_type_uses_type_at_listing_time() {
        let conn = scenario();
        conn.execute("UPDATE providers SET type = 'Bakery' WHERE id = 2", [])
            .unwrap();

        assert_eq!(
            top_provider_type(&conn).unwrap(),
            Some(Grouped::new("Restaurant", 10))
        );
    }

    #[test]
    fn test_cities_without_receivers_show_zero() {
        let conn = scenario();
        add_provider(&conn, 3, "P3", "X", "Supermarket");
        add_receiver(&conn, 1, "R1", "Y");
        add_receiver(&conn, 2, "R2", "Y");
        add_receiver(&conn, 3, "R3", "Z");

        let rows = providers_receivers_per_city(&conn).unwrap();
        assert_eq!(
            rows,
            vec![
                CityPresence { city: "X".to_string(), providers: 2, receivers: 0 },
                CityPresence { city: "Y".to_string(), providers: 1, receivers: 2 },
            ],
            "receiver-only city Z is not listed"
        );
    }

    #[test]
    fn test_provider_contacts_exact_match() {
        let conn = scenario();
        add_provider(&conn, 3, "P3", "x", "Bakery");

        let contacts = provider_contacts(&conn, "X").unwrap();
        assert_eq!(
            contacts,
            vec![ProviderContact { name: "P1".to_string(), contact: "P1@example.com".to_string() }]
        );
        assert!(provider_contacts(&conn, "Nowhere").unwrap().is_empty());
        assert!(
            provider_contacts(&conn, "X' OR '1'='1").unwrap().is_empty(),
            "city is bound, never spliced into SQL"
        );
    }

    #[test]
    fn test_top_receivers_returns_whole_tie_set() {
        let conn = scenario();
        add_listing(&conn, 3, 1, "Cake", 1, 5);
        add_receiver(&conn, 1, "Zoe", "X");
        add_receiver(&conn, 2, "Amir", "X");
        add_receiver(&conn, 3, "Bea", "Y");
        add_claim(&conn, 1, 1, "Pending");
        add_claim(&conn, 2, 1, "Completed");
        add_claim(&conn, 3, 2, "Pending");
        add_claim(&conn, 1, 2, "Cancelled");
        add_claim(&conn, 2, 3, "Cancelled");

        let leaders = top_receivers(&conn).unwrap();
        assert_eq!(leaders, vec![Grouped::new("Amir", 2), Grouped::new("Zoe", 2)]);
    }

    #[test]
    fn test_city_with_most_listings() {
        let conn = scenario();
        add_listing(&conn, 3, 2, "Salad", 1, 5);

        assert_eq!(city_with_most_listings(&conn).unwrap(), Some(Grouped::new("Y", 2)));
    }

    #[test]
    fn test_food_type_distribution_sorted_descending() {
        let conn = scenario();
        conn.execute("UPDATE food_listings SET food_type = 'Dairy' WHERE id = 2", [])
            .unwrap();
        add_listing(&conn, 3, 1, "Pear", 1, 5);

        assert_eq!(
            food_type_distribution(&conn).unwrap(),
            vec![Grouped::new("Fruits", 2), Grouped::new("Dairy", 1)]
        );
    }

    #[test]
    fn test_claims_per_food_item_excludes_unclaimed() {
        let conn = scenario();
        add_receiver(&conn, 1, "R1", "X");
        add_listing(&conn, 3, 2, "Bread", 2, 5);
        add_claim(&conn, 1, 1, "Completed");
        add_claim(&conn, 3, 1, "Pending");

        assert_eq!(
            claims_per_food_item(&conn).unwrap(),
            vec![Grouped::new("Bread", 2)],
            "Soup has no claims and is absent"
        );
    }

    #[test]
    fn test_top_provider_counts_completed_only() {
        let conn = scenario();
        add_receiver(&conn, 1, "R1", "X");
        add_listing(&conn, 3, 1, "Cake", 1, 5);
        add_claim(&conn, 1, 1, "Pending");
        add_claim(&conn, 3, 1, "Pending");
        add_claim(&conn, 2, 1, "Completed");

        assert_eq!(
            top_provider_by_completed_claims(&conn).unwrap(),
            Some(Grouped::new("P2", 1))
        );

        conn.execute("UPDATE claims SET status = 'Cancelled' WHERE food_id = 2", [])
            .unwrap();
        assert_eq!(top_provider_by_completed_claims(&conn).unwrap(), None);
    }

    #[test]
    fn test_claim_status_percentages_sum_to_100() {
        let conn = scenario();
        add_receiver(&conn, 1, "R1", "X");
        add_listing(&conn, 3, 1, "Cake", 1, 5);
        add_claim(&conn, 1, 1, "Pending");
        add_claim(&conn, 2, 1, "Completed");
        add_claim(&conn, 3, 1, "Cancelled");

        let shares = claim_status_distribution(&conn).unwrap();
        let keys: Vec<&str> = shares.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Cancelled", "Completed", "Pending"]);

        let total: f64 = shares.iter().map(|g| g.metric).sum();
        assert!((total - 100.0).abs() <= 0.01 + 1e-9, "got {total}");
    }

    #[test]
    fn test_average_quantity_per_receiver() {
        let conn = scenario();
        add_receiver(&conn, 1, "R1", "X");
        add_receiver(&conn, 2, "R2", "X");
        add_claim(&conn, 1, 1, "Completed");
        add_claim(&conn, 2, 1, "Pending");
        add_claim(&conn, 1, 2, "Cancelled");

        assert_eq!(
            average_quantity_per_receiver(&conn).unwrap(),
            vec![Grouped::new("R1", 7.5), Grouped::new("R2", 5.0)]
        );
    }

    #[test]
    fn test_claims_by_meal_type() {
        let conn = scenario();
        add_receiver(&conn, 1, "R1", "X");
        conn.execute("UPDATE food_listings SET meal_type = 'Dinner' WHERE id = 2", [])
            .unwrap();
        add_listing(&conn, 3, 2, "Stew", 4, 5);
        conn.execute("UPDATE food_listings SET meal_type = 'Dinner' WHERE id = 3", [])
            .unwrap();
        add_claim(&conn, 1, 1, "Pending");
        add_claim(&conn, 2, 1, "Pending");
        add_claim(&conn, 3, 1, "Pending");

        assert_eq!(
            claims_by_meal_type(&conn).unwrap(),
            vec![Grouped::new("Dinner", 2), Grouped::new("Lunch", 1)]
        );
    }

    #[test]
    fn test_total_donated_per_provider() {
        let conn = scenario();
        add_listing(&conn, 3, 1, "Cake", 7, 5);
        add_provider(&conn, 3, "P3", "Z", "Bakery");

        assert_eq!(
            total_donated_per_provider(&conn).unwrap(),
            vec![Grouped::new("P1", 12), Grouped::new("P2", 10)],
            "providers without listings are absent"
        );
    }

    #[test]
    fn test_items_near_expiry_window() {
        let conn = scenario();
        add_listing(&conn, 3, 1, "Yogurt", 2, 2);
        add_listing(&conn, 4, 1, "Milk", 2, 4);
        add_listing(&conn, 5, 1, "Cream", 2, 0);
        add_listing(&conn, 6, 1, "Butter", 2, 3);
        add_listing(&conn, 7, 1, "Old", 2, -1);

        let names: Vec<String> = items_near_expiry(&conn, today())
            .unwrap()
            .into_iter()
            .map(|i| i.food_name)
            .collect();
        assert_eq!(names, vec!["Cream", "Yogurt", "Butter"]);
    }

    #[test]
    fn test_top_cities_limited_to_ten() {
        let conn = setup();
        add_receiver(&conn, 1, "R1", "X");
        for i in 1..=12 {
            add_provider(&conn, i, &format!("P{i}"), &format!("City{i:02}"), "Bakery");
            add_listing(&conn, i, i, "Bread", 1, 5);
            add_claim(&conn, i, 1, "Pending");
        }
        add_listing(&conn, 100, 12, "Rolls", 1, 5);
        add_claim(&conn, 100, 1, "Completed");

        let cities = top_cities_by_claims(&conn).unwrap();
        assert_eq!(cities.len(), TOP_CITIES_LIMIT);
        assert_eq!(cities[0], Grouped::new("City12", 2));
        assert_eq!(cities[1], Grouped::new("City01", 1));
        assert_eq!(cities[9].key, "City09");
    }

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(Report::ALL.len(), 15);
        for (i, report) in Report::ALL.iter().enumerate() {
            assert_eq!(report.number() as usize, i + 1);
            assert_eq!(Report::from_slug(report.slug()), Some(*report));
        }
        assert_eq!(Report::from_slug("14"), Some(Report::ItemsNearExpiry));
        assert_eq!(Report::from_slug("nope"), None);
    }

    #[test]
    fn test_city_report_requires_city() {
        let conn = scenario();
        let params = ReportParams::new(today());

        let result = Report::ProviderContacts.run(&conn, &params);
        assert!(matches!(result, Err(FoodError::InvalidInput { field: "city", .. })));

        let value = Report::ProviderContacts
            .run(&conn, &params.clone().with_city("Y"))
            .unwrap();
        assert_eq!(value[0]["name"], "P2");
    }

    #[test]
    fn test_run_all() {
        let conn = scenario();

        let without_city = run_all(&conn, &ReportParams::new(today())).unwrap();
        assert_eq!(without_city.len(), 14);

        let all = run_all(&conn, &ReportParams::new(today()).with_city("X")).unwrap();
        assert_eq!(all.len(), 15);
        assert_eq!(all[4].slug, "total-quantity");
        assert_eq!(all[4].data, serde_json::json!(15));
    }
}
