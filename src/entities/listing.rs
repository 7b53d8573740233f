// 🥖 Food Listing Entity - a provider's offered surplus item
//
// provider_type and location are denormalized: they record the provider's
// attributes at listing time and are never re-derived from the provider row.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::{text_enum, ProviderType};

// ============================================================================
// FOOD TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodType {
    Vegetables,
    Fruits,
    #[serde(rename = "Prepared Meal")]
    PreparedMeal,
    Snacks,
    Bakery,
    Dairy,
}

impl FoodType {
    pub const ALL: [FoodType; 6] = [
        FoodType::Vegetables,
        FoodType::Fruits,
        FoodType::PreparedMeal,
        FoodType::Snacks,
        FoodType::Bakery,
        FoodType::Dairy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodType::Vegetables => "Vegetables",
            FoodType::Fruits => "Fruits",
            FoodType::PreparedMeal => "Prepared Meal",
            FoodType::Snacks => "Snacks",
            FoodType::Bakery => "Bakery",
            FoodType::Dairy => "Dairy",
        }
    }
}

text_enum!(FoodType, "food type");

// ============================================================================
// MEAL TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Any,
}

impl MealType {
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
        MealType::Any,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
            MealType::Any => "Any",
        }
    }
}

text_enum!(MealType, "meal type");

// ============================================================================
// FOOD LISTING ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodListing {
    pub id: i64,
    pub provider_id: i64,
    /// Provider type at listing time
    pub provider_type: ProviderType,
    /// Provider city at listing time
    pub location: String,
    pub food_name: String,
    pub food_type: FoodType,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub meal_type: MealType,
}

impl FoodListing {
    pub(crate) const COLUMNS: &'static str = "f.id, f.provider_id, f.provider_type, f.location, \
         f.food_name, f.food_type, f.quantity, f.expiry_date, f.meal_type";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(FoodListing {
            id: row.get(0)?,
            provider_id: row.get(1)?,
            provider_type: row.get(2)?,
            location: row.get(3)?,
            food_name: row.get(4)?,
            food_type: row.get(5)?,
            quantity: row.get(6)?,
            expiry_date: row.get(7)?,
            meal_type: row.get(8)?,
        })
    }

    /// Human-readable picker label, e.g. "Bread from Bakery in Springfield (Qty: 5)"
    pub fn label(&self) -> String {
        format!(
            "{} from {} in {} (Qty: {})",
            self.food_name, self.provider_type, self.location, self.quantity
        )
    }
}

/// Input for listing a new food item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub provider_id: i64,
    pub food_name: String,
    pub food_type: FoodType,
    pub quantity: i64,
    pub expiry_date: NaiveDate,
    pub meal_type: MealType,
}

pub fn get_listing(conn: &Connection, id: i64) -> rusqlite::Result<Option<FoodListing>> {
    conn.query_row(
        &format!("SELECT {} FROM food_listings f WHERE f.id = ?1", FoodListing::COLUMNS),
        params![id],
        FoodListing::from_row,
    )
    .optional()
}

pub fn get_all_listings(conn: &Connection) -> rusqlite::Result<Vec<FoodListing>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM food_listings f ORDER BY f.id",
        FoodListing::COLUMNS
    ))?;

    let listings = stmt
        .query_map([], FoodListing::from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(listings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label() {
        let listing = FoodListing {
            id: 1,
            provider_id: 1,
            provider_type: ProviderType::GroceryStore,
            location: "Springfield".to_string(),
            food_name: "Apples".to_string(),
            food_type: FoodType::Fruits,
            quantity: 12,
            expiry_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            meal_type: MealType::Snack,
        };

        assert_eq!(listing.label(), "Apples from Grocery Store in Springfield (Qty: 12)");
    }

    #[test]
    fn test_unknown_food_type() {
        let err = "Vegan".parse::<FoodType>().unwrap_err();
        assert_eq!(err.kind, "food type");
        assert_eq!(err.value, "Vegan");
    }
}
