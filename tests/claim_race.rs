// Concurrent claims against one listing, each thread on its own connection

use chrono::Duration;
use food_rescue::{
    claim_food, list_claimable, list_food, local_now, local_today, open_database,
    register_provider, register_receiver, FoodError, FoodType, MealType, NewListing, NewProvider,
    NewReceiver, ProviderType, ReceiverType,
};
use std::path::Path;

const CLAIMANTS: usize = 8;

fn seed(path: &Path) -> (i64, Vec<i64>) {
    let conn = open_database(path).unwrap();

    let provider_id = register_provider(
        &conn,
        &NewProvider {
            name: "Corner Bakery".to_string(),
            contact: "555-0100".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            provider_type: ProviderType::Bakery,
        },
    )
    .unwrap();

    let receivers = (0..CLAIMANTS)
        .map(|i| {
            register_receiver(
                &conn,
                &NewReceiver {
                    name: format!("Shelter {i}"),
                    contact: format!("555-02{i:02}"),
                    city: "Springfield".to_string(),
                    receiver_type: ReceiverType::NonProfit,
                },
            )
            .unwrap()
        })
        .collect();

    let food_id = list_food(
        &conn,
        &NewListing {
            provider_id,
            food_name: "Sourdough".to_string(),
            food_type: FoodType::Bakery,
            quantity: 12,
            expiry_date: local_today() + Duration::days(30),
            meal_type: MealType::Breakfast,
        },
    )
    .unwrap();

    (food_id, receivers)
}

#[test]
fn test_exactly_one_concurrent_claim_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");
    let (food_id, receivers) = seed(&path);

    let results: Vec<Result<i64, FoodError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = receivers
            .iter()
            .map(|&receiver_id| {
                let path = &path;
                scope.spawn(move || {
                    let mut conn = open_database(path).unwrap();
                    claim_food(&mut conn, food_id, receiver_id, local_now())
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "results: {results:?}");

    for result in results.iter().filter(|r| r.is_err()) {
        assert!(
            matches!(result, Err(FoodError::NotClaimable(id)) if *id == food_id),
            "unexpected failure: {result:?}"
        );
    }

    let conn = open_database(&path).unwrap();
    let active: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM claims WHERE food_id = ?1 AND status IN ('Pending', 'Completed')",
            [food_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(active, 1);
    assert!(list_claimable(&conn, local_today()).unwrap().is_empty());
}
