// Food Rescue Ledger - command line front end
// Prints JSON on stdout; logs go to stderr

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use food_rescue::{
    claim_food, get_all_listings, get_all_providers, get_all_receivers, get_claims_for_listing,
    import_directory, list_claimable, list_food, local_now, local_today, open_database,
    register_provider, register_receiver, run_all, table_counts, telemetry, AppConfig, FoodType,
    MealType, NewListing, NewProvider, NewReceiver, ProviderType, ReceiverType, Report, ReportParams,
};

#[derive(Parser, Debug)]
#[command(
    name = "food-rescue",
    about = "Track surplus-food donations and report on claims",
    version
)]
struct Cli {
    /// SQLite database file (defaults to FOOD_DB_PATH or food_wastage.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the schema and print table counts
    Init,
    /// Bulk load providers/receivers/listings/claims CSV files from a directory
    Import { dir: PathBuf },
    /// List the report catalog
    Reports,
    /// Run one report by slug or number
    Report {
        name: String,
        /// City for the provider-contacts report
        #[arg(long)]
        city: Option<String>,
        /// Evaluation date for date-relative reports (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Run every report
    Dashboard {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Show food that can be claimed right now
    Available,
    /// Claim a listing for a receiver
    Claim {
        #[arg(long)]
        food: i64,
        #[arg(long)]
        receiver: i64,
    },
    /// List a new surplus food item
    ListFood(ListFoodArgs),
    /// Register a provider
    AddProvider(AddProviderArgs),
    /// Register a receiver
    AddReceiver(AddReceiverArgs),
    /// Show every registered provider
    Providers,
    /// Show every registered receiver
    Receivers,
    /// Show every food listing, claimed or not
    Listings,
    /// Claim history of one listing
    Claims { food: i64 },
}

#[derive(Args, Debug)]
struct ListFoodArgs {
    #[arg(long)]
    provider: i64,
    #[arg(long)]
    name: String,
    #[arg(long)]
    food_type: FoodType,
    #[arg(long)]
    quantity: i64,
    /// Expiry date, YYYY-MM-DD
    #[arg(long)]
    expiry: NaiveDate,
    #[arg(long)]
    meal: MealType,
}

#[derive(Args, Debug)]
struct AddProviderArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    contact: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long = "type")]
    provider_type: ProviderType,
}

#[derive(Args, Debug)]
struct AddReceiverArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    contact: String,
    #[arg(long)]
    city: String,
    #[arg(long = "type")]
    receiver_type: ReceiverType,
}

#[derive(Serialize)]
struct CatalogEntry {
    number: u8,
    slug: &'static str,
    title: &'static str,
    needs_city: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.log_level)?;

    let db_path = cli.db.unwrap_or(config.db_path);
    let mut conn = open_database(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    match cli.command {
        Command::Init => print_json(&table_counts(&conn)?)?,
        Command::Import { dir } => {
            let summary = import_directory(&mut conn, &dir)?;
            print_json(&summary)?;
        }
        Command::Reports => {
            let catalog: Vec<CatalogEntry> = Report::ALL
                .iter()
                .map(|r| CatalogEntry {
                    number: r.number(),
                    slug: r.slug(),
                    title: r.title(),
                    needs_city: r.needs_city(),
                })
                .collect();
            print_json(&catalog)?;
        }
        Command::Report { name, city, today } => {
            let Some(report) = Report::from_slug(&name) else {
                bail!("Unknown report {name:?}; run `food-rescue reports` for the catalog");
            };
            let params = ReportParams {
                city,
                today: today.unwrap_or_else(local_today),
            };
            print_json(&report.output(&conn, &params)?)?;
        }
        Command::Dashboard { city, today } => {
            let params = ReportParams {
                city,
                today: today.unwrap_or_else(local_today),
            };
            print_json(&run_all(&conn, &params)?)?;
        }
        Command::Available => {
            let listings = list_claimable(&conn, local_today())?;
            if listings.is_empty() {
                eprintln!("No food items are currently available for claiming.");
            }
            print_json(&listings)?;
        }
        Command::Claim { food, receiver } => {
            let claim_id = claim_food(&mut conn, food, receiver, local_now())?;
            print_json(&serde_json::json!({ "claim_id": claim_id, "status": "Pending" }))?;
        }
        Command::ListFood(args) => {
            let listing = NewListing {
                provider_id: args.provider,
                food_name: args.name,
                food_type: args.food_type,
                quantity: args.quantity,
                expiry_date: args.expiry,
                meal_type: args.meal,
            };
            let id = list_food(&conn, &listing)?;
            print_json(&serde_json::json!({ "listing_id": id }))?;
        }
        Command::AddProvider(args) => {
            let provider = NewProvider {
                name: args.name,
                contact: args.contact,
                address: args.address,
                city: args.city,
                provider_type: args.provider_type,
            };
            let id = register_provider(&conn, &provider)?;
            print_json(&serde_json::json!({ "provider_id": id }))?;
        }
        Command::AddReceiver(args) => {
            let receiver = NewReceiver {
                name: args.name,
                contact: args.contact,
                city: args.city,
                receiver_type: args.receiver_type,
            };
            let id = register_receiver(&conn, &receiver)?;
            print_json(&serde_json::json!({ "receiver_id": id }))?;
        }
        Command::Providers => print_json(&get_all_providers(&conn)?)?,
        Command::Receivers => print_json(&get_all_receivers(&conn)?)?,
        Command::Listings => print_json(&get_all_listings(&conn)?)?,
        Command::Claims { food } => print_json(&get_claims_for_listing(&conn, food)?)?,
    }

    Ok(())
}
