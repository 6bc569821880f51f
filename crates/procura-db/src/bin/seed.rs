//! # Seed Data Generator
//!
//! Populates the database with reference data for development: currencies,
//! demo tax codes, units of measure with conversions, and a few days of FX
//! rates. This mirrors what the batch import jobs deliver in production.
//!
//! ## Usage
//! ```bash
//! # Seed the default dev database
//! cargo run -p procura-db --bin seed
//!
//! # Specify database path
//! cargo run -p procura-db --bin seed -- --db ./data/procura.db
//! ```

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use uuid::Uuid;

use procura_core::types::{Currency, Dimension, TaxCode, Uom, UomConversion};
use procura_core::DEFAULT_COMPANY_ID;
use procura_db::{Database, DbConfig, FxRateUpsert};

/// ISO currencies with their minor-unit exponents.
const CURRENCIES: &[(&str, &str, u32)] = &[
    ("USD", "US Dollar", 2),
    ("EUR", "Euro", 2),
    ("GBP", "Pound Sterling", 2),
    ("JPY", "Japanese Yen", 0),
    ("CAD", "Canadian Dollar", 2),
    ("CHF", "Swiss Franc", 2),
    ("KWD", "Kuwaiti Dinar", 3),
];

/// Demo tax codes: (code, name, rate, compound, sequence).
const TAX_CODES: &[(&str, &str, &str, bool, i64)] = &[
    ("VAT20", "VAT 20%", "20", false, 1),
    ("VAT5", "VAT 5% reduced", "5", false, 1),
    ("GST", "GST 5%", "5", false, 1),
    ("QST", "QST 9.975%", "9.975", true, 2),
    ("EXEMPT", "Tax exempt", "0", false, 1),
];

/// Demo units: (code, name, dimension).
const UOMS: &[(&str, &str, Dimension)] = &[
    ("kg", "Kilogram", Dimension::Mass),
    ("g", "Gram", Dimension::Mass),
    ("lb", "Pound", Dimension::Mass),
    ("m", "Metre", Dimension::Length),
    ("cm", "Centimetre", Dimension::Length),
    ("L", "Litre", Dimension::Volume),
    ("mL", "Millilitre", Dimension::Volume),
    ("each", "Each", Dimension::Count),
    ("dozen", "Dozen", Dimension::Count),
    ("degC", "Degree Celsius", Dimension::Temperature),
    ("degF", "Degree Fahrenheit", Dimension::Temperature),
];

/// Demo conversions: (from code, to code, factor, offset).
const CONVERSIONS: &[(&str, &str, &str, &str)] = &[
    ("kg", "g", "1000", "0"),
    ("lb", "kg", "0.453592", "0"),
    ("m", "cm", "100", "0"),
    ("L", "mL", "1000", "0"),
    ("dozen", "each", "12", "0"),
    ("degC", "degF", "1.8", "32"),
];

/// Demo FX rates: (base, quote, rate, day offset from the seed date).
const FX_RATES: &[(&str, &str, &str, u32)] = &[
    ("USD", "EUR", "0.91240000", 0),
    ("USD", "EUR", "0.91780000", 1),
    ("USD", "GBP", "0.78550000", 0),
    ("USD", "JPY", "151.42000000", 0),
    ("EUR", "GBP", "0.86110000", 0),
    ("USD", "CAD", "1.36250000", 0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut db_path = String::from("./procura_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Procura Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./procura_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Procura Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Currencies (upsert: safe to re-run)
    for (code, name, minor_units) in CURRENCIES {
        db.currencies()
            .upsert(&Currency {
                code: code.parse()?,
                name: name.to_string(),
                minor_units: *minor_units,
                active: true,
            })
            .await?;
    }
    println!("✓ {} currencies", CURRENCIES.len());

    // Tax codes (skip when already present: inserts are not idempotent)
    let existing = db.tax_codes().list_active(DEFAULT_COMPANY_ID).await?;
    if existing.is_empty() {
        let now = Utc::now();
        for (code, name, rate, compound, sequence) in TAX_CODES {
            db.tax_codes()
                .insert(&TaxCode {
                    id: Uuid::new_v4().to_string(),
                    company_id: DEFAULT_COMPANY_ID.to_string(),
                    code: code.to_string(),
                    name: name.to_string(),
                    rate_percent: Decimal::from_str(rate)?,
                    is_compound: *compound,
                    sequence: *sequence,
                    active: true,
                    created_at: now,
                    updated_at: now,
                })
                .await?;
        }
        println!("✓ {} tax codes", TAX_CODES.len());
    } else {
        println!("⚠ Tax codes already present, skipping");
    }

    // Units and conversions
    let existing = db.uoms().list_active(DEFAULT_COMPANY_ID).await?;
    if existing.is_empty() {
        let now = Utc::now();
        let mut uom_ids = std::collections::HashMap::new();

        for (code, name, dimension) in UOMS {
            let uom = Uom {
                id: Uuid::new_v4().to_string(),
                company_id: DEFAULT_COMPANY_ID.to_string(),
                code: code.to_string(),
                name: name.to_string(),
                dimension: *dimension,
                active: true,
                created_at: now,
                updated_at: now,
            };
            uom_ids.insert(*code, uom.id.clone());
            db.uoms().insert_uom(&uom).await?;
        }

        for (from, to, factor, offset) in CONVERSIONS {
            db.uoms()
                .insert_conversion(&UomConversion {
                    id: Uuid::new_v4().to_string(),
                    company_id: DEFAULT_COMPANY_ID.to_string(),
                    from_uom_id: uom_ids[from].clone(),
                    to_uom_id: uom_ids[to].clone(),
                    factor: Decimal::from_str(factor)?,
                    offset: Decimal::from_str(offset)?,
                    created_at: now,
                    deleted_at: None,
                })
                .await?;
        }
        println!("✓ {} units, {} conversions", UOMS.len(), CONVERSIONS.len());
    } else {
        println!("⚠ Units already present, skipping");
    }

    // FX rates (upsert: safe to re-run)
    let today = Utc::now().date_naive();
    let rates: Vec<FxRateUpsert> = FX_RATES
        .iter()
        .map(|(base, quote, rate, day_offset)| {
            Ok(FxRateUpsert {
                base_code: base.parse()?,
                quote_code: quote.parse()?,
                rate: Decimal::from_str(rate)?,
                as_of: checked_day(today, *day_offset),
            })
        })
        .collect::<Result<_, Box<dyn std::error::Error>>>()?;
    let written = db.fx_rates().upsert_many(&rates).await?;
    println!("✓ {} fx rates", written);

    println!();
    println!("Done.");
    Ok(())
}

/// Subtracts a day offset, saturating at the original date.
fn checked_day(today: NaiveDate, offset: u32) -> NaiveDate {
    today
        .checked_sub_days(chrono::Days::new(offset as u64))
        .unwrap_or(today)
}
