//! Shared fixtures for the directory integration tests.

#![allow(dead_code)]

use phone_directory::model::{Country, CountryPayload, CustomerPayload};
use phone_directory::storage::InMemoryStorage;
use phone_directory::{Directory, DirectoryBuilder};

pub mod slow_storage;
pub mod stale_storage;

/// Install a test logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .is_test(true)
        .try_init();
}

/// A directory over fresh in-memory storage with default configuration.
pub async fn empty_directory() -> Directory<InMemoryStorage> {
    init_logging();
    DirectoryBuilder::new(InMemoryStorage::new())
        .build()
        .await
        .expect("default directory builds")
}

/// `(name, alpha2, alpha3, isd)` for the countries most tests expect.
pub const COUNTRIES: [(&str, &str, &str, &str); 5] = [
    ("Egypt", "EG", "EGY", "20"),
    ("Morocco", "MA", "MAR", "212"),
    ("Cameroon", "CM", "CMR", "237"),
    ("Ethiopia", "ET", "ETH", "251"),
    ("United States", "US", "USA", "1"),
];

pub fn country(alpha2: &str) -> CountryPayload {
    let (name, a2, a3, isd) = COUNTRIES
        .iter()
        .find(|(_, a2, _, _)| *a2 == alpha2)
        .copied()
        .unwrap_or_else(|| panic!("no fixture country {}", alpha2));
    CountryPayload::new(name, a2, a3, isd)
}

/// A directory seeded with every fixture country.
pub async fn seeded_directory() -> (Directory<InMemoryStorage>, Vec<Country>) {
    let directory = empty_directory().await;
    let mut countries = Vec::new();
    for (_, alpha2, _, _) in COUNTRIES {
        countries.push(
            directory
                .countries()
                .add(country(alpha2))
                .await
                .expect("fixture country is valid"),
        );
    }
    (directory, countries)
}

pub fn walid() -> CustomerPayload {
    CustomerPayload::new("Walid Mohamed", "(20) 123-547-8915")
        .with_email("walid@example.com")
        .with_country_code("EG")
        .with_gender("male")
}

pub fn yosaf() -> CustomerPayload {
    CustomerPayload::new("Yosaf Karrouch", "(212) 6007989253")
        .with_email("yosaf@example.com")
        .with_country_code("MA")
        .with_gender("male")
}

pub fn adaeze() -> CustomerPayload {
    CustomerPayload::new("Adaeze Okafor", "(237) 697151594")
        .with_country_code("CM")
        .with_gender("female")
}

pub fn customer_in(country_code: &str, n: usize) -> CustomerPayload {
    let phone = format!("(1) 555-{:03}-{:04}", n / 1000, n % 10000);
    CustomerPayload::new(format!("Customer {}", n), phone).with_country_code(country_code)
}
