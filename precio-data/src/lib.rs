//! Reference fiscal data: the built-in SAT withholding tariffs and the CSV
//! loader for replacement tariff files.

pub mod loader;
pub mod tables;

pub use loader::{TariffLoader, TariffLoaderError, TariffRecord};
pub use tables::{IVA_RATE, sat_2026};
