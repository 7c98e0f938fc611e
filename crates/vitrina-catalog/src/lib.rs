//! Price-list catalog
//!
//! Everything between the remote spreadsheet and the search box:
//!
//! - `SheetClient` fetches the published price list as rows of cells
//! - `ProductTable` holds the rows in memory and answers substring searches
//! - `ProductCard` is the render-ready projection of one row
//! - `client` builds the pooled HTTP client shared across the kiosk

pub mod client;
pub mod error;
pub mod sheet;
pub mod table;

pub use client::{HttpClientConfig, create_client};
pub use error::{CatalogError, Result};
pub use sheet::{SheetClient, SheetConfig};
pub use table::{ProductCard, ProductRow, ProductTable, columns};
