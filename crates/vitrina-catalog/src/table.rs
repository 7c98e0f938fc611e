//! In-memory product table and search
//!
//! The sheet schema is purely positional; nothing here interprets cell
//! contents beyond the column mapping below. The table is replaced wholesale
//! on every successful load and never partially mutated.

/// Column layout of the price sheet (0-based)
pub mod columns {
    /// Comma-separated list of image URLs
    pub const IMAGES: usize = 1;
    /// Product code
    pub const CODE: usize = 2;
    /// Product name
    pub const NAME: usize = 3;
    /// Wholesale price
    pub const PRICE: usize = 5;
    /// Alternate product code
    pub const ALT_CODE: usize = 6;
    /// Alternate product name
    pub const ALT_NAME: usize = 7;

    /// Columns consulted by the search
    pub const SEARCHABLE: [usize; 4] = [CODE, NAME, ALT_CODE, ALT_NAME];
}

/// One row of the price sheet, cells in sheet order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductRow {
    cells: Vec<String>,
}

impl ProductRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Cell at `index`, or `None` when the row is too short
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    /// Cell at `index` when present and non-blank
    fn text(&self, index: usize) -> Option<&str> {
        self.cell(index).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Whether any searchable column contains `needle_lower`
    ///
    /// `needle_lower` must already be lowercased; the table does that once
    /// per query.
    fn matches(&self, needle_lower: &str) -> bool {
        columns::SEARCHABLE.iter().any(|&index| {
            self.cell(index)
                .is_some_and(|cell| cell.to_lowercase().contains(needle_lower))
        })
    }

    /// Image URLs of this row: the image cell split on commas, trimmed,
    /// blanks dropped
    pub fn image_urls(&self) -> impl Iterator<Item = &str> {
        self.cell(columns::IMAGES)
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// Render-ready projection of one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub code: String,
    pub name: String,
    pub price: String,
    /// First image URL of the row, if any
    pub image: Option<String>,
}

impl ProductCard {
    /// Shown when both code columns are blank
    pub const NO_CODE: &'static str = "No code";
    /// Shown when the name column is blank
    pub const NO_NAME: &'static str = "Unnamed";
    /// Shown when the price column is blank
    pub const NO_PRICE: &'static str = "Price on request";

    pub fn from_row(row: &ProductRow) -> Self {
        Self {
            code: row
                .text(columns::CODE)
                .or_else(|| row.text(columns::ALT_CODE))
                .unwrap_or(Self::NO_CODE)
                .to_string(),
            name: row
                .text(columns::NAME)
                .unwrap_or(Self::NO_NAME)
                .to_string(),
            price: row
                .text(columns::PRICE)
                .unwrap_or(Self::NO_PRICE)
                .to_string(),
            image: row.image_urls().next().map(str::to_string),
        }
    }
}

/// The whole price list, in sheet order
#[derive(Debug, Default)]
pub struct ProductTable {
    rows: Vec<ProductRow>,
}

impl ProductTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table wholesale with a freshly loaded sheet
    pub fn replace(&mut self, rows: Vec<ProductRow>) {
        self.rows = rows;
    }

    pub fn rows(&self) -> &[ProductRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive substring search over the searchable columns,
    /// results in table order
    ///
    /// The controller short-circuits empty queries before they reach here.
    pub fn search(&self, query: &str) -> Vec<&ProductRow> {
        let needle = query.to_lowercase();
        self.rows.iter().filter(|row| row.matches(&needle)).collect()
    }

    /// Every image URL in the table, deduplicated preserving first-seen order
    pub fn image_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        for row in &self.rows {
            for url in row.image_urls() {
                if !urls.iter().any(|existing| existing == url) {
                    urls.push(url.to_string());
                }
            }
        }
        urls
    }
}
