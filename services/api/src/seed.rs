//! Bundled demo data used when no catalog or inventory file is configured.

use smoothie_match::error::AppError;
use smoothie_match::recommendations::{parse_catalog, parse_inventory, Candidate, Ingredient};
use std::io::Cursor;

const CATALOG_JSON: &str = include_str!("../data/catalog.json");
const INVENTORY_CSV: &str = include_str!("../data/inventory.csv");

pub(crate) fn catalog() -> Result<Vec<Candidate>, AppError> {
    Ok(parse_catalog(Cursor::new(CATALOG_JSON))?)
}

pub(crate) fn inventory() -> Result<Vec<Ingredient>, AppError> {
    Ok(parse_inventory(Cursor::new(INVENTORY_CSV))?)
}
