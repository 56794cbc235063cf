pub mod errors;
pub mod db;
pub mod fields;
pub mod shop;
pub mod product;
