// Product catalog domain module
// Products with their variants, categories, brands and catalog queries

#![allow(clippy::module_inception)]

pub mod catalog;
pub mod filter;
pub mod product;

pub use catalog::{Brand, Category, CategoryUpdate, NewBrand, NewCategory};
pub use filter::{ProductFilter, ProductSort};
pub use product::{NewProduct, Product, ProductImage, ProductUpdate, Rating, Variant, VariantRef};
