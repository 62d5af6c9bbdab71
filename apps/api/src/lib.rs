//! Storefront API Library
//!
//! This library provides the core functionality for the storefront REST API,
//! including domain logic, repositories, and infrastructure components.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod state;
