// User domain module
// Accounts, profiles and the address book

#![allow(clippy::module_inception)]

pub mod user;
pub mod value_objects;

pub use user::{Address, AddressUpdate, NewAddress, Profile, User};
pub use value_objects::{Role, Username};
