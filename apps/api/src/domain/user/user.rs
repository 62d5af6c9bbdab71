use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{Role, Username};
use crate::domain::errors::{DomainError, DomainResult};

/// Country applied to new addresses that do not name one
pub const DEFAULT_COUNTRY: &str = "India";

/// Store account
///
/// Addresses and the profile are owned by the user and persisted with it.
/// The password hash never leaves the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: Username,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub profile: Profile,
    pub addresses: Vec<Address>,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
}

/// Address fields submitted when adding to the address book
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    pub country: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Partial address update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressUpdate {
    pub full_name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub is_default: Option<bool>,
}

impl User {
    /// Creates a new active customer account
    pub fn new(username: Username, password_hash: String, profile: Profile) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash,
            role: Role::Customer,
            profile,
            addresses: Vec::new(),
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Display name used on invoices and review listings
    pub fn display_name(&self) -> String {
        match (&self.profile.first_name, &self.profile.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self.username.to_string(),
        }
    }

    pub fn address(&self, id: Uuid) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    /// Adds an address; a default address clears the flag on all others
    pub fn add_address(&mut self, new: NewAddress) -> &Address {
        if new.is_default {
            self.clear_default();
        }
        self.addresses.push(Address {
            id: Uuid::new_v4(),
            full_name: new.full_name,
            street: new.street,
            city: new.city,
            state: new.state,
            zip_code: new.zip_code,
            country: new
                .country
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
            phone: new.phone,
            is_default: new.is_default,
        });
        self.touch();
        &self.addresses[self.addresses.len() - 1]
    }

    pub fn update_address(&mut self, id: Uuid, update: AddressUpdate) -> DomainResult<()> {
        if self.address(id).is_none() {
            return Err(DomainError::not_found("Address not found"));
        }
        if update.is_default == Some(true) {
            self.clear_default();
        }

        if let Some(address) = self.addresses.iter_mut().find(|a| a.id == id) {
            if let Some(v) = update.full_name {
                address.full_name = v;
            }
            if let Some(v) = update.street {
                address.street = v;
            }
            if let Some(v) = update.city {
                address.city = v;
            }
            if let Some(v) = update.state {
                address.state = v;
            }
            if let Some(v) = update.zip_code {
                address.zip_code = v;
            }
            if let Some(v) = update.country {
                address.country = v;
            }
            if let Some(v) = update.phone {
                address.phone = v;
            }
            if let Some(v) = update.is_default {
                address.is_default = v;
            }
        }
        self.touch();
        Ok(())
    }

    /// Removes an address; unknown ids are ignored
    pub fn remove_address(&mut self, id: Uuid) {
        self.addresses.retain(|a| a.id != id);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn clear_default(&mut self) {
        for address in &mut self.addresses {
            address.is_default = false;
        }
    }
}
