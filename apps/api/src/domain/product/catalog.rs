use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent_id: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub parent: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl Category {
    pub fn new(new: NewCategory) -> DomainResult<Self> {
        let name = required_name(&new.name, "Category name is required")?;
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description: new.description,
            image: new.image,
            parent_id: new.parent,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply(&mut self, update: CategoryUpdate) -> DomainResult<()> {
        if let Some(name) = update.name {
            self.name = required_name(&name, "Category name is required")?;
        }
        if let Some(parent) = update.parent {
            if parent == self.id {
                return Err(DomainError::invalid("A category cannot be its own parent"));
            }
            self.parent_id = Some(parent);
        }
        if update.description.is_some() {
            self.description = update.description;
        }
        if update.image.is_some() {
            self.image = update.image;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBrand {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub logo: Option<String>,
}

impl Brand {
    pub fn new(new: NewBrand) -> DomainResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: required_name(&new.name, "Brand name is required")?,
            description: new.description,
            logo: new.logo,
            is_active: true,
            created_at: Utc::now(),
        })
    }
}

fn required_name(name: &str, message: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        Err(DomainError::invalid(message))
    } else {
        Ok(name.to_string())
    }
}
