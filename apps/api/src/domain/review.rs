use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::errors::{DomainResult, Violations};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_COMMENT_LEN: usize = 1000;

/// Product review tied to a delivered order
///
/// Reviews start verified (the order proves the purchase) and unapproved;
/// only approved reviews are public and count towards the product rating.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Username of the reviewer when the review was written
    pub author: String,
    pub product_id: Uuid,
    pub order_id: Uuid,
    pub rating: i16,
    pub title: String,
    pub comment: String,
    pub is_verified_purchase: bool,
    pub is_approved: bool,
    #[serde(skip_serializing)]
    pub helpful_by: Vec<Uuid>,
    pub helpful_count: i32,
    pub admin_response: Option<AdminResponse>,
    /// Set once an admin approved or rejected the review
    pub moderated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub message: String,
    pub responded_by: Uuid,
    pub responded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: Uuid,
    pub order_id: Uuid,
    pub rating: i16,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HelpfulAction {
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationAction {
    Approve,
    Reject,
}

impl Review {
    pub fn new(new: NewReview, user_id: Uuid, author: impl Into<String>) -> DomainResult<Self> {
        let title = new.title.trim().to_string();
        let comment = new.comment.trim().to_string();

        let mut v = Violations::new();
        v.check(
            !(1..=5).contains(&new.rating),
            "Rating must be between 1 and 5",
        )
        .check(title.is_empty(), "Review title is required")
        .check(
            title.chars().count() > MAX_TITLE_LEN,
            format!("Title cannot exceed {MAX_TITLE_LEN} characters"),
        )
        .check(comment.is_empty(), "Review comment is required")
        .check(
            comment.chars().count() > MAX_COMMENT_LEN,
            format!("Comment cannot exceed {MAX_COMMENT_LEN} characters"),
        );
        v.into_result()?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            author: author.into(),
            product_id: new.product_id,
            order_id: new.order_id,
            rating: new.rating,
            title,
            comment,
            is_verified_purchase: true,
            is_approved: false,
            helpful_by: Vec::new(),
            helpful_count: 0,
            admin_response: None,
            moderated_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Adds or removes `user_id` from the helpful votes
    pub fn toggle_helpful(&mut self, user_id: Uuid) -> HelpfulAction {
        let action = if let Some(pos) = self.helpful_by.iter().position(|u| *u == user_id) {
            self.helpful_by.remove(pos);
            HelpfulAction::Removed
        } else {
            self.helpful_by.push(user_id);
            HelpfulAction::Added
        };
        self.helpful_count = i32::try_from(self.helpful_by.len()).unwrap_or(i32::MAX);
        self.updated_at = Utc::now();
        action
    }

    /// Awaiting an admin decision
    pub fn is_pending(&self) -> bool {
        self.moderated_at.is_none()
    }

    pub fn moderate(&mut self, action: ModerationAction, response: Option<String>, admin_id: Uuid) {
        let now = Utc::now();
        self.is_approved = action == ModerationAction::Approve;
        self.moderated_at = Some(now);
        if let Some(message) = response.filter(|m| !m.trim().is_empty()) {
            self.admin_response = Some(AdminResponse {
                message,
                responded_by: admin_id,
                responded_at: now,
            });
        }
        self.updated_at = now;
    }
}

/// Sort order for public review listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    HighestRated,
    LowestRated,
    MostHelpful,
}

impl ReviewSort {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or_default() {
            "createdAt" => Self::Oldest,
            "-rating" => Self::HighestRated,
            "rating" => Self::LowestRated,
            "-helpfulCount" => Self::MostHelpful,
            _ => Self::Newest,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC",
            Self::Oldest => "created_at ASC",
            Self::HighestRated => "rating DESC, created_at DESC",
            Self::LowestRated => "rating ASC, created_at DESC",
            Self::MostHelpful => "helpful_count DESC, created_at DESC",
        }
    }

    pub fn compare(&self, a: &Review, b: &Review) -> std::cmp::Ordering {
        let newest = b.created_at.cmp(&a.created_at);
        match self {
            Self::Newest => newest,
            Self::Oldest => a.created_at.cmp(&b.created_at),
            Self::HighestRated => b.rating.cmp(&a.rating).then(newest),
            Self::LowestRated => a.rating.cmp(&b.rating).then(newest),
            Self::MostHelpful => b.helpful_count.cmp(&a.helpful_count).then(newest),
        }
    }
}

/// Rating distribution of a product's approved reviews
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
    /// Number of reviews per star, index 0 is one star
    pub distribution: [i64; 5],
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i16]) -> Self {
        let mut distribution = [0i64; 5];
        for r in ratings {
            if let Some(slot) = usize::try_from(*r - 1).ok().and_then(|i| distribution.get_mut(i)) {
                *slot += 1;
            }
        }
        let rating = super::product::Rating::from_ratings(ratings);
        Self {
            average: rating.average,
            count: rating.count,
            distribution,
        }
    }
}

impl Serialize for RatingSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("average", &self.average)?;
        map.serialize_entry("count", &self.count)?;
        for (i, n) in self.distribution.iter().enumerate() {
            map.serialize_entry(&(i + 1).to_string(), n)?;
        }
        map.end()
    }
}
