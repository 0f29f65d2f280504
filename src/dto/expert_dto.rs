use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::expert::{Expert, ExpertWithSlots, Slot};
use crate::services::expert_service::ExpertList;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExpertListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpertSummary {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub experience: i32,
    pub rating: f64,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotResponse {
    pub date: String,
    pub time: String,
    pub is_booked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpertResponse {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub experience: i32,
    pub rating: f64,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub slots: Vec<SlotResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpertListResponse {
    pub items: Vec<ExpertSummary>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl From<Expert> for ExpertSummary {
    fn from(value: Expert) -> Self {
        Self {
            id: value.id,
            name: value.name,
            category: value.category,
            experience: value.experience,
            rating: value.rating,
            bio: value.bio,
            avatar: value.avatar,
            hourly_rate: value.hourly_rate,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Slot> for SlotResponse {
    fn from(value: Slot) -> Self {
        Self {
            date: value.date,
            time: value.time,
            is_booked: value.is_booked,
        }
    }
}

impl From<ExpertWithSlots> for ExpertResponse {
    fn from(value: ExpertWithSlots) -> Self {
        let expert = value.expert;
        Self {
            id: expert.id,
            name: expert.name,
            category: expert.category,
            experience: expert.experience,
            rating: expert.rating,
            bio: expert.bio,
            avatar: expert.avatar,
            hourly_rate: expert.hourly_rate,
            slots: value.slots.into_iter().map(Into::into).collect(),
            created_at: expert.created_at,
            updated_at: expert.updated_at,
        }
    }
}

impl From<ExpertList> for ExpertListResponse {
    fn from(value: ExpertList) -> Self {
        Self {
            items: value.items.into_iter().map(Into::into).collect(),
            total: value.total,
            page: value.page,
            limit: value.limit,
            pages: value.pages,
        }
    }
}
