use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::database::{with_timeout, Store};
use crate::dto::expert_dto::ExpertListQuery;
use crate::error::{Error, Result};
use crate::models::expert::{
    Expert, ExpertFilter, ExpertWithSlots, NewExpert, Slot, ALL_CATEGORIES,
};
use crate::services::schedule;
use crate::utils::time::today;

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct ExpertService {
    store: Arc<dyn Store>,
    timeout: Duration,
}

pub struct ExpertList {
    pub items: Vec<Expert>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

fn expert_not_found() -> Error {
    Error::NotFound("Expert not found".to_string())
}

/// Ids arrive as path segments; a malformed one cannot name an expert.
fn parse_expert_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| expert_not_found())
}

impl ExpertService {
    pub fn new(store: Arc<dyn Store>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn list(&self, query: ExpertListQuery) -> Result<ExpertList> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let category = query
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty() && c != ALL_CATEGORIES);

        let filter = ExpertFilter {
            search,
            category,
            offset: (page - 1).saturating_mul(limit),
            limit,
        };
        let result = with_timeout(self.timeout, self.store.list_experts(&filter)).await?;

        let pages = (result.total + limit - 1) / limit;
        Ok(ExpertList {
            items: result.items,
            total: result.total,
            page,
            limit,
            pages,
        })
    }

    pub async fn get(&self, id: &str) -> Result<ExpertWithSlots> {
        let id = parse_expert_id(id)?;
        with_timeout(self.timeout, self.store.get_expert(id))
            .await?
            .ok_or_else(expert_not_found)
    }

    pub async fn list_slots(&self, id: &str) -> Result<Vec<Slot>> {
        let id = parse_expert_id(id)?;
        with_timeout(self.timeout, self.store.list_slots(id))
            .await?
            .ok_or_else(expert_not_found)
    }

    /// Creates an expert with the standard schedule of open slots.
    pub async fn provision(&self, expert: NewExpert) -> Result<ExpertWithSlots> {
        if !(1.0..=5.0).contains(&expert.rating) {
            return Err(Error::BadRequest(format!(
                "Rating {} is outside 1.0 to 5.0",
                expert.rating
            )));
        }
        let slots = schedule::default_slots(today());
        with_timeout(self.timeout, self.store.insert_expert(expert, slots)).await
    }

    pub async fn count(&self) -> Result<i64> {
        with_timeout(self.timeout, self.store.count_experts()).await
    }
}
