//! Activity log store - append-only audit trails for staff and customers.
//!
//! Adapters call these at their boundaries; request context like IP and user
//! agent is whatever the HTTP layer hands in. Log writes that fail should be
//! warned about and swallowed by the caller, never turned into a business
//! failure.

use crate::entities::{
    client_activity_log, staff_activity_log, ClientActivityLog, ClientActivityLogColumn,
    ClientActivityLogModel, StaffActivityLog, StaffActivityLogColumn, StaffActivityLogModel,
};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use std::collections::HashMap;

const DEFAULT_PAGE_SIZE: u64 = 50;

/// One staff action to record.
#[derive(Clone, Debug, Default)]
pub struct StaffActivity {
    pub user_id: i64,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub action_type: String,
    pub description: String,
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub target_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// One customer action to record.
#[derive(Clone, Debug, Default)]
pub struct ClientActivity {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub activity_type: String,
    pub description: String,
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub target_name: Option<String>,
    /// Activity-specific details, stored as JSON text
    pub metadata: Option<serde_json::Value>,
}

/// Appends one staff log entry.
pub async fn log_staff_activity(
    db: &DatabaseConnection,
    entry: StaffActivity,
) -> Result<StaffActivityLogModel> {
    staff_activity_log::ActiveModel {
        user_id: Set(entry.user_id),
        username: Set(entry.username),
        full_name: Set(entry.full_name),
        action_type: Set(entry.action_type),
        action_description: Set(entry.description),
        target_type: Set(entry.target_type),
        target_id: Set(entry.target_id),
        target_name: Set(entry.target_name),
        old_value: Set(entry.old_value),
        new_value: Set(entry.new_value),
        ip_address: Set(entry.ip_address),
        user_agent: Set(entry.user_agent),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Appends one client log entry.
pub async fn log_client_activity(
    db: &DatabaseConnection,
    entry: ClientActivity,
) -> Result<ClientActivityLogModel> {
    let metadata = match entry.metadata {
        Some(value) => Some(serde_json::to_string(&value)?),
        None => None,
    };
    client_activity_log::ActiveModel {
        telegram_id: Set(entry.telegram_id),
        username: Set(entry.username),
        first_name: Set(entry.first_name),
        last_name: Set(entry.last_name),
        activity_type: Set(entry.activity_type),
        activity_description: Set(entry.description),
        target_type: Set(entry.target_type),
        target_id: Set(entry.target_id),
        target_name: Set(entry.target_name),
        metadata: Set(metadata),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Filters for staff log queries. Unset fields match everything;
/// `limit` 0 means the default page size.
#[derive(Clone, Debug, Default)]
pub struct StaffActivityQuery {
    pub user_id: Option<i64>,
    pub action_type: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: u64,
    pub offset: u64,
}

/// Filters for client log queries, same conventions as
/// [`StaffActivityQuery`].
#[derive(Clone, Debug, Default)]
pub struct ClientActivityQuery {
    pub telegram_id: Option<i64>,
    pub activity_type: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: u64,
    pub offset: u64,
}

/// Staff log entries, newest first.
pub async fn staff_activity(
    db: &DatabaseConnection,
    query: &StaffActivityQuery,
) -> Result<Vec<StaffActivityLogModel>> {
    let mut select = StaffActivityLog::find()
        .order_by_desc(StaffActivityLogColumn::CreatedAt)
        .order_by_desc(StaffActivityLogColumn::Id);
    if let Some(user_id) = query.user_id {
        select = select.filter(StaffActivityLogColumn::UserId.eq(user_id));
    }
    if let Some(action_type) = &query.action_type {
        select = select.filter(StaffActivityLogColumn::ActionType.eq(action_type.as_str()));
    }
    if let Some(since) = query.since {
        select = select.filter(StaffActivityLogColumn::CreatedAt.gte(since));
    }
    if let Some(until) = query.until {
        select = select.filter(StaffActivityLogColumn::CreatedAt.lt(until));
    }
    let limit = if query.limit == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        query.limit
    };
    select
        .limit(limit)
        .offset(query.offset)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Client log entries, newest first.
pub async fn client_activity(
    db: &DatabaseConnection,
    query: &ClientActivityQuery,
) -> Result<Vec<ClientActivityLogModel>> {
    let mut select = ClientActivityLog::find()
        .order_by_desc(ClientActivityLogColumn::CreatedAt)
        .order_by_desc(ClientActivityLogColumn::Id);
    if let Some(telegram_id) = query.telegram_id {
        select = select.filter(ClientActivityLogColumn::TelegramId.eq(telegram_id));
    }
    if let Some(activity_type) = &query.activity_type {
        select = select.filter(ClientActivityLogColumn::ActivityType.eq(activity_type.as_str()));
    }
    if let Some(since) = query.since {
        select = select.filter(ClientActivityLogColumn::CreatedAt.gte(since));
    }
    if let Some(until) = query.until {
        select = select.filter(ClientActivityLogColumn::CreatedAt.lt(until));
    }
    let limit = if query.limit == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        query.limit
    };
    select
        .limit(limit)
        .offset(query.offset)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Aggregates over a trailing window of log entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActivityStats {
    pub total: u64,
    /// (type, count), most frequent first
    pub by_type: Vec<(String, u64)>,
    /// (actor label, count), most frequent first
    pub by_actor: Vec<(String, u64)>,
}

fn tally(entries: impl Iterator<Item = (String, String)>) -> ActivityStats {
    let mut total = 0u64;
    let mut by_type: HashMap<String, u64> = HashMap::new();
    let mut by_actor: HashMap<String, u64> = HashMap::new();
    for (kind, actor) in entries {
        total += 1;
        *by_type.entry(kind).or_default() += 1;
        *by_actor.entry(actor).or_default() += 1;
    }
    let mut by_type: Vec<_> = by_type.into_iter().collect();
    by_type.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let mut by_actor: Vec<_> = by_actor.into_iter().collect();
    by_actor.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ActivityStats {
        total,
        by_type,
        by_actor,
    }
}

/// Staff activity totals over the trailing `days` days.
pub async fn staff_activity_stats(db: &DatabaseConnection, days: i64) -> Result<ActivityStats> {
    let cutoff = Utc::now() - chrono::Duration::days(days);
    let rows = StaffActivityLog::find()
        .filter(StaffActivityLogColumn::CreatedAt.gte(cutoff))
        .all(db)
        .await?;
    Ok(tally(rows.into_iter().map(|r| {
        let actor = r.username.unwrap_or_else(|| format!("user #{}", r.user_id));
        (r.action_type, actor)
    })))
}

/// Client activity totals over the trailing `days` days.
pub async fn client_activity_stats(db: &DatabaseConnection, days: i64) -> Result<ActivityStats> {
    let cutoff = Utc::now() - chrono::Duration::days(days);
    let rows = ClientActivityLog::find()
        .filter(ClientActivityLogColumn::CreatedAt.gte(cutoff))
        .all(db)
        .await?;
    Ok(tally(rows.into_iter().map(|r| {
        let actor = r
            .username
            .unwrap_or_else(|| format!("tg #{}", r.telegram_id));
        (r.activity_type, actor)
    })))
}
