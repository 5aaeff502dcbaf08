//! Customer identity - bot user upserts and counters.
//!
//! One row per Telegram user, keyed by `telegram_id`. Interaction tracking
//! and buyer marking are both upserts, so they work whether or not the user
//! has been seen before.

use crate::entities::{bot_user, BotUser, BotUserColumn, BotUserModel};
use crate::errors::Result;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};

async fn find_by_telegram_id<C: ConnectionTrait>(
    conn: &C,
    telegram_id: i64,
) -> Result<Option<BotUserModel>> {
    BotUser::find()
        .filter(BotUserColumn::TelegramId.eq(telegram_id))
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Records one interaction from a Telegram user, creating the row on first
/// contact. Name fields are refreshed on every call so renames are picked up.
pub async fn record_interaction<C: ConnectionTrait>(
    conn: &C,
    telegram_id: i64,
    username: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<BotUserModel> {
    let now = chrono::Utc::now();
    match find_by_telegram_id(conn, telegram_id).await? {
        Some(existing) => {
            let interactions = existing.total_interactions;
            let mut active: bot_user::ActiveModel = existing.into();
            active.username = Set(username.map(ToString::to_string));
            active.first_name = Set(first_name.map(ToString::to_string));
            active.last_name = Set(last_name.map(ToString::to_string));
            active.total_interactions = Set(interactions + 1);
            active.last_active = Set(now);
            active.update(conn).await.map_err(Into::into)
        }
        None => bot_user::ActiveModel {
            telegram_id: Set(telegram_id),
            username: Set(username.map(ToString::to_string)),
            first_name: Set(first_name.map(ToString::to_string)),
            last_name: Set(last_name.map(ToString::to_string)),
            total_interactions: Set(1),
            has_placed_order: Set(false),
            created_at: Set(now),
            last_active: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(Into::into),
    }
}

/// Marks a Telegram user as a buyer and stores their phone number.
///
/// Idempotent, and an upsert: the order engine calls this inside its
/// transaction even for customers that never browsed through the bot.
pub async fn mark_buyer<C: ConnectionTrait>(
    conn: &C,
    telegram_id: i64,
    username: Option<&str>,
    name: Option<&str>,
    phone: &str,
) -> Result<BotUserModel> {
    let now = chrono::Utc::now();
    match find_by_telegram_id(conn, telegram_id).await? {
        Some(existing) => {
            let mut active: bot_user::ActiveModel = existing.into();
            active.has_placed_order = Set(true);
            active.phone = Set(Some(phone.to_string()));
            if username.is_some() {
                active.username = Set(username.map(ToString::to_string));
            }
            active.last_active = Set(now);
            active.update(conn).await.map_err(Into::into)
        }
        None => bot_user::ActiveModel {
            telegram_id: Set(telegram_id),
            username: Set(username.map(ToString::to_string)),
            first_name: Set(name.map(ToString::to_string)),
            last_name: Set(None),
            phone: Set(Some(phone.to_string())),
            total_interactions: Set(0),
            has_placed_order: Set(true),
            created_at: Set(now),
            last_active: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(Into::into),
    }
}

/// Fetches a bot user by Telegram id.
pub async fn get_bot_user(
    db: &DatabaseConnection,
    telegram_id: i64,
) -> Result<Option<BotUserModel>> {
    find_by_telegram_id(db, telegram_id).await
}

/// All bot users, most recently active first.
pub async fn list_bot_users(db: &DatabaseConnection) -> Result<Vec<BotUserModel>> {
    BotUser::find()
        .order_by_desc(BotUserColumn::LastActive)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Total number of known bot users.
pub async fn count_bot_users(db: &DatabaseConnection) -> Result<u64> {
    BotUser::find().count(db).await.map_err(Into::into)
}

/// Number of users that have placed at least one order.
pub async fn count_buyers(db: &DatabaseConnection) -> Result<u64> {
    BotUser::find()
        .filter(BotUserColumn::HasPlacedOrder.eq(true))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Telegram ids for broadcast notifications (e.g. new product announcements).
pub async fn notification_recipients(db: &DatabaseConnection) -> Result<Vec<i64>> {
    Ok(list_bot_users(db)
        .await?
        .into_iter()
        .map(|u| u.telegram_id)
        .collect())
}
