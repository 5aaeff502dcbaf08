//! Bot user entity - Every customer who has ever interacted with the bot.
//!
//! This is the single customer table: buyers are the subset with
//! `has_placed_order` set, which the order engine maintains through an
//! idempotent upsert at order time. There is no separate "customers" table
//! to keep in sync.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Bot user database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bot_users")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Telegram user id, unique per user
    #[sea_orm(unique)]
    pub telegram_id: i64,
    /// Chat username, if set
    pub username: Option<String>,
    /// First name from the chat profile
    pub first_name: Option<String>,
    /// Last name from the chat profile
    pub last_name: Option<String>,
    /// Phone number, captured when an order is placed
    pub phone: Option<String>,
    /// Count of bot interactions
    pub total_interactions: i32,
    /// Whether this user has placed at least one order
    pub has_placed_order: bool,
    /// When the user first interacted
    pub created_at: DateTimeUtc,
    /// When the user last interacted
    pub last_active: DateTimeUtc,
}

/// `BotUser` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
