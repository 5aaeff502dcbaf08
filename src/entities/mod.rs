//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod bot_user;
pub mod category;
pub mod client_activity_log;
pub mod color_option;
pub mod inventory_history;
pub mod order;
pub mod order_item;
pub mod product;
pub mod size_option;
pub mod staff_activity_log;
pub mod staff_user;
pub mod variant;

// Re-export specific types to avoid conflicts
pub use bot_user::{Column as BotUserColumn, Entity as BotUser, Model as BotUserModel};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use client_activity_log::{
    Column as ClientActivityLogColumn, Entity as ClientActivityLog, Model as ClientActivityLogModel,
};
pub use color_option::{Column as ColorOptionColumn, Entity as ColorOption, Model as ColorOptionModel};
pub use inventory_history::{
    ChangeType, Column as InventoryHistoryColumn, Entity as InventoryHistory,
    Model as InventoryHistoryModel,
};
pub use order::{Column as OrderColumn, Entity as Order, Model as OrderModel, OrderStatus};
pub use order_item::{Column as OrderItemColumn, Entity as OrderItem, Model as OrderItemModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use size_option::{Column as SizeOptionColumn, Entity as SizeOption, Model as SizeOptionModel};
pub use staff_activity_log::{
    Column as StaffActivityLogColumn, Entity as StaffActivityLog, Model as StaffActivityLogModel,
};
pub use staff_user::{Column as StaffUserColumn, Entity as StaffUser, Model as StaffUserModel};
pub use variant::{Column as VariantColumn, Entity as Variant, Model as VariantModel};
