use sea_orm::entity::prelude::*;

/// Identity: `hash`. Not block-coordinate versioned — one row per transaction,
/// written once by the function handler that observed it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub hash: String,
    pub proof_set_id: i64,
    pub method: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub status: i16,
    pub height: i64,
    pub message_cid: String,
    pub block_number: i64,
    pub block_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
