use sea_orm::entity::prelude::*;

/// Append-only fact of a missed proving period.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fault_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub set_id: i64,
    pub root_ids: Vec<i64>,
    pub current_challenge_epoch: i64,
    pub next_challenge_epoch: i64,
    pub periods_faulted: i64,
    pub deadline: i64,
    pub block_number: i64,
    pub block_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
