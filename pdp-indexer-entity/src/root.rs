use sea_orm::entity::prelude::*;

/// Versioned by `(set_id, root_id, block_number)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub set_id: i64,
    pub root_id: i64,
    pub raw_size: i64,
    pub cid: String,
    pub removed: bool,
    pub total_proofs_submitted: i64,
    pub total_periods_faulted: i64,
    pub last_proven_epoch: i64,
    pub last_faulted_epoch: i64,
    pub block_number: i64,
    pub block_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
