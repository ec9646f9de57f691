use sea_orm::entity::prelude::*;

/// Versioned by `(set_id, block_number)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "proof_sets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub set_id: i64,
    pub owner: String,
    pub listener_addr: String,
    pub is_active: bool,
    pub challenge_range: i64,
    pub next_challenge_epoch: i64,
    pub last_proven_epoch: i64,
    pub total_roots: i64,
    pub total_proved_roots: i64,
    pub total_data_size: i64,
    pub total_fee_paid: i64,
    pub total_faulted_periods: i64,
    pub block_number: i64,
    pub block_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
