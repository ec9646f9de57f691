use sea_orm::entity::prelude::*;

/// Append-only; idempotent on `fee_id = "{tx_hash}_{log_index}"`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "proof_fees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub fee_id: String,
    pub set_id: i64,
    pub proof_fee: i64,
    pub fil_usd_price: i64,
    pub fil_usd_price_exponent: i32,
    pub block_number: i64,
    pub block_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
