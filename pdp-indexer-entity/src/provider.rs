use sea_orm::entity::prelude::*;

/// Versioned by `(address, block_number)`; `find_latest` selects the row
/// with the greatest `block_number` for a given `address`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "providers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub address: String,
    pub total_faulted_periods: i64,
    pub total_data_size: i64,
    pub proof_set_ids: Vec<i64>,
    pub block_number: i64,
    pub block_hash: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
