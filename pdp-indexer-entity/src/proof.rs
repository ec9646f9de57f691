use sea_orm::entity::prelude::*;

/// Append-only; natural key `(set_id, root_id, proof_offset, block_number)`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "proofs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,
    pub set_id: i64,
    pub root_id: i64,
    pub proof_offset: i64,
    pub leaf_hash: Vec<u8>,
    pub merkle_proof: Vec<u8>,
    pub proven_at: i64,
    pub block_number: i64,
    pub block_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
