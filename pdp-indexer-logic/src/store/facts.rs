//! Append-only fact tables. `proofs` and `fault_records` have no natural
//! idempotency key beyond their full composite identity, so duplicate
//! inserts during replay are avoided by the caller deleting the range first
//! (`delete_reorged`); `proof_fees`, `event_logs` and `transactions` carry
//! an explicit conflict-free key and ignore duplicate inserts directly.

use pdp_indexer_entity::{event_log, fault_record, proof, proof_fee, transaction};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr, EntityTrait};

#[derive(Clone, Debug)]
pub struct NewProof {
    pub set_id: i64,
    pub root_id: i64,
    pub proof_offset: i64,
    pub leaf_hash: Vec<u8>,
    pub merkle_proof: Vec<u8>,
    pub proven_at: i64,
    pub block_number: i64,
    pub block_hash: String,
}

pub async fn append_proof<C: ConnectionTrait>(conn: &C, row: NewProof) -> Result<(), DbErr> {
    let model = proof::ActiveModel {
        set_id: Set(row.set_id),
        root_id: Set(row.root_id),
        proof_offset: Set(row.proof_offset),
        leaf_hash: Set(row.leaf_hash),
        merkle_proof: Set(row.merkle_proof),
        proven_at: Set(row.proven_at),
        block_number: Set(row.block_number),
        block_hash: Set(row.block_hash),
        ..Default::default()
    };
    proof::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                proof::Column::SetId,
                proof::Column::RootId,
                proof::Column::ProofOffset,
                proof::Column::BlockNumber,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

#[derive(Clone, Debug)]
pub struct NewFaultRecord {
    pub set_id: i64,
    pub root_ids: Vec<i64>,
    pub current_challenge_epoch: i64,
    pub next_challenge_epoch: i64,
    pub periods_faulted: i64,
    pub deadline: i64,
    pub block_number: i64,
    pub block_hash: String,
}

pub async fn append_fault_record<C: ConnectionTrait>(
    conn: &C,
    row: NewFaultRecord,
) -> Result<(), DbErr> {
    let model = fault_record::ActiveModel {
        set_id: Set(row.set_id),
        root_ids: Set(row.root_ids),
        current_challenge_epoch: Set(row.current_challenge_epoch),
        next_challenge_epoch: Set(row.next_challenge_epoch),
        periods_faulted: Set(row.periods_faulted),
        deadline: Set(row.deadline),
        block_number: Set(row.block_number),
        block_hash: Set(row.block_hash),
        ..Default::default()
    };
    fault_record::Entity::insert(model).exec(conn).await?;
    Ok(())
}

#[derive(Clone, Debug)]
pub struct NewProofFee {
    pub fee_id: String,
    pub set_id: i64,
    pub proof_fee: i64,
    pub fil_usd_price: i64,
    pub fil_usd_price_exponent: i32,
    pub block_number: i64,
    pub block_hash: String,
}

/// Idempotent on `fee_id`; a duplicate insert (replay of an already
/// processed block) is silently ignored.
pub async fn append_proof_fee<C: ConnectionTrait>(conn: &C, row: NewProofFee) -> Result<(), DbErr> {
    let model = proof_fee::ActiveModel {
        fee_id: Set(row.fee_id),
        set_id: Set(row.set_id),
        proof_fee: Set(row.proof_fee),
        fil_usd_price: Set(row.fil_usd_price),
        fil_usd_price_exponent: Set(row.fil_usd_price_exponent),
        block_number: Set(row.block_number),
        block_hash: Set(row.block_hash),
    };
    proof_fee::Entity::insert(model)
        .on_conflict(
            OnConflict::column(proof_fee::Column::FeeId)
                .do_nothing()
                .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

#[derive(Clone, Debug)]
pub struct NewEventLog {
    pub tx_hash: String,
    pub log_index: i64,
    pub address: String,
    pub topic0: String,
    pub data: Vec<u8>,
    pub block_number: i64,
    pub block_hash: String,
    pub removed: bool,
}

/// Idempotent on `(tx_hash, log_index)`.
pub async fn append_event_log<C: ConnectionTrait>(conn: &C, row: NewEventLog) -> Result<(), DbErr> {
    let model = event_log::ActiveModel {
        tx_hash: Set(row.tx_hash),
        log_index: Set(row.log_index),
        address: Set(row.address),
        topic0: Set(row.topic0),
        data: Set(row.data),
        block_number: Set(row.block_number),
        block_hash: Set(row.block_hash),
        removed: Set(row.removed),
    };
    event_log::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([event_log::Column::TxHash, event_log::Column::LogIndex])
                .do_nothing()
                .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

#[derive(Clone, Debug)]
pub struct NewTransaction {
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

/// Idempotent on `hash`.
pub async fn append_transaction<C: ConnectionTrait>(
    conn: &C,
    row: NewTransaction,
) -> Result<(), DbErr> {
    let model = transaction::ActiveModel {
        hash: Set(row.hash),
        proof_set_id: Set(row.proof_set_id),
        method: Set(row.method),
        from: Set(row.from),
        to: Set(row.to),
        value: Set(row.value),
        status: Set(row.status),
        height: Set(row.height),
        message_cid: Set(row.message_cid),
        block_number: Set(row.block_number),
        block_hash: Set(row.block_hash),
    };
    transaction::Entity::insert(model)
        .on_conflict(
            OnConflict::column(transaction::Column::Hash)
                .do_nothing()
                .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}
