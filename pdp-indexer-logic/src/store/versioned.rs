//! Block-coordinate versioned entities: `put_*` upserts idempotently on
//! `(identity, block_number)`; `find_*` returns the latest version or the
//! full ordered history.

use pdp_indexer_entity::{proof_set, provider, root};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

pub type ProviderRow = provider::Model;
pub type ProofSetRow = proof_set::Model;
pub type RootRow = root::Model;

#[derive(Clone, Debug)]
pub struct PutProvider {
    pub address: String,
    pub total_faulted_periods: i64,
    pub total_data_size: i64,
    pub proof_set_ids: Vec<i64>,
    pub block_number: i64,
    pub block_hash: String,
}

#[derive(Clone, Debug)]
pub struct PutProofSet {
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

#[derive(Clone, Debug)]
pub struct PutRoot {
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

pub async fn put_provider<C: ConnectionTrait>(conn: &C, row: PutProvider) -> Result<(), DbErr> {
    let model = provider::ActiveModel {
        address: Set(row.address),
        total_faulted_periods: Set(row.total_faulted_periods),
        total_data_size: Set(row.total_data_size),
        proof_set_ids: Set(row.proof_set_ids),
        block_number: Set(row.block_number),
        block_hash: Set(row.block_hash),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    provider::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([provider::Column::Address, provider::Column::BlockNumber])
                .update_columns([
                    provider::Column::TotalFaultedPeriods,
                    provider::Column::TotalDataSize,
                    provider::Column::ProofSetIds,
                    provider::Column::BlockHash,
                    provider::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn find_provider_latest<C: ConnectionTrait>(
    conn: &C,
    address: &str,
) -> Result<Option<ProviderRow>, DbErr> {
    provider::Entity::find()
        .filter(provider::Column::Address.eq(address))
        .order_by_desc(provider::Column::BlockNumber)
        .one(conn)
        .await
}

pub async fn find_provider_history<C: ConnectionTrait>(
    conn: &C,
    address: &str,
) -> Result<Vec<ProviderRow>, DbErr> {
    provider::Entity::find()
        .filter(provider::Column::Address.eq(address))
        .order_by_asc(provider::Column::BlockNumber)
        .all(conn)
        .await
}

pub async fn put_proof_set<C: ConnectionTrait>(conn: &C, row: PutProofSet) -> Result<(), DbErr> {
    let model = proof_set::ActiveModel {
        set_id: Set(row.set_id),
        owner: Set(row.owner),
        listener_addr: Set(row.listener_addr),
        is_active: Set(row.is_active),
        challenge_range: Set(row.challenge_range),
        next_challenge_epoch: Set(row.next_challenge_epoch),
        last_proven_epoch: Set(row.last_proven_epoch),
        total_roots: Set(row.total_roots),
        total_proved_roots: Set(row.total_proved_roots),
        total_data_size: Set(row.total_data_size),
        total_fee_paid: Set(row.total_fee_paid),
        total_faulted_periods: Set(row.total_faulted_periods),
        block_number: Set(row.block_number),
        block_hash: Set(row.block_hash),
        ..Default::default()
    };
    proof_set::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([proof_set::Column::SetId, proof_set::Column::BlockNumber])
                .update_columns([
                    proof_set::Column::Owner,
                    proof_set::Column::ListenerAddr,
                    proof_set::Column::IsActive,
                    proof_set::Column::ChallengeRange,
                    proof_set::Column::NextChallengeEpoch,
                    proof_set::Column::LastProvenEpoch,
                    proof_set::Column::TotalRoots,
                    proof_set::Column::TotalProvedRoots,
                    proof_set::Column::TotalDataSize,
                    proof_set::Column::TotalFeePaid,
                    proof_set::Column::TotalFaultedPeriods,
                    proof_set::Column::BlockHash,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn find_proof_set_latest<C: ConnectionTrait>(
    conn: &C,
    set_id: i64,
) -> Result<Option<ProofSetRow>, DbErr> {
    proof_set::Entity::find()
        .filter(proof_set::Column::SetId.eq(set_id))
        .order_by_desc(proof_set::Column::BlockNumber)
        .one(conn)
        .await
}

pub async fn find_proof_set_history<C: ConnectionTrait>(
    conn: &C,
    set_id: i64,
) -> Result<Vec<ProofSetRow>, DbErr> {
    proof_set::Entity::find()
        .filter(proof_set::Column::SetId.eq(set_id))
        .order_by_asc(proof_set::Column::BlockNumber)
        .all(conn)
        .await
}

pub async fn put_root<C: ConnectionTrait>(conn: &C, row: PutRoot) -> Result<(), DbErr> {
    let model = root::ActiveModel {
        set_id: Set(row.set_id),
        root_id: Set(row.root_id),
        raw_size: Set(row.raw_size),
        cid: Set(row.cid),
        removed: Set(row.removed),
        total_proofs_submitted: Set(row.total_proofs_submitted),
        total_periods_faulted: Set(row.total_periods_faulted),
        last_proven_epoch: Set(row.last_proven_epoch),
        last_faulted_epoch: Set(row.last_faulted_epoch),
        block_number: Set(row.block_number),
        block_hash: Set(row.block_hash),
        ..Default::default()
    };
    root::Entity::insert(model)
        .on_conflict(
            OnConflict::columns([
                root::Column::SetId,
                root::Column::RootId,
                root::Column::BlockNumber,
            ])
            .update_columns([
                root::Column::RawSize,
                root::Column::Cid,
                root::Column::Removed,
                root::Column::TotalProofsSubmitted,
                root::Column::TotalPeriodsFaulted,
                root::Column::LastProvenEpoch,
                root::Column::LastFaultedEpoch,
                root::Column::BlockHash,
            ])
            .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn find_root_latest<C: ConnectionTrait>(
    conn: &C,
    set_id: i64,
    root_id: i64,
) -> Result<Option<RootRow>, DbErr> {
    root::Entity::find()
        .filter(root::Column::SetId.eq(set_id))
        .filter(root::Column::RootId.eq(root_id))
        .order_by_desc(root::Column::BlockNumber)
        .one(conn)
        .await
}

pub async fn find_root_history<C: ConnectionTrait>(
    conn: &C,
    set_id: i64,
    root_id: i64,
) -> Result<Vec<RootRow>, DbErr> {
    root::Entity::find()
        .filter(root::Column::SetId.eq(set_id))
        .filter(root::Column::RootId.eq(root_id))
        .order_by_asc(root::Column::BlockNumber)
        .all(conn)
        .await
}
