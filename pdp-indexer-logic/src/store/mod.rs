mod cleanup;
mod facts;
mod versioned;

use std::sync::Arc;

use async_trait::async_trait;
use pdp_indexer_entity::{block, event_log, fault_record, proof, proof_fee, transaction};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

pub use facts::{NewEventLog, NewFaultRecord, NewProof, NewProofFee, NewTransaction};
pub use versioned::{
    PutProofSet, PutProvider, PutRoot, ProofSetRow, ProviderRow, RootRow,
};

/// The subset of `Store`/`StoreTx` operations Handlers use, unified so a
/// `HandlerContext` can be built from either a pooled connection (normal
/// block processing) or an explicit transaction (reorg replay) without the
/// handlers themselves knowing which.
#[async_trait]
pub trait StoreOps: Send + Sync {
    async fn find_provider_latest(&self, address: &str) -> Result<Option<ProviderRow>, DbErr>;
    async fn put_provider(&self, row: PutProvider) -> Result<(), DbErr>;
    async fn find_proof_set_latest(&self, set_id: i64) -> Result<Option<ProofSetRow>, DbErr>;
    async fn put_proof_set(&self, row: PutProofSet) -> Result<(), DbErr>;
    async fn find_root_latest(&self, set_id: i64, root_id: i64) -> Result<Option<RootRow>, DbErr>;
    async fn put_root(&self, row: PutRoot) -> Result<(), DbErr>;
    async fn append_proof(&self, row: NewProof) -> Result<(), DbErr>;
    async fn append_fault_record(&self, row: NewFaultRecord) -> Result<(), DbErr>;
    async fn append_proof_fee(&self, row: NewProofFee) -> Result<(), DbErr>;
    async fn append_event_log(&self, row: NewEventLog) -> Result<(), DbErr>;
    async fn append_transaction(&self, row: NewTransaction) -> Result<(), DbErr>;
}

/// The block-bookkeeping operations the Tipset Processor needs on top of
/// `StoreOps`, again unified across a pooled connection and a transaction so
/// the same block-processing body runs for both normal processing and reorg
/// replay.
#[async_trait]
pub trait BlockStore: StoreOps {
    async fn save_block(
        &self,
        height: i64,
        hash: &str,
        parent_hash: &str,
        timestamp: i64,
    ) -> Result<(), DbErr>;
    async fn mark_block_processed(&self, height: i64) -> Result<(), DbErr>;
    async fn get_block_by_height(&self, height: i64) -> Result<Option<block::Model>, DbErr>;
}

/// Owns the database connection pool; the only component that persists
/// rows. Every method is also exposed on `&DatabaseTransaction` via the
/// `ConnectionTrait` generic bound so the Reorg Controller can run a whole
/// reconciliation (delete + replay) inside one transaction.
#[derive(Clone)]
pub struct Store {
    db: Arc<DatabaseConnection>,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db: Arc::new(db) }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn begin_tx(&self) -> Result<DatabaseTransaction, DbErr> {
        self.db.begin().await
    }

    /// Upserts a block row by height. On conflict, overwrites `hash` /
    /// `parent_hash` / `timestamp` but never touches `is_processed`.
    pub async fn save_block(
        &self,
        height: i64,
        hash: &str,
        parent_hash: &str,
        timestamp: i64,
    ) -> Result<(), DbErr> {
        save_block(&*self.db, height, hash, parent_hash, timestamp).await
    }

    pub async fn mark_block_processed(&self, height: i64) -> Result<(), DbErr> {
        mark_block_processed(&*self.db, height).await
    }

    pub async fn get_last_processed_block(&self) -> Result<i64, DbErr> {
        get_last_processed_block(&*self.db).await
    }

    pub async fn get_block_by_height(&self, height: i64) -> Result<Option<block::Model>, DbErr> {
        block::Entity::find_by_id(height).one(&*self.db).await
    }

    pub async fn delete_reorged(&self, start_height: i64, end_height: i64) -> Result<(), DbErr> {
        delete_reorged(&*self.db, start_height, end_height).await
    }

    pub async fn cleanup_finalized(&self, current_height: i64) -> Result<(), DbErr> {
        cleanup::cleanup_finalized(&*self.db, current_height).await
    }

    pub async fn put_provider(&self, row: PutProvider) -> Result<(), DbErr> {
        versioned::put_provider(&*self.db, row).await
    }

    pub async fn find_provider_latest(&self, address: &str) -> Result<Option<ProviderRow>, DbErr> {
        versioned::find_provider_latest(&*self.db, address).await
    }

    pub async fn find_provider_history(&self, address: &str) -> Result<Vec<ProviderRow>, DbErr> {
        versioned::find_provider_history(&*self.db, address).await
    }

    pub async fn put_proof_set(&self, row: PutProofSet) -> Result<(), DbErr> {
        versioned::put_proof_set(&*self.db, row).await
    }

    pub async fn find_proof_set_latest(&self, set_id: i64) -> Result<Option<ProofSetRow>, DbErr> {
        versioned::find_proof_set_latest(&*self.db, set_id).await
    }

    pub async fn find_proof_set_history(&self, set_id: i64) -> Result<Vec<ProofSetRow>, DbErr> {
        versioned::find_proof_set_history(&*self.db, set_id).await
    }

    pub async fn put_root(&self, row: PutRoot) -> Result<(), DbErr> {
        versioned::put_root(&*self.db, row).await
    }

    pub async fn find_root_latest(&self, set_id: i64, root_id: i64) -> Result<Option<RootRow>, DbErr> {
        versioned::find_root_latest(&*self.db, set_id, root_id).await
    }

    pub async fn find_root_history(&self, set_id: i64, root_id: i64) -> Result<Vec<RootRow>, DbErr> {
        versioned::find_root_history(&*self.db, set_id, root_id).await
    }

    pub async fn append_proof(&self, row: NewProof) -> Result<(), DbErr> {
        facts::append_proof(&*self.db, row).await
    }

    pub async fn append_fault_record(&self, row: NewFaultRecord) -> Result<(), DbErr> {
        facts::append_fault_record(&*self.db, row).await
    }

    pub async fn append_proof_fee(&self, row: NewProofFee) -> Result<(), DbErr> {
        facts::append_proof_fee(&*self.db, row).await
    }

    pub async fn append_event_log(&self, row: NewEventLog) -> Result<(), DbErr> {
        facts::append_event_log(&*self.db, row).await
    }

    pub async fn append_transaction(&self, row: NewTransaction) -> Result<(), DbErr> {
        facts::append_transaction(&*self.db, row).await
    }
}

/// Mirrors every `Store` method but runs against an explicit transaction,
/// so the Reorg Controller can bracket `delete_reorged` + replay in one
/// atomic unit and the Tipset Processor can run handler dispatch the same
/// way during normal (non-reorg) processing.
pub struct StoreTx<'a> {
    conn: &'a DatabaseTransaction,
}

impl<'a> StoreTx<'a> {
    pub fn new(conn: &'a DatabaseTransaction) -> Self {
        Self { conn }
    }

    pub async fn save_block(
        &self,
        height: i64,
        hash: &str,
        parent_hash: &str,
        timestamp: i64,
    ) -> Result<(), DbErr> {
        save_block(self.conn, height, hash, parent_hash, timestamp).await
    }

    pub async fn mark_block_processed(&self, height: i64) -> Result<(), DbErr> {
        mark_block_processed(self.conn, height).await
    }

    pub async fn get_block_by_height(&self, height: i64) -> Result<Option<block::Model>, DbErr> {
        block::Entity::find_by_id(height).one(self.conn).await
    }

    pub async fn delete_reorged(&self, start_height: i64, end_height: i64) -> Result<(), DbErr> {
        delete_reorged(self.conn, start_height, end_height).await
    }

    pub async fn put_provider(&self, row: PutProvider) -> Result<(), DbErr> {
        versioned::put_provider(self.conn, row).await
    }

    pub async fn find_provider_latest(&self, address: &str) -> Result<Option<ProviderRow>, DbErr> {
        versioned::find_provider_latest(self.conn, address).await
    }

    pub async fn put_proof_set(&self, row: PutProofSet) -> Result<(), DbErr> {
        versioned::put_proof_set(self.conn, row).await
    }

    pub async fn find_proof_set_latest(&self, set_id: i64) -> Result<Option<ProofSetRow>, DbErr> {
        versioned::find_proof_set_latest(self.conn, set_id).await
    }

    pub async fn put_root(&self, row: PutRoot) -> Result<(), DbErr> {
        versioned::put_root(self.conn, row).await
    }

    pub async fn find_root_latest(&self, set_id: i64, root_id: i64) -> Result<Option<RootRow>, DbErr> {
        versioned::find_root_latest(self.conn, set_id, root_id).await
    }

    pub async fn append_proof(&self, row: NewProof) -> Result<(), DbErr> {
        facts::append_proof(self.conn, row).await
    }

    pub async fn append_fault_record(&self, row: NewFaultRecord) -> Result<(), DbErr> {
        facts::append_fault_record(self.conn, row).await
    }

    pub async fn append_proof_fee(&self, row: NewProofFee) -> Result<(), DbErr> {
        facts::append_proof_fee(self.conn, row).await
    }

    pub async fn append_event_log(&self, row: NewEventLog) -> Result<(), DbErr> {
        facts::append_event_log(self.conn, row).await
    }

    pub async fn append_transaction(&self, row: NewTransaction) -> Result<(), DbErr> {
        facts::append_transaction(self.conn, row).await
    }
}

pub(crate) async fn save_block<C: ConnectionTrait>(
    conn: &C,
    height: i64,
    hash: &str,
    parent_hash: &str,
    timestamp: i64,
) -> Result<(), DbErr> {
    use sea_orm::sea_query::OnConflict;

    let model = block::ActiveModel {
        height: Set(height),
        hash: Set(hash.to_owned()),
        parent_hash: Set(parent_hash.to_owned()),
        timestamp: Set(timestamp),
        is_processed: Set(false),
    };

    block::Entity::insert(model)
        .on_conflict(
            OnConflict::column(block::Column::Height)
                .update_columns([
                    block::Column::Hash,
                    block::Column::ParentHash,
                    block::Column::Timestamp,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await?;
    Ok(())
}

pub(crate) async fn mark_block_processed<C: ConnectionTrait>(
    conn: &C,
    height: i64,
) -> Result<(), DbErr> {
    if let Some(existing) = block::Entity::find_by_id(height).one(conn).await? {
        let mut active: block::ActiveModel = existing.into();
        active.is_processed = Set(true);
        block::Entity::update(active).exec(conn).await?;
    }
    Ok(())
}

pub(crate) async fn get_last_processed_block<C: ConnectionTrait>(conn: &C) -> Result<i64, DbErr> {
    let latest = block::Entity::find()
        .filter(block::Column::IsProcessed.eq(true))
        .order_by_desc(block::Column::Height)
        .one(conn)
        .await?;
    Ok(latest.map(|b| b.height).unwrap_or(0))
}

/// Deletes every versioned and fact row with `block_number` in
/// `[start_height, end_height]`, across all tables. Used both by reorg
/// reconciliation and, transitively, by idempotent replay.
pub(crate) async fn delete_reorged<C: ConnectionTrait>(
    conn: &C,
    start_height: i64,
    end_height: i64,
) -> Result<(), DbErr> {
    use pdp_indexer_entity::{proof_set, provider, root};

    block::Entity::delete_many()
        .filter(block::Column::Height.between(start_height, end_height))
        .exec(conn)
        .await?;
    provider::Entity::delete_many()
        .filter(provider::Column::BlockNumber.between(start_height, end_height))
        .exec(conn)
        .await?;
    proof_set::Entity::delete_many()
        .filter(proof_set::Column::BlockNumber.between(start_height, end_height))
        .exec(conn)
        .await?;
    root::Entity::delete_many()
        .filter(root::Column::BlockNumber.between(start_height, end_height))
        .exec(conn)
        .await?;
    proof::Entity::delete_many()
        .filter(proof::Column::BlockNumber.between(start_height, end_height))
        .exec(conn)
        .await?;
    fault_record::Entity::delete_many()
        .filter(fault_record::Column::BlockNumber.between(start_height, end_height))
        .exec(conn)
        .await?;
    proof_fee::Entity::delete_many()
        .filter(proof_fee::Column::BlockNumber.between(start_height, end_height))
        .exec(conn)
        .await?;
    transaction::Entity::delete_many()
        .filter(transaction::Column::BlockNumber.between(start_height, end_height))
        .exec(conn)
        .await?;
    event_log::Entity::delete_many()
        .filter(event_log::Column::BlockNumber.between(start_height, end_height))
        .exec(conn)
        .await?;
    Ok(())
}

#[async_trait]
impl StoreOps for Store {
    async fn find_provider_latest(&self, address: &str) -> Result<Option<ProviderRow>, DbErr> {
        Store::find_provider_latest(self, address).await
    }
    async fn put_provider(&self, row: PutProvider) -> Result<(), DbErr> {
        Store::put_provider(self, row).await
    }
    async fn find_proof_set_latest(&self, set_id: i64) -> Result<Option<ProofSetRow>, DbErr> {
        Store::find_proof_set_latest(self, set_id).await
    }
    async fn put_proof_set(&self, row: PutProofSet) -> Result<(), DbErr> {
        Store::put_proof_set(self, row).await
    }
    async fn find_root_latest(&self, set_id: i64, root_id: i64) -> Result<Option<RootRow>, DbErr> {
        Store::find_root_latest(self, set_id, root_id).await
    }
    async fn put_root(&self, row: PutRoot) -> Result<(), DbErr> {
        Store::put_root(self, row).await
    }
    async fn append_proof(&self, row: NewProof) -> Result<(), DbErr> {
        Store::append_proof(self, row).await
    }
    async fn append_fault_record(&self, row: NewFaultRecord) -> Result<(), DbErr> {
        Store::append_fault_record(self, row).await
    }
    async fn append_proof_fee(&self, row: NewProofFee) -> Result<(), DbErr> {
        Store::append_proof_fee(self, row).await
    }
    async fn append_event_log(&self, row: NewEventLog) -> Result<(), DbErr> {
        Store::append_event_log(self, row).await
    }
    async fn append_transaction(&self, row: NewTransaction) -> Result<(), DbErr> {
        Store::append_transaction(self, row).await
    }
}

#[async_trait]
impl<'a> StoreOps for StoreTx<'a> {
    async fn find_provider_latest(&self, address: &str) -> Result<Option<ProviderRow>, DbErr> {
        StoreTx::find_provider_latest(self, address).await
    }
    async fn put_provider(&self, row: PutProvider) -> Result<(), DbErr> {
        StoreTx::put_provider(self, row).await
    }
    async fn find_proof_set_latest(&self, set_id: i64) -> Result<Option<ProofSetRow>, DbErr> {
        StoreTx::find_proof_set_latest(self, set_id).await
    }
    async fn put_proof_set(&self, row: PutProofSet) -> Result<(), DbErr> {
        StoreTx::put_proof_set(self, row).await
    }
    async fn find_root_latest(&self, set_id: i64, root_id: i64) -> Result<Option<RootRow>, DbErr> {
        StoreTx::find_root_latest(self, set_id, root_id).await
    }
    async fn put_root(&self, row: PutRoot) -> Result<(), DbErr> {
        StoreTx::put_root(self, row).await
    }
    async fn append_proof(&self, row: NewProof) -> Result<(), DbErr> {
        StoreTx::append_proof(self, row).await
    }
    async fn append_fault_record(&self, row: NewFaultRecord) -> Result<(), DbErr> {
        StoreTx::append_fault_record(self, row).await
    }
    async fn append_proof_fee(&self, row: NewProofFee) -> Result<(), DbErr> {
        StoreTx::append_proof_fee(self, row).await
    }
    async fn append_event_log(&self, row: NewEventLog) -> Result<(), DbErr> {
        StoreTx::append_event_log(self, row).await
    }
    async fn append_transaction(&self, row: NewTransaction) -> Result<(), DbErr> {
        StoreTx::append_transaction(self, row).await
    }
}

#[async_trait]
impl BlockStore for Store {
    async fn save_block(
        &self,
        height: i64,
        hash: &str,
        parent_hash: &str,
        timestamp: i64,
    ) -> Result<(), DbErr> {
        Store::save_block(self, height, hash, parent_hash, timestamp).await
    }
    async fn mark_block_processed(&self, height: i64) -> Result<(), DbErr> {
        Store::mark_block_processed(self, height).await
    }
    async fn get_block_by_height(&self, height: i64) -> Result<Option<block::Model>, DbErr> {
        Store::get_block_by_height(self, height).await
    }
}

#[async_trait]
impl<'a> BlockStore for StoreTx<'a> {
    async fn save_block(
        &self,
        height: i64,
        hash: &str,
        parent_hash: &str,
        timestamp: i64,
    ) -> Result<(), DbErr> {
        StoreTx::save_block(self, height, hash, parent_hash, timestamp).await
    }
    async fn mark_block_processed(&self, height: i64) -> Result<(), DbErr> {
        StoreTx::mark_block_processed(self, height).await
    }
    async fn get_block_by_height(&self, height: i64) -> Result<Option<block::Model>, DbErr> {
        StoreTx::get_block_by_height(self, height).await
    }
}
