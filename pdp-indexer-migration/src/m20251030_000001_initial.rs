use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            CREATE TABLE "blocks"
            (
                "height"       bigint PRIMARY KEY,
                "hash"         varchar NOT NULL,
                "parent_hash"  varchar NOT NULL,
                "timestamp"    bigint  NOT NULL,
                "is_processed" boolean NOT NULL DEFAULT false
            );

            CREATE TABLE "providers"
            (
                "id"                    bigserial PRIMARY KEY,
                "address"               varchar   NOT NULL,
                "total_faulted_periods" bigint    NOT NULL DEFAULT 0,
                "total_data_size"       bigint    NOT NULL DEFAULT 0,
                "proof_set_ids"         bigint[]  NOT NULL DEFAULT '{}',
                "block_number"          bigint    NOT NULL,
                "block_hash"            varchar   NOT NULL,
                "updated_at"            timestamptz NOT NULL DEFAULT (now()),
                UNIQUE ("address", "block_number")
            );
            CREATE INDEX "providers_address_idx" ON "providers" ("address", "block_number" DESC);

            CREATE TABLE "proof_sets"
            (
                "id"                    bigserial PRIMARY KEY,
                "set_id"                bigint  NOT NULL,
                "owner"                 varchar NOT NULL,
                "listener_addr"         varchar NOT NULL,
                "is_active"             boolean NOT NULL DEFAULT true,
                "challenge_range"       bigint  NOT NULL DEFAULT 0,
                "next_challenge_epoch"  bigint  NOT NULL DEFAULT 0,
                "last_proven_epoch"     bigint  NOT NULL DEFAULT 0,
                "total_roots"           bigint  NOT NULL DEFAULT 0,
                "total_proved_roots"    bigint  NOT NULL DEFAULT 0,
                "total_data_size"       bigint  NOT NULL DEFAULT 0,
                "total_fee_paid"        bigint  NOT NULL DEFAULT 0,
                "total_faulted_periods" bigint  NOT NULL DEFAULT 0,
                "block_number"          bigint  NOT NULL,
                "block_hash"            varchar NOT NULL,
                UNIQUE ("set_id", "block_number")
            );
            CREATE INDEX "proof_sets_set_id_idx" ON "proof_sets" ("set_id", "block_number" DESC);

            CREATE TABLE "roots"
            (
                "id"                      bigserial PRIMARY KEY,
                "set_id"                  bigint  NOT NULL,
                "root_id"                 bigint  NOT NULL,
                "raw_size"                bigint  NOT NULL DEFAULT 0,
                "cid"                     varchar NOT NULL,
                "removed"                 boolean NOT NULL DEFAULT false,
                "total_proofs_submitted"  bigint  NOT NULL DEFAULT 0,
                "total_periods_faulted"   bigint  NOT NULL DEFAULT 0,
                "last_proven_epoch"       bigint  NOT NULL DEFAULT 0,
                "last_faulted_epoch"      bigint  NOT NULL DEFAULT 0,
                "block_number"            bigint  NOT NULL,
                "block_hash"              varchar NOT NULL,
                UNIQUE ("set_id", "root_id", "block_number")
            );
            CREATE INDEX "roots_set_id_root_id_idx" ON "roots" ("set_id", "root_id", "block_number" DESC);

            CREATE TABLE "proofs"
            (
                "id"           bigserial PRIMARY KEY,
                "set_id"       bigint  NOT NULL,
                "root_id"      bigint  NOT NULL,
                "proof_offset" bigint  NOT NULL,
                "leaf_hash"    bytea   NOT NULL,
                "merkle_proof" bytea   NOT NULL,
                "proven_at"    bigint  NOT NULL,
                "block_number" bigint  NOT NULL,
                "block_hash"   varchar NOT NULL,
                UNIQUE ("set_id", "root_id", "proof_offset", "block_number")
            );

            CREATE TABLE "fault_records"
            (
                "id"                     bigserial PRIMARY KEY,
                "set_id"                 bigint   NOT NULL,
                "root_ids"               bigint[] NOT NULL DEFAULT '{}',
                "current_challenge_epoch" bigint  NOT NULL,
                "next_challenge_epoch"   bigint   NOT NULL,
                "periods_faulted"        bigint   NOT NULL,
                "deadline"               bigint   NOT NULL,
                "block_number"           bigint   NOT NULL,
                "block_hash"             varchar  NOT NULL
            );
            CREATE INDEX "fault_records_set_id_idx" ON "fault_records" ("set_id");

            CREATE TABLE "proof_fees"
            (
                "fee_id"                 varchar PRIMARY KEY,
                "set_id"                 bigint  NOT NULL,
                "proof_fee"              bigint  NOT NULL,
                "fil_usd_price"          bigint  NOT NULL,
                "fil_usd_price_exponent" integer NOT NULL,
                "block_number"           bigint  NOT NULL,
                "block_hash"             varchar NOT NULL
            );
            CREATE INDEX "proof_fees_set_id_idx" ON "proof_fees" ("set_id");

            CREATE TABLE "transactions"
            (
                "hash"          varchar PRIMARY KEY,
                "proof_set_id"  bigint  NOT NULL,
                "method"        varchar NOT NULL,
                "from"          varchar NOT NULL,
                "to"            varchar NOT NULL,
                "value"         varchar NOT NULL,
                "status"        smallint NOT NULL,
                "height"        bigint  NOT NULL,
                "message_cid"   varchar NOT NULL,
                "block_number"  bigint  NOT NULL,
                "block_hash"    varchar NOT NULL
            );
            CREATE INDEX "transactions_proof_set_id_idx" ON "transactions" ("proof_set_id");

            CREATE TABLE "event_logs"
            (
                "tx_hash"      varchar NOT NULL,
                "log_index"    bigint  NOT NULL,
                "address"      varchar NOT NULL,
                "topic0"       varchar NOT NULL,
                "data"         bytea   NOT NULL,
                "block_number" bigint  NOT NULL,
                "block_hash"   varchar NOT NULL,
                "removed"      boolean NOT NULL DEFAULT false,
                PRIMARY KEY ("tx_hash", "log_index")
            );
            CREATE INDEX "event_logs_block_number_idx" ON "event_logs" ("block_number");
        "#;
        crate::from_sql(manager, sql).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            DROP TABLE "event_logs";
            DROP TABLE "transactions";
            DROP TABLE "proof_fees";
            DROP TABLE "fault_records";
            DROP TABLE "proofs";
            DROP TABLE "roots";
            DROP TABLE "proof_sets";
            DROP TABLE "providers";
            DROP TABLE "blocks";
        "#;
        crate::from_sql(manager, sql).await
    }
}
