use sea_orm::{ConnectionTrait, DbBackend, DbErr, Statement};

use pdp_indexer_entity::manual::FINALIZATION_DEPTH;

/// Versioned tables, identified by their table name and identity columns
/// (everything but `block_number`/`block_hash`). `cleanup_finalized` never
/// deletes a row that is the newest version for its identity, even when
/// that row is itself finalized — implemented as a two-step CTE: compute
/// `latest_versions` (over *all* rows, not just finalized ones) via
/// `DISTINCT ON (identity) ORDER BY block_number DESC`, then delete finalized
/// rows absent from that set.
const VERSIONED_TABLES: &[(&str, &[&str])] = &[
    ("providers", &["address"]),
    ("proof_sets", &["set_id"]),
    ("roots", &["set_id", "root_id"]),
];

pub async fn cleanup_finalized<C: ConnectionTrait>(
    conn: &C,
    current_height: i64,
) -> Result<(), DbErr> {
    let finalized_before = current_height - FINALIZATION_DEPTH;
    if finalized_before < 0 {
        return Ok(());
    }

    for (table, identity_cols) in VERSIONED_TABLES {
        let identity = identity_cols.join(", ");
        let sql = format!(
            r#"
            WITH latest_versions AS (
                SELECT DISTINCT ON ({identity}) id
                FROM "{table}"
                ORDER BY {identity}, block_number DESC
            )
            DELETE FROM "{table}"
            WHERE block_number <= $1
              AND id NOT IN (SELECT id FROM latest_versions)
            "#
        );

        conn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [finalized_before.into()],
        ))
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalized_before_is_never_negative_height() {
        // current_height below FINALIZATION_DEPTH means nothing is
        // finalized yet; cleanup must be a no-op, not delete everything.
        assert!(0 - FINALIZATION_DEPTH < 0);
    }
}
