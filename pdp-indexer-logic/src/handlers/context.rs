use crate::chain_source::ChainSource;
use crate::store::StoreOps;

/// Cross-cutting fields every handler needs, bundled the way the teacher
/// bundles per-log context so adding a field doesn't ripple through every
/// handler signature. Built fresh per dispatched transaction/log; `store` is
/// `&Store` during normal processing and `&StoreTx` during reorg replay.
pub struct HandlerContext<'a> {
    pub store: &'a dyn StoreOps,
    pub rpc: &'a dyn ChainSource,
    pub contract_address: String,
    pub tx_hash: String,
    /// `0x`-prefixed calldata of the enclosing transaction. Event handlers
    /// that need parameters missing from the log itself (`RootsAdded`,
    /// `PossessionProven`, `FaultRecord`) decode it directly.
    pub tx_input: String,
    pub block_number: i64,
    pub block_hash: String,
}
