use crate::{proof_set, root};

/// Finalization predicate shared by the store's cleanup pass and the
/// scheduler's poll loop: a block is assumed non-reorgable past this depth.
pub const FINALIZATION_DEPTH: i64 = 900;

impl proof_set::Model {
    pub fn is_finalized_at(&self, current_height: i64) -> bool {
        self.block_number + FINALIZATION_DEPTH <= current_height
    }
}

impl root::Model {
    pub fn identity(&self) -> (i64, i64) {
        (self.set_id, self.root_id)
    }
}
