//! Idempotent synchronization primitives
//!
//! Each primitive compares the desired state with what is on disk and emits
//! only the actions needed to close the gap, so re-running a phase is safe.
//! All mutations go through the [`Executor`](crate::exec::Executor); progress
//! and recoverable problems go to the [`Reporter`](crate::ui::Reporter).

mod block;
mod deploy;
mod mirror;
mod rewrite;

pub use block::{read_block, upsert_text_block};
pub use deploy::{deploy_file, deploy_tree};
pub use mirror::{SyncOutcome, SyncTarget, sync_mirror};
pub use rewrite::{LineRule, set_lines};

#[cfg(test)]
pub use block::with_block;
