//! Atomic batch application
//!
//! ## Atomicity Contract
//!
//! `apply()` guarantees:
//! - **All-or-nothing**: either every command takes effect, or the store is
//!   restored to its pre-batch state
//! - **One batch**: all records of a successful batch are dispatched once,
//!   in command order; a failed batch dispatches nothing
//! - **Validated**: with `validate_after_apply` on, the model invariants are
//!   checked before anything is dispatched

use std::time::Instant;

use gmlx_core_types::BatchId;

use crate::commands::Command;
use crate::errors::Result;
use crate::notify::NotificationChain;
use crate::ops::{feature_map_ops, lifecycle_ops, list_ops, object_ops, Store};
use crate::rules::validation;
use crate::{log_op_end, log_op_error, log_op_start};

/// Apply a batch of commands atomically
///
/// Returns the dispatched batch ID, or `None` if the batch produced no
/// records (or delivery is disabled).
///
/// # Errors
///
/// Returns the first command error, or the first invariant violation when
/// validation is enabled. The store is left exactly as it was before the
/// call.
pub fn apply(store: &mut Store, commands: Vec<Command>) -> Result<Option<BatchId>> {
    let start = Instant::now();
    let command_count = commands.len();
    log_op_start!("apply", command_count = command_count);

    let snapshot = store.snapshot();
    let mut chain = NotificationChain::new();

    let outcome = commands
        .into_iter()
        .try_for_each(|cmd| execute(store, cmd, &mut chain))
        .and_then(|()| {
            if store.config().validate_after_apply {
                validation::validate_model(store)
            } else {
                Ok(())
            }
        });

    match outcome {
        Ok(()) => {
            let batch_len = chain.len();
            let batch_id = chain.dispatch(store);
            log_op_end!(
                "apply",
                duration_ms = start.elapsed().as_millis() as u64,
                command_count = command_count,
                batch_len = batch_len
            );
            Ok(batch_id)
        }
        Err(e) => {
            store.restore(snapshot);
            log_op_error!(
                "apply",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(e)
        }
    }
}

/// Apply a single command atomically
///
/// # Errors
///
/// See [`apply`].
pub fn apply_one(store: &mut Store, cmd: Command) -> Result<Option<BatchId>> {
    apply(store, vec![cmd])
}

fn execute(store: &mut Store, cmd: Command, chain: &mut NotificationChain) -> Result<()> {
    match cmd {
        Command::Set {
            object,
            feature,
            value,
        } => object_ops::set_with_chain(store, object, feature, value, chain),

        Command::Unset { object, feature } => {
            object_ops::unset_with_chain(store, object, feature, chain)
        }

        Command::Add {
            object,
            feature,
            value,
        } => list_ops::add_with_chain(store, object, feature, value, chain).map(|_| ()),

        Command::Insert {
            object,
            feature,
            index,
            value,
        } => list_ops::insert_with_chain(store, object, feature, index, value, chain).map(|_| ()),

        Command::Remove {
            object,
            feature,
            value,
        } => list_ops::remove_with_chain(store, object, feature, &value, chain).map(|_| ()),

        Command::Move {
            object,
            feature,
            from,
            to,
        } => list_ops::move_item_with_chain(store, object, feature, from, to, chain),

        Command::Clear { object, feature } => {
            if store.feature_of(object, feature)?.is_feature_map() {
                feature_map_ops::clear_with_chain(store, object, feature, chain)
            } else {
                list_ops::clear_with_chain(store, object, feature, chain)
            }
        }

        Command::MapAdd {
            object,
            member,
            value,
        } => feature_map_ops::add_with_chain(store, object, member, value, chain).map(|_| ()),

        Command::Delete { object } => {
            lifecycle_ops::delete_with_chain(store, object, chain).map(|_| ())
        }
    }
}
