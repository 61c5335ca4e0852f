//! The action matcher.
//!
//! Matching is two separate obligations: at most one action per script
//! identity within a message, and every action must address a script that is
//! actually present in the transaction. The presence check is deliberately
//! transaction-wide rather than fragment-wide, so a fragment cannot smuggle
//! in an action for a script nothing in the transaction carries.

use std::collections::HashSet;

use ckb_cobuild_traits::{AccessError, Source, TransactionProvider};
use ckb_cobuild_types::{
    cobuild::{Action, Message},
    Byte32,
};

use crate::error::ScriptError;

/// Finds the action addressed to `script_hash`, if any.
///
/// More than one action for the same identity is [`ScriptError::DuplicateAction`].
pub fn find_action<'a>(
    message: &'a Message,
    script_hash: &Byte32,
) -> Result<Option<&'a Action>, ScriptError> {
    let mut found = None;
    for action in &message.actions {
        if &action.script_hash == script_hash {
            if found.is_some() {
                return Err(ScriptError::DuplicateAction(*script_hash));
            }
            found = Some(action);
        }
    }
    Ok(found)
}

// Script identities an action may legally address: type scripts of any
// input or output cell, and lock scripts of input cells.
fn addressable_script_hashes<P: TransactionProvider>(
    provider: &P,
) -> Result<HashSet<Byte32>, ScriptError> {
    let mut hashes = HashSet::new();
    for source in [Source::Input, Source::Output] {
        let mut index = 0;
        loop {
            match provider.cell(index, source) {
                Ok(cell) => {
                    if source == Source::Input {
                        hashes.insert(cell.calc_lock_hash());
                    }
                    if let Some(type_hash) = cell.type_hash() {
                        hashes.insert(type_hash);
                    }
                    index += 1;
                }
                Err(AccessError::OutOfBound) => break,
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(hashes)
}

/// Checks that every action in `message` addresses a script present in the
/// transaction, and that no script is addressed twice.
pub fn check_actions<P: TransactionProvider>(
    message: &Message,
    provider: &P,
) -> Result<(), ScriptError> {
    if message.actions.is_empty() {
        return Ok(());
    }
    let addressable = addressable_script_hashes(provider)?;
    let mut seen = HashSet::new();
    for action in &message.actions {
        if !seen.insert(action.script_hash) {
            return Err(ScriptError::DuplicateAction(action.script_hash));
        }
        if !addressable.contains(&action.script_hash) {
            return Err(ScriptError::ActionScopeMismatch(action.script_hash));
        }
    }
    Ok(())
}
