//! Transaction mutations.

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};
use treasury_shared::types::{Branch, LocalRef, TransactionId};

use super::{
    MutationCoordinator, TopUpReceipt, WriteTicket, not_found, require_funds, require_positive,
    require_visible,
};
use crate::ledger::{
    BalanceCalculator, Direction, LedgerError, NewTransaction, SessionContext, SyncState, Tier,
    Transaction,
};

impl MutationCoordinator {
    /// Records a new transaction.
    ///
    /// The branch defaults to the caller's, the date to the caller's business
    /// date and an empty description to the category. A petty-cash expense
    /// must be covered by the branch's petty cash.
    ///
    /// # Errors
    ///
    /// Returns `Validation` or `InsufficientFunds` without touching the
    /// snapshot. The ticket settles with `RemoteWriteFailure` if the store
    /// refuses the create, after the optimistic entry was removed.
    pub fn record_transaction(
        &self,
        ctx: &SessionContext,
        input: NewTransaction,
    ) -> Result<WriteTicket<TransactionId>, LedgerError> {
        let transaction = self.prepare(ctx, input)?;
        let local_ref = LocalRef::generate();

        self.snapshot.try_modify(|state| {
            if transaction.is_petty_cash_expense() {
                let available =
                    BalanceCalculator::branch_petty_cash(&state.active(), transaction.branch);
                require_funds(Tier::BranchPettyCash, available, transaction.amount)?;
            }
            state.push_pending(local_ref, transaction.clone());
            Ok(())
        })?;

        info!(
            local_ref = %local_ref,
            branch = %transaction.branch,
            tier = %transaction.tier,
            amount = %transaction.amount,
            "Transaction applied, write issued"
        );

        let snapshot = self.snapshot.clone();
        let store = self.transactions.clone();
        Ok(self.spawn(vec![local_ref], async move {
            match store.create(&transaction).await {
                Ok(id) => {
                    snapshot.promote(local_ref, id);
                    debug!(local_ref = %local_ref, transaction_id = %id, "Transaction committed");
                    Ok(id)
                }
                Err(e) => {
                    snapshot.remove(local_ref);
                    warn!(local_ref = %local_ref, error = %e, "Create failed, entry rolled back");
                    Err(LedgerError::remote("record_transaction", e))
                }
            }
        }))
    }

    /// Moves `amount` from the main treasury into an outlet's petty cash.
    ///
    /// Both legs are applied together and written one after the other. If the
    /// petty-cash leg fails after the treasury leg committed, the treasury leg
    /// is erased again. If that erase fails too, the petty-cash leg stays in
    /// the snapshot as `Failed` and can be retried with
    /// [`retry_failed`](Self::retry_failed).
    ///
    /// # Errors
    ///
    /// Returns `Validation` or `InsufficientFunds` without touching the
    /// snapshot. The ticket settles with `RemoteWriteFailure` when both legs
    /// were rolled back, or `PartialTransferFailure` when the ledger is split.
    pub fn perform_top_up(
        &self,
        ctx: &SessionContext,
        branch: Branch,
        amount: Decimal,
    ) -> Result<WriteTicket<TopUpReceipt>, LedgerError> {
        require_positive(amount, "Top-up amount")?;
        if branch.is_central() {
            return Err(LedgerError::Validation(
                "Top-up target must be an outlet".to_string(),
            ));
        }
        require_visible(ctx, branch)?;

        let category = self.settings.transfer_category.clone();
        let description = format!("Top up {}", branch.display_name());
        let leg = |direction, tier, branch| Transaction {
            id: None,
            branch,
            direction,
            tier,
            category: category.clone(),
            amount,
            description: description.clone(),
            date: ctx.today,
            deleted: false,
        };
        let treasury = leg(Direction::Expense, Tier::MainTreasury, Branch::Pusat);
        let petty = leg(Direction::Income, Tier::BranchPettyCash, branch);
        let treasury_ref = LocalRef::generate();
        let petty_ref = LocalRef::generate();

        self.snapshot.try_modify(|state| {
            let available = BalanceCalculator::main_treasury_balance(&state.active());
            require_funds(Tier::MainTreasury, available, amount)?;
            state.push_pending(treasury_ref, treasury.clone());
            state.push_pending(petty_ref, petty.clone());
            Ok(())
        })?;

        info!(branch = %branch, amount = %amount, "Top-up applied, writing legs");

        let snapshot = self.snapshot.clone();
        let store = self.transactions.clone();
        Ok(self.spawn(vec![treasury_ref, petty_ref], async move {
            let treasury_id = match store.create(&treasury).await {
                Ok(id) => {
                    snapshot.promote(treasury_ref, id);
                    id
                }
                Err(e) => {
                    snapshot.remove_all(&[treasury_ref, petty_ref]);
                    warn!(branch = %branch, error = %e, "Treasury leg failed, top-up rolled back");
                    return Err(LedgerError::remote("perform_top_up", e));
                }
            };

            let reason = match store.create(&petty).await {
                Ok(petty_id) => {
                    snapshot.promote(petty_ref, petty_id);
                    info!(
                        branch = %branch,
                        treasury_leg = %treasury_id,
                        petty_cash_leg = %petty_id,
                        "Top-up committed"
                    );
                    return Ok(TopUpReceipt {
                        treasury_leg: treasury_id,
                        petty_cash_leg: petty_id,
                    });
                }
                Err(e) => e,
            };

            warn!(
                branch = %branch,
                treasury_leg = %treasury_id,
                error = %reason,
                "Petty-cash leg failed, erasing treasury leg"
            );
            match store.permanent_delete(treasury_id).await {
                Ok(()) => {
                    snapshot.remove_all(&[treasury_ref, petty_ref]);
                    Err(LedgerError::remote("perform_top_up", reason))
                }
                Err(compensation) => {
                    error!(
                        branch = %branch,
                        treasury_leg = %treasury_id,
                        error = %compensation,
                        "Compensation failed, top-up left split"
                    );
                    snapshot.mark_failed(petty_ref, reason.to_string());
                    Err(LedgerError::PartialTransferFailure {
                        committed: treasury_id,
                        failed_leg: petty_ref,
                        reason,
                    })
                }
            }
        }))
    }

    /// Replaces a committed, active transaction.
    ///
    /// With `validate_edits` on, a petty-cash expense must still be covered by
    /// the branch's petty cash without the entry being replaced.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound`, `InvalidState` or `InsufficientFunds`
    /// without touching the snapshot. The ticket settles with
    /// `RemoteWriteFailure` after restoring the previous fields.
    pub fn update_transaction(
        &self,
        ctx: &SessionContext,
        transaction: Transaction,
    ) -> Result<WriteTicket<()>, LedgerError> {
        let id = transaction.id.ok_or_else(|| {
            LedgerError::Validation("Only committed transactions can be edited".to_string())
        })?;
        require_positive(transaction.amount, "Amount")?;
        require_category(&transaction.category)?;
        require_tier_branch(transaction.tier, transaction.branch)?;
        require_visible(ctx, transaction.branch)?;

        let replacement = Transaction {
            deleted: false,
            ..transaction
        };
        let validate = self.settings.validate_edits;

        let (local_ref, previous) = self.snapshot.try_modify(|state| {
            let entry = state.by_id(id).ok_or_else(|| not_found(id))?;
            if entry.transaction.deleted {
                return Err(LedgerError::InvalidState(format!(
                    "Transaction {id} is in the trash"
                )));
            }
            require_visible(ctx, entry.transaction.branch)?;
            let local_ref = entry.local_ref;

            if validate && replacement.is_petty_cash_expense() {
                let others = state.active_except(local_ref);
                let available = BalanceCalculator::branch_petty_cash(&others, replacement.branch);
                require_funds(Tier::BranchPettyCash, available, replacement.amount)?;
            }

            let slot = state.entry_mut(local_ref).ok_or_else(|| not_found(id))?;
            let previous = std::mem::replace(&mut slot.transaction, replacement.clone());
            Ok((local_ref, previous))
        })?;

        info!(transaction_id = %id, amount = %replacement.amount, "Edit applied, write issued");

        let snapshot = self.snapshot.clone();
        let store = self.transactions.clone();
        Ok(self.spawn(vec![local_ref], async move {
            match store.update(id, &replacement).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    snapshot.replace(local_ref, previous);
                    warn!(transaction_id = %id, error = %e, "Update failed, edit rolled back");
                    Err(LedgerError::remote("update_transaction", e))
                }
            }
        }))
    }

    /// Moves an active transaction to the trash.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidState` without touching the snapshot. The
    /// ticket settles with `RemoteWriteFailure` after moving it back.
    pub fn soft_delete(
        &self,
        ctx: &SessionContext,
        id: TransactionId,
    ) -> Result<WriteTicket<()>, LedgerError> {
        let local_ref = self.flip_deleted(ctx, id, true)?;
        info!(transaction_id = %id, "Moved to trash, write issued");

        let snapshot = self.snapshot.clone();
        let store = self.transactions.clone();
        Ok(self.spawn(vec![local_ref], async move {
            store.soft_delete(id).await.map_err(|e| {
                snapshot.set_deleted(local_ref, false);
                warn!(transaction_id = %id, error = %e, "Soft delete failed, entry restored");
                LedgerError::remote("soft_delete", e)
            })
        }))
    }

    /// Brings a trashed transaction back with its fields unchanged.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidState` without touching the snapshot. The
    /// ticket settles with `RemoteWriteFailure` after moving it back to the
    /// trash.
    pub fn restore(
        &self,
        ctx: &SessionContext,
        id: TransactionId,
    ) -> Result<WriteTicket<()>, LedgerError> {
        let local_ref = self.flip_deleted(ctx, id, false)?;
        info!(transaction_id = %id, "Restored from trash, write issued");

        let snapshot = self.snapshot.clone();
        let store = self.transactions.clone();
        Ok(self.spawn(vec![local_ref], async move {
            store.restore(id).await.map_err(|e| {
                snapshot.set_deleted(local_ref, true);
                warn!(transaction_id = %id, error = %e, "Restore failed, entry back in trash");
                LedgerError::remote("restore", e)
            })
        }))
    }

    /// Erases a trashed transaction. Irreversible once the write commits.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, or `InvalidState` if the entry is not in the trash.
    /// The ticket settles with `RemoteWriteFailure` after putting the entry
    /// back where it was.
    pub fn permanent_delete(
        &self,
        ctx: &SessionContext,
        id: TransactionId,
    ) -> Result<WriteTicket<()>, LedgerError> {
        let (index, entry) = self.snapshot.try_modify(|state| {
            let entry = state.by_id(id).ok_or_else(|| not_found(id))?;
            if !entry.transaction.deleted {
                return Err(LedgerError::InvalidState(format!(
                    "Transaction {id} must be in the trash before it can be erased"
                )));
            }
            require_visible(ctx, entry.transaction.branch)?;
            let index = state.position(entry.local_ref).ok_or_else(|| not_found(id))?;
            Ok((index, state.remove_at(index)))
        })?;
        let local_ref = entry.local_ref;
        info!(transaction_id = %id, "Erased locally, write issued");

        let snapshot = self.snapshot.clone();
        let store = self.transactions.clone();
        Ok(self.spawn(vec![local_ref], async move {
            store.permanent_delete(id).await.map_err(|e| {
                snapshot.reinsert(index, entry);
                warn!(transaction_id = %id, error = %e, "Permanent delete failed, entry restored");
                LedgerError::remote("permanent_delete", e)
            })
        }))
    }

    /// Re-issues the create of an entry left `Failed`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidState` without touching the snapshot. The
    /// ticket settles with `RemoteWriteFailure` and the entry goes back to
    /// `Failed`.
    pub fn retry_failed(
        &self,
        ctx: &SessionContext,
        local_ref: LocalRef,
    ) -> Result<WriteTicket<TransactionId>, LedgerError> {
        let transaction = self.snapshot.try_modify(|state| {
            let entry = state
                .entry_mut(local_ref)
                .ok_or_else(|| LedgerError::NotFound(local_ref.to_string()))?;
            if !matches!(entry.sync, SyncState::Failed(_)) {
                return Err(LedgerError::InvalidState(format!(
                    "Entry {} has no failed write to retry",
                    local_ref.short()
                )));
            }
            require_visible(ctx, entry.transaction.branch)?;
            entry.sync = SyncState::Pending(local_ref);
            Ok(entry.transaction.clone())
        })?;
        info!(local_ref = %local_ref, "Retrying failed write");

        let snapshot = self.snapshot.clone();
        let store = self.transactions.clone();
        Ok(self.spawn(vec![local_ref], async move {
            match store.create(&transaction).await {
                Ok(id) => {
                    snapshot.promote(local_ref, id);
                    info!(local_ref = %local_ref, transaction_id = %id, "Retry committed");
                    Ok(id)
                }
                Err(e) => {
                    snapshot.mark_failed(local_ref, e.to_string());
                    warn!(local_ref = %local_ref, error = %e, "Retry failed");
                    Err(LedgerError::remote("retry_failed", e))
                }
            }
        }))
    }

    /// Drops an entry left `Failed` without writing anything.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `InvalidState` if the entry is not failed.
    pub fn discard_failed(
        &self,
        ctx: &SessionContext,
        local_ref: LocalRef,
    ) -> Result<Transaction, LedgerError> {
        let entry = self.snapshot.try_modify(|state| {
            let index = state
                .position(local_ref)
                .ok_or_else(|| LedgerError::NotFound(local_ref.to_string()))?;
            let entry = &state.entries()[index];
            if !entry.is_failed() {
                return Err(LedgerError::InvalidState(format!(
                    "Entry {} has no failed write to discard",
                    local_ref.short()
                )));
            }
            require_visible(ctx, entry.transaction.branch)?;
            Ok(state.remove_at(index))
        })?;
        info!(local_ref = %local_ref, "Failed entry discarded");
        Ok(entry.transaction)
    }

    fn prepare(
        &self,
        ctx: &SessionContext,
        input: NewTransaction,
    ) -> Result<Transaction, LedgerError> {
        require_positive(input.amount, "Amount")?;
        require_category(&input.category)?;
        let branch = input.branch.unwrap_or(ctx.branch);
        require_tier_branch(input.tier, branch)?;
        require_visible(ctx, branch)?;

        let category = input.category.trim().to_string();
        let description = input
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| category.clone());

        Ok(Transaction {
            id: None,
            branch,
            direction: input.direction,
            tier: input.tier,
            category,
            amount: input.amount,
            description,
            date: input.date.unwrap_or(ctx.today),
            deleted: false,
        })
    }

    fn flip_deleted(
        &self,
        ctx: &SessionContext,
        id: TransactionId,
        deleted: bool,
    ) -> Result<LocalRef, LedgerError> {
        self.snapshot.try_modify(|state| {
            let entry = state.by_id(id).ok_or_else(|| not_found(id))?;
            if entry.transaction.deleted == deleted {
                let place = if deleted { "already in" } else { "not in" };
                return Err(LedgerError::InvalidState(format!(
                    "Transaction {id} is {place} the trash"
                )));
            }
            require_visible(ctx, entry.transaction.branch)?;
            let local_ref = entry.local_ref;
            let slot = state.entry_mut(local_ref).ok_or_else(|| not_found(id))?;
            slot.transaction.deleted = deleted;
            Ok(local_ref)
        })
    }
}

fn require_category(category: &str) -> Result<(), LedgerError> {
    if category.trim().is_empty() {
        return Err(LedgerError::Validation("Category is required".to_string()));
    }
    Ok(())
}

fn require_tier_branch(tier: Tier, branch: Branch) -> Result<(), LedgerError> {
    if tier == Tier::BranchPettyCash && branch.is_central() {
        return Err(LedgerError::Validation(format!(
            "{} has no petty cash",
            branch.display_name()
        )));
    }
    Ok(())
}
