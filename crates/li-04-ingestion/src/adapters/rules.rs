//! Rules engine adapters.

use crate::ports::RulesEngine;
use shared_types::{
    OrganisationTransactions, ProcessorFlags, Severity, Source, Transaction, TransactionItem,
    TransactionViolation, ViolationCode,
};
use tracing::debug;

/// Leaves violations as they are and only refreshes the validation status.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRulesEngine;

impl RulesEngine for NoopRulesEngine {
    fn run(&self, transactions: &mut OrganisationTransactions, _flags: ProcessorFlags) {
        for tx in transactions.transactions.iter_mut() {
            tx.update_automated_validation_status();
        }
    }
}

const BASIC_RULES_MODULE: &str = "BasicRulesEngine";

/// Structural item checks: account codes present, amounts consistent.
///
/// Violations raised by an earlier run of this engine are dropped before
/// re-evaluation, so the result depends on the input only.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicRulesEngine;

impl BasicRulesEngine {
    fn evaluate(tx: &mut Transaction) {
        tx.violations
            .retain(|v| v.processor_module != BASIC_RULES_MODULE);

        let raised: Vec<TransactionViolation> = tx.items.iter().flat_map(check_item).collect();
        for violation in raised {
            tx.add_violation(violation);
        }
        tx.update_automated_validation_status();
    }
}

fn check_item(item: &TransactionItem) -> Vec<TransactionViolation> {
    let violation = |code, source| {
        TransactionViolation::new(code, Severity::Error, source, BASIC_RULES_MODULE)
            .with_bag_entry("transactionItemId", item.id.as_str())
    };
    let blank = |value: &Option<String>| value.as_deref().map_or(true, |v| v.trim().is_empty());

    let mut found = Vec::new();
    if blank(&item.account_debit) {
        found.push(violation(ViolationCode::AccountCodeDebitIsEmpty, Source::Lob));
    }
    if blank(&item.account_credit) {
        found.push(violation(ViolationCode::AccountCodeCreditIsEmpty, Source::Lob));
    }
    if item.amount_fcy.is_zero() && !item.amount_lcy.is_zero() {
        found.push(violation(ViolationCode::AmountFcyIsZero, Source::Erp));
    }
    if item.amount_lcy.is_zero() && !item.amount_fcy.is_zero() {
        found.push(violation(ViolationCode::AmountLcyIsZero, Source::Erp));
    }
    found
}

impl RulesEngine for BasicRulesEngine {
    fn run(&self, transactions: &mut OrganisationTransactions, flags: ProcessorFlags) {
        debug!(
            organisation_id = %transactions.organisation_id,
            tx_count = transactions.len(),
            trigger = ?flags.trigger,
            "Running business rules"
        );
        for tx in transactions.transactions.iter_mut() {
            Self::evaluate(tx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use shared_types::{AutomatedValidationStatus, TransactionType};

    fn org_txs(items: Vec<TransactionItem>) -> OrganisationTransactions {
        let tx = Transaction::new(
            "t1",
            "org-1",
            "INV-1",
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            TransactionType::CardCharge,
            "b1",
        )
        .with_items(items);
        OrganisationTransactions::new("org-1", vec![tx])
    }

    fn codes(txs: &OrganisationTransactions) -> Vec<ViolationCode> {
        txs.transactions[0].violations.iter().map(|v| v.code).collect()
    }

    #[test]
    fn test_clean_transaction_validates() {
        let mut txs = org_txs(vec![
            TransactionItem::new("i1", dec!(10), dec!(9.5)).with_accounts("1000", "2000")
        ]);

        BasicRulesEngine.run(&mut txs, ProcessorFlags::import());

        assert!(codes(&txs).is_empty());
        assert_eq!(
            txs.transactions[0].automated_validation_status,
            AutomatedValidationStatus::Validated
        );
    }

    #[test]
    fn test_missing_accounts_and_zero_amount() {
        let mut txs = org_txs(vec![TransactionItem::new("i1", dec!(10), dec!(0))]);

        BasicRulesEngine.run(&mut txs, ProcessorFlags::import());

        assert_eq!(
            codes(&txs),
            vec![
                ViolationCode::AccountCodeDebitIsEmpty,
                ViolationCode::AccountCodeCreditIsEmpty,
                ViolationCode::AmountLcyIsZero,
            ]
        );
        assert_eq!(
            txs.transactions[0].automated_validation_status,
            AutomatedValidationStatus::Failed
        );
    }

    #[test]
    fn test_rerun_replaces_own_violations() {
        let mut txs = org_txs(vec![TransactionItem::new("i1", dec!(10), dec!(10))]);
        BasicRulesEngine.run(&mut txs, ProcessorFlags::import());
        assert_eq!(codes(&txs).len(), 2);

        txs.transactions[0].items[0].account_debit = Some("1000".to_string());
        txs.transactions[0].items[0].account_credit = Some("2000".to_string());
        BasicRulesEngine.run(&mut txs, ProcessorFlags::reprocessing());

        assert!(codes(&txs).is_empty());
        assert_eq!(
            txs.transactions[0].automated_validation_status,
            AutomatedValidationStatus::Validated
        );
    }

    #[test]
    fn test_noop_engine_keeps_violations() {
        let mut txs = org_txs(Vec::new());
        txs.transactions[0].add_violation(TransactionViolation::new(
            ViolationCode::CostCenterDataNotFound,
            Severity::Error,
            Source::Lob,
            "upstream",
        ));

        NoopRulesEngine.run(&mut txs, ProcessorFlags::import());

        assert_eq!(codes(&txs), vec![ViolationCode::CostCenterDataNotFound]);
        assert_eq!(
            txs.transactions[0].automated_validation_status,
            AutomatedValidationStatus::Failed
        );
    }
}
