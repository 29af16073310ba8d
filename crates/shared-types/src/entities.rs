//! # Core Domain Entities
//!
//! Defines the ERP-sourced accounting transaction and everything attached to it.
//!
//! ## Clusters
//!
//! - **ERP origin**: `Transaction` header fields and `TransactionItem` lines.
//!   These are what the version fingerprint covers.
//! - **Evaluation**: `TransactionViolation`, `Rejection`,
//!   `AutomatedValidationStatus`, `TransactionProcessingStatus`.
//! - **Approval & dispatch**: approval flags and `LedgerDispatchStatus`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Immutable identity of a transaction as assigned by the ERP adapter.
pub type TransactionId = String;

/// Identifier of an ingestion or reconciliation batch.
pub type BatchId = String;

/// Identifier of the owning organisation.
pub type OrganisationId = String;

// =============================================================================
// CLUSTER A: ERP ORIGIN
// =============================================================================

/// Accounting transaction type as reported by the ERP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    CardCharge,
    VendorBill,
    CardRefund,
    Journal,
    FxRevaluation,
    Transfer,
    CustomerPayment,
    ExpenseReport,
    VendorPayment,
    BillCredit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::CardCharge => "CARD_CHARGE",
            TransactionType::VendorBill => "VENDOR_BILL",
            TransactionType::CardRefund => "CARD_REFUND",
            TransactionType::Journal => "JOURNAL",
            TransactionType::FxRevaluation => "FX_REVALUATION",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::CustomerPayment => "CUSTOMER_PAYMENT",
            TransactionType::ExpenseReport => "EXPENSE_REPORT",
            TransactionType::VendorPayment => "VENDOR_PAYMENT",
            TransactionType::BillCredit => "BILL_CREDIT",
        }
    }
}

/// Which authority a violation or rejection originates from.
///
/// `Erp` problems can only be fixed by correcting the data in the ERP and
/// re-importing; `Lob` problems are fixed inside this system (mappings,
/// conversions) and re-evaluated by reprocessing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    Erp,
    Lob,
}

/// A human rejection of a single transaction line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
    pub source: Source,
}

impl Rejection {
    pub fn new(reason: impl Into<String>, source: Source) -> Self {
        Self {
            reason: reason.into(),
            source,
        }
    }
}

/// One accounting line of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: String,
    pub account_debit: Option<String>,
    pub account_credit: Option<String>,
    pub amount_fcy: Decimal,
    pub amount_lcy: Decimal,
    pub currency: String,
    pub document_number: Option<String>,
    pub cost_center: Option<String>,
    pub rejection: Option<Rejection>,
}

impl TransactionItem {
    pub fn new(id: impl Into<String>, amount_fcy: Decimal, amount_lcy: Decimal) -> Self {
        Self {
            id: id.into(),
            account_debit: None,
            account_credit: None,
            amount_fcy,
            amount_lcy,
            currency: "EUR".to_string(),
            document_number: None,
            cost_center: None,
            rejection: None,
        }
    }

    pub fn with_accounts(mut self, debit: impl Into<String>, credit: impl Into<String>) -> Self {
        self.account_debit = Some(debit.into());
        self.account_credit = Some(credit.into());
        self
    }

    pub fn with_document(mut self, document_number: impl Into<String>) -> Self {
        self.document_number = Some(document_number.into());
        self
    }

    pub fn with_rejection(mut self, rejection: Rejection) -> Self {
        self.rejection = Some(rejection);
        self
    }

    pub fn is_rejected_by(&self, source: Source) -> bool {
        self.rejection.as_ref().is_some_and(|r| r.source == source)
    }
}

// =============================================================================
// CLUSTER B: EVALUATION
// =============================================================================

/// Severity of a violation. Only `Error` blocks validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warn,
    Error,
}

/// Violation codes raised against transactions.
///
/// All codes except `TxVersionConflictTxNotModifiable` are produced by the
/// rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationCode {
    TxVersionConflictTxNotModifiable,
    TxTechnicalFailure,
    DocumentMustBePresent,
    AccountCodeDebitIsEmpty,
    AccountCodeCreditIsEmpty,
    AmountFcyIsZero,
    AmountLcyIsZero,
    CurrencyDataInconsistency,
    CostCenterDataNotFound,
}

impl ViolationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::TxVersionConflictTxNotModifiable => {
                "TX_VERSION_CONFLICT_TX_NOT_MODIFIABLE"
            }
            ViolationCode::TxTechnicalFailure => "TX_TECHNICAL_FAILURE",
            ViolationCode::DocumentMustBePresent => "DOCUMENT_MUST_BE_PRESENT",
            ViolationCode::AccountCodeDebitIsEmpty => "ACCOUNT_CODE_DEBIT_IS_EMPTY",
            ViolationCode::AccountCodeCreditIsEmpty => "ACCOUNT_CODE_CREDIT_IS_EMPTY",
            ViolationCode::AmountFcyIsZero => "AMOUNT_FCY_IS_ZERO",
            ViolationCode::AmountLcyIsZero => "AMOUNT_LCY_IS_ZERO",
            ViolationCode::CurrencyDataInconsistency => "CURRENCY_DATA_INCONSISTENCY",
            ViolationCode::CostCenterDataNotFound => "COST_CENTER_DATA_NOT_FOUND",
        }
    }
}

/// A violation attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionViolation {
    pub code: ViolationCode,
    pub severity: Severity,
    pub source: Source,
    /// Name of the component that raised the violation.
    pub processor_module: String,
    pub bag: BTreeMap<String, String>,
}

impl TransactionViolation {
    pub fn new(
        code: ViolationCode,
        severity: Severity,
        source: Source,
        processor_module: impl Into<String>,
    ) -> Self {
        Self {
            code,
            severity,
            source,
            processor_module: processor_module.into(),
            bag: BTreeMap::new(),
        }
    }

    pub fn with_bag_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.bag.insert(key.into(), value.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Result of the automated rules evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomatedValidationStatus {
    #[default]
    Validated,
    Failed,
}

/// Where a transaction stands in the approval/publishing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionProcessingStatus {
    /// Ready to approve.
    Approve,
    /// Blocked by a LOB violation or rejection.
    Pending,
    /// Blocked by an ERP violation or rejection.
    Invalid,
    /// Approved, ready to publish.
    Publish,
    /// Handed over to the publisher.
    Published,
    /// Dispatched, completed or finalized on the ledger.
    Dispatched,
}

// =============================================================================
// CLUSTER C: APPROVAL & DISPATCH
// =============================================================================

/// Ledger dispatch lifecycle of a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerDispatchStatus {
    /// Not handed to the publisher yet.
    #[default]
    NotDispatched,
    /// Stored by the publisher, waiting for submission.
    MarkDispatch,
    /// Submitted; a ledger tx hash exists.
    Dispatched,
    /// Submitted with a sufficient finality score.
    Completed,
    /// Final on the ledger.
    Finalized,
    Retrying,
    Failed,
}

impl LedgerDispatchStatus {
    pub fn all_dispatched_statuses() -> [LedgerDispatchStatus; 6] {
        [
            LedgerDispatchStatus::MarkDispatch,
            LedgerDispatchStatus::Dispatched,
            LedgerDispatchStatus::Completed,
            LedgerDispatchStatus::Finalized,
            LedgerDispatchStatus::Retrying,
            LedgerDispatchStatus::Failed,
        ]
    }

    /// Only a transaction that was never handed over can still be dispatched.
    pub fn is_dispatchable(&self) -> bool {
        *self == LedgerDispatchStatus::NotDispatched
    }

    /// Statuses that carry a ledger receipt.
    pub fn is_on_ledger(&self) -> bool {
        matches!(
            self,
            LedgerDispatchStatus::Dispatched
                | LedgerDispatchStatus::Completed
                | LedgerDispatchStatus::Finalized
        )
    }
}

/// Outcome of matching a transaction against the ledger of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationCode {
    Ok,
    Nok,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub reconciliation_id: String,
    pub source: Option<ReconciliationCode>,
    pub sink: Option<ReconciliationCode>,
}

/// A status change reported by the ledger follower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatusUpdate {
    pub tx_id: TransactionId,
    pub status: LedgerDispatchStatus,
    pub error_reason: Option<String>,
}

impl TxStatusUpdate {
    pub fn new(tx_id: impl Into<TransactionId>, status: LedgerDispatchStatus) -> Self {
        Self {
            tx_id: tx_id.into(),
            status,
            error_reason: None,
        }
    }
}

// =============================================================================
// THE TRANSACTION
// =============================================================================

/// An ERP-sourced accounting transaction.
///
/// ## Invariant
///
/// Once `all_approvals_passed_for_dispatch()` holds, the ERP-origin fields and
/// the item collection are frozen; the synchronisation use-case records an
/// incoming change as a `TxVersionConflictTxNotModifiable` violation instead
/// of applying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub organisation_id: OrganisationId,
    pub internal_number: String,
    pub entry_date: NaiveDate,
    pub transaction_type: TransactionType,
    pub items: Vec<TransactionItem>,
    /// Ordered set: insertion order is kept, duplicates are ignored.
    pub violations: Vec<TransactionViolation>,
    pub automated_validation_status: AutomatedValidationStatus,
    pub transaction_approved: bool,
    pub ledger_dispatch_approved: bool,
    pub ledger_dispatch_status: LedgerDispatchStatus,
    pub processing_status: Option<TransactionProcessingStatus>,
    pub batch_id: BatchId,
    pub reconciliation: Option<ReconciliationResult>,
}

impl Transaction {
    pub fn new(
        id: impl Into<TransactionId>,
        organisation_id: impl Into<OrganisationId>,
        internal_number: impl Into<String>,
        entry_date: NaiveDate,
        transaction_type: TransactionType,
        batch_id: impl Into<BatchId>,
    ) -> Self {
        Self {
            id: id.into(),
            organisation_id: organisation_id.into(),
            internal_number: internal_number.into(),
            entry_date,
            transaction_type,
            items: Vec::new(),
            violations: Vec::new(),
            automated_validation_status: AutomatedValidationStatus::Validated,
            transaction_approved: false,
            ledger_dispatch_approved: false,
            ledger_dispatch_status: LedgerDispatchStatus::NotDispatched,
            processing_status: None,
            batch_id: batch_id.into(),
            reconciliation: None,
        }
    }

    pub fn with_items(mut self, items: Vec<TransactionItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_item(mut self, item: TransactionItem) -> Self {
        self.items.push(item);
        self
    }

    /// Marks the transaction as approved and approved for dispatch.
    pub fn approved_for_dispatch(mut self) -> Self {
        self.transaction_approved = true;
        self.ledger_dispatch_approved = true;
        self
    }

    /// Every approval gate required before ledger dispatch has been passed.
    pub fn all_approvals_passed_for_dispatch(&self) -> bool {
        self.transaction_approved && self.ledger_dispatch_approved
    }

    /// Adds a violation unless an identical one is already present.
    ///
    /// Returns `true` if the violation was added.
    pub fn add_violation(&mut self, violation: TransactionViolation) -> bool {
        if self.violations.contains(&violation) {
            return false;
        }
        self.violations.push(violation);
        true
    }

    /// Removes every violation with the given code. Returns `true` if any was removed.
    pub fn remove_violations_with_code(&mut self, code: ViolationCode) -> bool {
        let before = self.violations.len();
        self.violations.retain(|v| v.code != code);
        self.violations.len() != before
    }

    pub fn has_violation(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }

    pub fn has_any_violation(&self, source: Source) -> bool {
        self.violations.iter().any(|v| v.source == source)
    }

    pub fn has_any_rejection(&self, source: Source) -> bool {
        self.items.iter().any(|i| i.is_rejected_by(source))
    }

    /// Clears item rejections raised by the given authority.
    pub fn clear_all_items_rejections_source(&mut self, source: Source) {
        for item in self.items.iter_mut().filter(|i| i.is_rejected_by(source)) {
            item.rejection = None;
        }
    }

    /// `Failed` iff any blocking violation is present.
    pub fn update_automated_validation_status(&mut self) {
        self.automated_validation_status = if self.violations.iter().any(|v| v.is_blocking()) {
            AutomatedValidationStatus::Failed
        } else {
            AutomatedValidationStatus::Validated
        };
    }

    /// Recomputes the derived processing status from approvals, dispatch
    /// state, blocking violations and rejections.
    pub fn update_processing_status(&mut self) {
        self.processing_status = Some(self.derive_processing_status());
    }

    fn derive_processing_status(&self) -> TransactionProcessingStatus {
        if self.all_approvals_passed_for_dispatch() {
            if self.ledger_dispatch_status.is_on_ledger() {
                return TransactionProcessingStatus::Dispatched;
            }
            if !self.ledger_dispatch_status.is_dispatchable() {
                return TransactionProcessingStatus::Published;
            }
            return TransactionProcessingStatus::Publish;
        }

        if self.is_blocked_by(Source::Erp) {
            return TransactionProcessingStatus::Invalid;
        }
        if self.is_blocked_by(Source::Lob) {
            return TransactionProcessingStatus::Pending;
        }

        TransactionProcessingStatus::Approve
    }

    fn is_blocked_by(&self, source: Source) -> bool {
        self.violations
            .iter()
            .any(|v| v.source == source && v.is_blocking())
            || self.has_any_rejection(source)
    }

    /// Overwrites the ERP-origin content with `incoming`, keeping identity,
    /// batch ownership, approvals, dispatch state and reconciliation.
    ///
    /// The item collection is replaced wholesale and the rules evaluation
    /// carried by `incoming` replaces the stored one.
    pub fn copy_erp_fields_from(&mut self, incoming: Transaction) {
        self.organisation_id = incoming.organisation_id;
        self.internal_number = incoming.internal_number;
        self.entry_date = incoming.entry_date;
        self.transaction_type = incoming.transaction_type;
        self.items = incoming.items;
        self.violations = incoming.violations;
        self.automated_validation_status = incoming.automated_validation_status;
    }
}

/// Transactions of a single organisation, de-duplicated by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganisationTransactions {
    pub organisation_id: OrganisationId,
    pub transactions: Vec<Transaction>,
}

impl OrganisationTransactions {
    /// Builds the set, keeping the first occurrence of every id.
    pub fn new(organisation_id: impl Into<OrganisationId>, transactions: Vec<Transaction>) -> Self {
        let mut seen = HashSet::new();
        let transactions = transactions
            .into_iter()
            .filter(|tx| seen.insert(tx.id.clone()))
            .collect();

        Self {
            organisation_id: organisation_id.into(),
            transactions,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn ids(&self) -> Vec<TransactionId> {
        self.transactions.iter().map(|tx| tx.id.clone()).collect()
    }
}
