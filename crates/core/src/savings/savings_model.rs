//! Savings account domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::savings_traits::SavingsAccountCollectionLoader;
use crate::errors::{Error, Result, ValidationError};

fn unknown_code(kind: &str, code: i32) -> Error {
    Error::Validation(ValidationError::InvalidInput(format!(
        "Unknown {} code: {}",
        kind, code
    )))
}

/// Lifecycle status of a savings account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SavingsAccountStatus {
    SubmittedAndPendingApproval,
    Approved,
    Active,
    TransferInProgress,
    TransferOnHold,
    WithdrawnByApplicant,
    Rejected,
    Closed,
    PrematureClosure,
    Matured,
}

impl SavingsAccountStatus {
    /// Statuses of accounts that have not been closed, withdrawn, rejected or matured.
    pub const OPEN: [SavingsAccountStatus; 5] = [
        SavingsAccountStatus::SubmittedAndPendingApproval,
        SavingsAccountStatus::Approved,
        SavingsAccountStatus::Active,
        SavingsAccountStatus::TransferInProgress,
        SavingsAccountStatus::TransferOnHold,
    ];

    /// Persisted status code.
    pub fn code(self) -> i32 {
        match self {
            SavingsAccountStatus::SubmittedAndPendingApproval => 100,
            SavingsAccountStatus::Approved => 200,
            SavingsAccountStatus::Active => 300,
            SavingsAccountStatus::TransferInProgress => 303,
            SavingsAccountStatus::TransferOnHold => 304,
            SavingsAccountStatus::WithdrawnByApplicant => 400,
            SavingsAccountStatus::Rejected => 500,
            SavingsAccountStatus::Closed => 600,
            SavingsAccountStatus::PrematureClosure => 700,
            SavingsAccountStatus::Matured => 800,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            100 => Ok(SavingsAccountStatus::SubmittedAndPendingApproval),
            200 => Ok(SavingsAccountStatus::Approved),
            300 => Ok(SavingsAccountStatus::Active),
            303 => Ok(SavingsAccountStatus::TransferInProgress),
            304 => Ok(SavingsAccountStatus::TransferOnHold),
            400 => Ok(SavingsAccountStatus::WithdrawnByApplicant),
            500 => Ok(SavingsAccountStatus::Rejected),
            600 => Ok(SavingsAccountStatus::Closed),
            700 => Ok(SavingsAccountStatus::PrematureClosure),
            800 => Ok(SavingsAccountStatus::Matured),
            other => Err(unknown_code("savings account status", other)),
        }
    }

    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }
}

/// Deposit product family an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositAccountType {
    SavingsDeposit,
    FixedDeposit,
    RecurringDeposit,
    CurrentDeposit,
}

impl DepositAccountType {
    pub fn code(self) -> i32 {
        match self {
            DepositAccountType::SavingsDeposit => 100,
            DepositAccountType::FixedDeposit => 200,
            DepositAccountType::RecurringDeposit => 300,
            DepositAccountType::CurrentDeposit => 400,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            100 => Ok(DepositAccountType::SavingsDeposit),
            200 => Ok(DepositAccountType::FixedDeposit),
            300 => Ok(DepositAccountType::RecurringDeposit),
            400 => Ok(DepositAccountType::CurrentDeposit),
            other => Err(unknown_code("deposit account type", other)),
        }
    }
}

/// Kind of a savings account transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SavingsTransactionType {
    Deposit,
    Withdrawal,
    InterestPosting,
    WithdrawalFee,
    AnnualFee,
    PayCharge,
}

impl SavingsTransactionType {
    pub fn code(self) -> i32 {
        match self {
            SavingsTransactionType::Deposit => 1,
            SavingsTransactionType::Withdrawal => 2,
            SavingsTransactionType::InterestPosting => 3,
            SavingsTransactionType::WithdrawalFee => 4,
            SavingsTransactionType::AnnualFee => 5,
            SavingsTransactionType::PayCharge => 7,
        }
    }

    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            1 => Ok(SavingsTransactionType::Deposit),
            2 => Ok(SavingsTransactionType::Withdrawal),
            3 => Ok(SavingsTransactionType::InterestPosting),
            4 => Ok(SavingsTransactionType::WithdrawalFee),
            5 => Ok(SavingsTransactionType::AnnualFee),
            7 => Ok(SavingsTransactionType::PayCharge),
            other => Err(unknown_code("savings transaction type", other)),
        }
    }

    pub fn is_fee(self) -> bool {
        matches!(
            self,
            SavingsTransactionType::WithdrawalFee
                | SavingsTransactionType::AnnualFee
                | SavingsTransactionType::PayCharge
        )
    }
}

/// An association that is not fetched together with its owning account.
///
/// Stores hand out accounts with `Unresolved` collections; they become `Resolved`
/// once [`SavingsAccount::load_lazy_collections`] has run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "state", content = "items")]
pub enum LazyCollection<T> {
    Unresolved,
    Resolved(Vec<T>),
}

impl<T> Default for LazyCollection<T> {
    fn default() -> Self {
        LazyCollection::Unresolved
    }
}

impl<T> LazyCollection<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, LazyCollection::Resolved(_))
    }

    /// Returns the items, or `None` while the collection is unresolved.
    pub fn as_slice(&self) -> Option<&[T]> {
        match self {
            LazyCollection::Resolved(items) => Some(items),
            LazyCollection::Unresolved => None,
        }
    }

    /// Resolves the collection with `load` unless it is already resolved.
    pub fn resolve_with<F>(&mut self, load: F) -> Result<()>
    where
        F: FnOnce() -> Result<Vec<T>>,
    {
        if let LazyCollection::Unresolved = self {
            *self = LazyCollection::Resolved(load()?);
        }
        Ok(())
    }
}

/// A single movement on a savings account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsAccountTransaction {
    pub id: i64,
    pub savings_account_id: i64,
    pub transaction_type: SavingsTransactionType,
    pub amount: Decimal,
    pub transaction_date: NaiveDate,
    pub is_reversed: bool,
}

/// A charge applied to a savings account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsAccountCharge {
    pub id: i64,
    pub savings_account_id: i64,
    pub name: String,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub due_date: Option<NaiveDate>,
    pub is_active: bool,
}

/// Derived totals of an account, recomputed from its transaction history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsAccountSummary {
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub total_interest_posted: Decimal,
    pub total_fees: Decimal,
    pub account_balance: Decimal,
}

impl SavingsAccountSummary {
    /// Folds non-reversed transactions into running totals.
    pub fn from_transactions(transactions: &[SavingsAccountTransaction]) -> Self {
        let mut summary = Self::default();
        for transaction in transactions.iter().filter(|t| !t.is_reversed) {
            match transaction.transaction_type {
                SavingsTransactionType::Deposit => summary.total_deposits += transaction.amount,
                SavingsTransactionType::Withdrawal => {
                    summary.total_withdrawals += transaction.amount
                }
                SavingsTransactionType::InterestPosting => {
                    summary.total_interest_posted += transaction.amount
                }
                fee if fee.is_fee() => summary.total_fees += transaction.amount,
                _ => {}
            }
        }
        summary.account_balance = summary.total_deposits + summary.total_interest_posted
            - summary.total_withdrawals
            - summary.total_fees;
        summary
    }
}

/// Domain model representing a savings account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsAccount {
    pub id: i64,
    pub account_number: String,
    pub external_id: Option<String>,
    pub client_id: Option<i64>,
    pub group_id: Option<i64>,
    pub status: SavingsAccountStatus,
    pub deposit_account_type: DepositAccountType,
    pub currency: String,
    pub summary: SavingsAccountSummary,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub transactions: LazyCollection<SavingsAccountTransaction>,
    #[serde(default)]
    pub charges: LazyCollection<SavingsAccountCharge>,
    /// Set when the summary must be recomputed before the account is persisted.
    #[serde(skip)]
    update_summary: bool,
}

impl SavingsAccount {
    /// Creates a pending account with empty, already resolved collections.
    pub fn new(
        id: i64,
        account_number: impl Into<String>,
        deposit_account_type: DepositAccountType,
        currency: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            account_number: account_number.into(),
            external_id: None,
            client_id: None,
            group_id: None,
            status: SavingsAccountStatus::SubmittedAndPendingApproval,
            deposit_account_type,
            currency: currency.into(),
            summary: SavingsAccountSummary::default(),
            created_at: now,
            updated_at: now,
            transactions: LazyCollection::Resolved(Vec::new()),
            charges: LazyCollection::Resolved(Vec::new()),
            update_summary: false,
        }
    }

    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn with_client(mut self, client_id: i64) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn with_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_status(mut self, status: SavingsAccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn update_summary(&self) -> bool {
        self.update_summary
    }

    pub fn set_update_summary(&mut self, update_summary: bool) {
        self.update_summary = update_summary;
    }

    /// True when every lazy collection has been resolved.
    pub fn is_lazy_loaded(&self) -> bool {
        self.transactions.is_resolved() && self.charges.is_resolved()
    }

    /// Resolves the transactions and charges that are still unresolved.
    pub fn load_lazy_collections<L>(&mut self, loader: &L) -> Result<()>
    where
        L: SavingsAccountCollectionLoader + ?Sized,
    {
        let savings_account_id = self.id;
        self.transactions
            .resolve_with(|| loader.load_transactions(savings_account_id))?;
        self.charges
            .resolve_with(|| loader.load_charges(savings_account_id))?;
        Ok(())
    }

    /// Recomputes the summary when it is flagged for update and the transactions
    /// are resolved. Returns whether the summary was recomputed.
    pub fn recompute_summary(&mut self) -> bool {
        if !self.update_summary {
            return false;
        }
        match self.transactions.as_slice() {
            Some(transactions) => {
                self.summary = SavingsAccountSummary::from_transactions(transactions);
                true
            }
            None => false,
        }
    }

    /// Returns a copy carrying only root fields, as a store hands it out.
    pub fn without_collections(&self) -> Self {
        Self {
            transactions: LazyCollection::Unresolved,
            charges: LazyCollection::Unresolved,
            update_summary: false,
            ..self.clone()
        }
    }
}
