//! Database models for savings accounts and their collections.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use savings_core::errors::{Error, Result};
use savings_core::savings::{
    DepositAccountType, LazyCollection, SavingsAccount, SavingsAccountCharge,
    SavingsAccountStatus, SavingsAccountSummary, SavingsAccountTransaction,
    SavingsTransactionType,
};

/// Database model for the root row of a savings account
#[derive(
    Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone,
)]
#[diesel(table_name = crate::schema::savings_accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct SavingsAccountDB {
    pub id: i64,
    pub account_number: String,
    pub external_id: Option<String>,
    pub client_id: Option<i64>,
    pub group_id: Option<i64>,
    pub status: i32,
    pub deposit_account_type: i32,
    pub currency: String,
    pub total_deposits: String,
    pub total_withdrawals: String,
    pub total_interest_posted: String,
    pub total_fees: String,
    pub account_balance: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for savings account transactions
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::savings_account_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SavingsAccountTransactionDB {
    pub id: i64,
    pub savings_account_id: i64,
    pub transaction_type: i32,
    pub amount: String,
    pub transaction_date: NaiveDate,
    pub is_reversed: bool,
}

/// Database model for savings account charges
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::savings_account_charges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SavingsAccountChargeDB {
    pub id: i64,
    pub savings_account_id: i64,
    pub name: String,
    pub amount: String,
    pub amount_paid: String,
    pub due_date: Option<NaiveDate>,
    pub is_active: bool,
}

fn parse_decimal(value: &str) -> Result<Decimal> {
    Ok(Decimal::from_str(value)?)
}

// Conversion implementations

/// Rows only carry root fields, so both collections come back unresolved.
impl TryFrom<SavingsAccountDB> for SavingsAccount {
    type Error = Error;

    fn try_from(db: SavingsAccountDB) -> Result<Self> {
        let mut account = SavingsAccount::new(
            db.id,
            db.account_number,
            DepositAccountType::from_code(db.deposit_account_type)?,
            db.currency,
        );
        account.external_id = db.external_id;
        account.client_id = db.client_id;
        account.group_id = db.group_id;
        account.status = SavingsAccountStatus::from_code(db.status)?;
        account.summary = SavingsAccountSummary {
            total_deposits: parse_decimal(&db.total_deposits)?,
            total_withdrawals: parse_decimal(&db.total_withdrawals)?,
            total_interest_posted: parse_decimal(&db.total_interest_posted)?,
            total_fees: parse_decimal(&db.total_fees)?,
            account_balance: parse_decimal(&db.account_balance)?,
        };
        account.created_at = db.created_at;
        account.updated_at = db.updated_at;
        account.transactions = LazyCollection::Unresolved;
        account.charges = LazyCollection::Unresolved;
        Ok(account)
    }
}

impl From<&SavingsAccount> for SavingsAccountDB {
    fn from(domain: &SavingsAccount) -> Self {
        Self {
            id: domain.id,
            account_number: domain.account_number.clone(),
            external_id: domain.external_id.clone(),
            client_id: domain.client_id,
            group_id: domain.group_id,
            status: domain.status.code(),
            deposit_account_type: domain.deposit_account_type.code(),
            currency: domain.currency.clone(),
            total_deposits: domain.summary.total_deposits.to_string(),
            total_withdrawals: domain.summary.total_withdrawals.to_string(),
            total_interest_posted: domain.summary.total_interest_posted.to_string(),
            total_fees: domain.summary.total_fees.to_string(),
            account_balance: domain.summary.account_balance.to_string(),
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl TryFrom<SavingsAccountTransactionDB> for SavingsAccountTransaction {
    type Error = Error;

    fn try_from(db: SavingsAccountTransactionDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            savings_account_id: db.savings_account_id,
            transaction_type: SavingsTransactionType::from_code(db.transaction_type)?,
            amount: parse_decimal(&db.amount)?,
            transaction_date: db.transaction_date,
            is_reversed: db.is_reversed,
        })
    }
}

impl SavingsAccountTransactionDB {
    /// Builds the row for `transaction`, owned by `savings_account_id`.
    pub fn for_account(savings_account_id: i64, transaction: &SavingsAccountTransaction) -> Self {
        Self {
            id: transaction.id,
            savings_account_id,
            transaction_type: transaction.transaction_type.code(),
            amount: transaction.amount.to_string(),
            transaction_date: transaction.transaction_date,
            is_reversed: transaction.is_reversed,
        }
    }
}

impl TryFrom<SavingsAccountChargeDB> for SavingsAccountCharge {
    type Error = Error;

    fn try_from(db: SavingsAccountChargeDB) -> Result<Self> {
        Ok(Self {
            id: db.id,
            savings_account_id: db.savings_account_id,
            name: db.name,
            amount: parse_decimal(&db.amount)?,
            amount_paid: parse_decimal(&db.amount_paid)?,
            due_date: db.due_date,
            is_active: db.is_active,
        })
    }
}

impl SavingsAccountChargeDB {
    pub fn for_account(savings_account_id: i64, charge: &SavingsAccountCharge) -> Self {
        Self {
            id: charge.id,
            savings_account_id,
            name: charge.name.clone(),
            amount: charge.amount.to_string(),
            amount_paid: charge.amount_paid.to_string(),
            due_date: charge.due_date,
            is_active: charge.is_active,
        }
    }
}
