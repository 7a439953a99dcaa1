//! Savings account repository and façade traits.
//!
//! These traits define the contract for savings account access without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;

use super::savings_model::{
    DepositAccountType, SavingsAccount, SavingsAccountCharge, SavingsAccountStatus,
    SavingsAccountTransaction,
};
use crate::errors::Result;

/// Source for the collections of an account that are not fetched with its root row.
pub trait SavingsAccountCollectionLoader: Send + Sync {
    fn load_transactions(&self, savings_account_id: i64) -> Result<Vec<SavingsAccountTransaction>>;

    fn load_charges(&self, savings_account_id: i64) -> Result<Vec<SavingsAccountCharge>>;
}

/// Trait defining the contract for savings account storage.
///
/// Lookups return accounts with unresolved collections. Absence is reported as
/// `None` (or an empty `Vec`), never as an error.
#[async_trait]
pub trait SavingsAccountRepositoryTrait: SavingsAccountCollectionLoader {
    fn find_by_id(&self, savings_account_id: i64) -> Result<Option<SavingsAccount>>;

    fn find_by_id_and_deposit_account_type(
        &self,
        savings_account_id: i64,
        deposit_account_type: DepositAccountType,
    ) -> Result<Option<SavingsAccount>>;

    fn find_by_client_id(&self, client_id: i64) -> Result<Vec<SavingsAccount>>;

    fn find_by_status(&self, status: SavingsAccountStatus) -> Result<Vec<SavingsAccount>>;

    fn find_by_client_id_and_group_id(
        &self,
        client_id: i64,
        group_id: i64,
    ) -> Result<Vec<SavingsAccount>>;

    fn find_by_group_id(&self, group_id: i64) -> Result<Vec<SavingsAccount>>;

    /// True if the client owns at least one account in an open status.
    fn has_open_accounts_for_client(&self, client_id: i64) -> Result<bool>;

    /// Looks up an account in an open status by its account number.
    fn find_open_by_account_number(&self, account_number: &str)
        -> Result<Option<SavingsAccount>>;

    /// Inserts or updates the account.
    async fn save(&self, account: SavingsAccount) -> Result<SavingsAccount>;

    /// Saves the account and forces the write through to durable storage.
    async fn save_and_flush(&self, account: SavingsAccount) -> Result<SavingsAccount>;

    async fn delete(&self, account: &SavingsAccount) -> Result<()>;
}

/// Entry point other components use to read and write savings accounts.
#[async_trait]
pub trait SavingsAccountFacadeTrait: Send + Sync {
    /// Fetches an account or fails with `SavingsAccountError::NotFound`.
    ///
    /// Unless the account's external identifier is excluded, the summary is flagged
    /// for recomputation and the lazy collections are resolved.
    fn get_by_id_or_fail(&self, savings_account_id: i64) -> Result<SavingsAccount>;

    /// Fetches an account of the given type or fails with
    /// `SavingsAccountError::NotFound`. Collections are always resolved.
    fn get_by_id_and_type_or_fail(
        &self,
        savings_account_id: i64,
        deposit_account_type: DepositAccountType,
    ) -> Result<SavingsAccount>;

    /// All accounts of a client, with collections resolved.
    fn list_by_client(&self, client_id: i64) -> Result<Vec<SavingsAccount>>;

    /// All accounts in a status, with collections resolved.
    fn list_by_status(&self, status: SavingsAccountStatus) -> Result<Vec<SavingsAccount>>;

    /// Root entities only.
    fn list_by_client_and_group(
        &self,
        client_id: i64,
        group_id: i64,
    ) -> Result<Vec<SavingsAccount>>;

    /// Root entities only.
    fn list_by_group(&self, group_id: i64) -> Result<Vec<SavingsAccount>>;

    fn exists_open_account_for_client(&self, client_id: i64) -> Result<bool>;

    /// Root entity only. An unknown account number yields `Ok(None)`.
    fn find_open_by_account_number(&self, account_number: &str)
        -> Result<Option<SavingsAccount>>;

    async fn save(&self, account: SavingsAccount) -> Result<SavingsAccount>;

    async fn save_and_flush(&self, account: SavingsAccount) -> Result<SavingsAccount>;

    async fn delete(&self, account: &SavingsAccount) -> Result<()>;
}
