use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::savings_config::EagerLoadExclusions;
use super::savings_errors::SavingsAccountError;
use super::savings_model::{DepositAccountType, SavingsAccount, SavingsAccountStatus};
use super::savings_traits::{SavingsAccountFacadeTrait, SavingsAccountRepositoryTrait};
use crate::errors::Result;

/// Wraps a savings account repository, turning missing accounts into
/// `SavingsAccountError::NotFound` and deciding when lazy collections get resolved.
pub struct SavingsAccountFacade {
    repository: Arc<dyn SavingsAccountRepositoryTrait>,
    exclusions: EagerLoadExclusions,
}

impl SavingsAccountFacade {
    pub fn new(
        repository: Arc<dyn SavingsAccountRepositoryTrait>,
        exclusions: EagerLoadExclusions,
    ) -> Self {
        Self {
            repository,
            exclusions,
        }
    }

    /// Creates a façade using the built-in exclusion set.
    pub fn with_default_exclusions(repository: Arc<dyn SavingsAccountRepositoryTrait>) -> Self {
        Self::new(repository, EagerLoadExclusions::default())
    }

    pub fn exclusions(&self) -> &EagerLoadExclusions {
        &self.exclusions
    }

    /// Resolves the lazy collections of every account, regardless of exclusions.
    /// Order and length of `accounts` are left unchanged.
    pub fn load_lazy_collections(&self, accounts: &mut [SavingsAccount]) -> Result<()> {
        if accounts.is_empty() {
            return Ok(());
        }
        for account in accounts.iter_mut() {
            account.load_lazy_collections(self.repository.as_ref())?;
        }
        debug!(
            "Loaded lazy collections for {} savings accounts",
            accounts.len()
        );
        Ok(())
    }
}

#[async_trait]
impl SavingsAccountFacadeTrait for SavingsAccountFacade {
    fn get_by_id_or_fail(&self, savings_account_id: i64) -> Result<SavingsAccount> {
        let mut account = self
            .repository
            .find_by_id(savings_account_id)?
            .ok_or(SavingsAccountError::NotFound(savings_account_id))?;

        if self.exclusions.is_excluded(account.external_id.as_deref()) {
            debug!(
                "Savings account {} is excluded from eager loading, skipping summary update and lazy collections",
                savings_account_id
            );
        } else {
            debug!(
                "Updating summary and loading lazy collections for savings account {}",
                savings_account_id
            );
            account.set_update_summary(true);
            account.load_lazy_collections(self.repository.as_ref())?;
        }
        Ok(account)
    }

    fn get_by_id_and_type_or_fail(
        &self,
        savings_account_id: i64,
        deposit_account_type: DepositAccountType,
    ) -> Result<SavingsAccount> {
        let mut account = self
            .repository
            .find_by_id_and_deposit_account_type(savings_account_id, deposit_account_type)?
            .ok_or(SavingsAccountError::NotFound(savings_account_id))?;
        account.load_lazy_collections(self.repository.as_ref())?;
        Ok(account)
    }

    fn list_by_client(&self, client_id: i64) -> Result<Vec<SavingsAccount>> {
        let mut accounts = self.repository.find_by_client_id(client_id)?;
        self.load_lazy_collections(&mut accounts)?;
        Ok(accounts)
    }

    fn list_by_status(&self, status: SavingsAccountStatus) -> Result<Vec<SavingsAccount>> {
        let mut accounts = self.repository.find_by_status(status)?;
        self.load_lazy_collections(&mut accounts)?;
        Ok(accounts)
    }

    fn list_by_client_and_group(
        &self,
        client_id: i64,
        group_id: i64,
    ) -> Result<Vec<SavingsAccount>> {
        self.repository
            .find_by_client_id_and_group_id(client_id, group_id)
    }

    fn list_by_group(&self, group_id: i64) -> Result<Vec<SavingsAccount>> {
        self.repository.find_by_group_id(group_id)
    }

    fn exists_open_account_for_client(&self, client_id: i64) -> Result<bool> {
        self.repository.has_open_accounts_for_client(client_id)
    }

    fn find_open_by_account_number(
        &self,
        account_number: &str,
    ) -> Result<Option<SavingsAccount>> {
        self.repository.find_open_by_account_number(account_number)
    }

    async fn save(&self, account: SavingsAccount) -> Result<SavingsAccount> {
        self.repository.save(account).await
    }

    async fn save_and_flush(&self, account: SavingsAccount) -> Result<SavingsAccount> {
        self.repository.save_and_flush(account).await
    }

    async fn delete(&self, account: &SavingsAccount) -> Result<()> {
        self.repository.delete(account).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{DatabaseError, Error};
    use crate::savings::{
        LazyCollection, SavingsAccountCharge, SavingsAccountCollectionLoader,
        SavingsAccountTransaction, SavingsTransactionType, DEFAULT_EAGER_LOAD_EXCLUSIONS,
    };
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::{Mutex, RwLock};

    const REWARDS_ACCOUNT: &str = "0xa733c93d0fa79b32fd6f926a6f928e471f2a5630";
    const MARKETPLACE_ZIMBABWE: &str = "0x50015652274615a12610cc48d32a26a6416514cc";

    // ============== Mock Repository ==============

    /// Keeps full accounts, hands out root entities and serves collections on demand.
    #[derive(Default)]
    struct MockSavingsAccountRepository {
        accounts: RwLock<Vec<SavingsAccount>>,
        collection_loads: Mutex<Vec<i64>>,
        flushes: Mutex<usize>,
        fail_on_load: Mutex<bool>,
        fail_on_find: Mutex<bool>,
    }

    impl MockSavingsAccountRepository {
        fn with_accounts(accounts: Vec<SavingsAccount>) -> Self {
            Self {
                accounts: RwLock::new(accounts),
                ..Self::default()
            }
        }

        fn set_fail_on_load(&self, fail: bool) {
            *self.fail_on_load.lock().unwrap() = fail;
        }

        fn set_fail_on_find(&self, fail: bool) {
            *self.fail_on_find.lock().unwrap() = fail;
        }

        fn collection_loads(&self) -> Vec<i64> {
            self.collection_loads.lock().unwrap().clone()
        }

        fn stored(&self, savings_account_id: i64) -> Option<SavingsAccount> {
            self.accounts
                .read()
                .unwrap()
                .iter()
                .find(|a| a.id == savings_account_id)
                .cloned()
        }

        fn check_find(&self) -> Result<()> {
            if *self.fail_on_find.lock().unwrap() {
                return Err(Error::Database(DatabaseError::ConnectionFailed(
                    "connection refused".to_string(),
                )));
            }
            Ok(())
        }

        fn roots<F>(&self, predicate: F) -> Result<Vec<SavingsAccount>>
        where
            F: Fn(&SavingsAccount) -> bool,
        {
            self.check_find()?;
            Ok(self
                .accounts
                .read()
                .unwrap()
                .iter()
                .filter(|&a| predicate(a))
                .map(SavingsAccount::without_collections)
                .collect())
        }

        fn root(&self, predicate: impl Fn(&SavingsAccount) -> bool) -> Result<Option<SavingsAccount>> {
            Ok(self.roots(predicate)?.into_iter().next())
        }
    }

    impl SavingsAccountCollectionLoader for MockSavingsAccountRepository {
        fn load_transactions(
            &self,
            savings_account_id: i64,
        ) -> Result<Vec<SavingsAccountTransaction>> {
            if *self.fail_on_load.lock().unwrap() {
                return Err(Error::Database(DatabaseError::QueryFailed(
                    "transactions unavailable".to_string(),
                )));
            }
            self.collection_loads.lock().unwrap().push(savings_account_id);
            Ok(self
                .stored(savings_account_id)
                .and_then(|a| a.transactions.as_slice().map(<[_]>::to_vec))
                .unwrap_or_default())
        }

        fn load_charges(&self, savings_account_id: i64) -> Result<Vec<SavingsAccountCharge>> {
            Ok(self
                .stored(savings_account_id)
                .and_then(|a| a.charges.as_slice().map(<[_]>::to_vec))
                .unwrap_or_default())
        }
    }

    #[async_trait]
    impl SavingsAccountRepositoryTrait for MockSavingsAccountRepository {
        fn find_by_id(&self, savings_account_id: i64) -> Result<Option<SavingsAccount>> {
            self.root(|a| a.id == savings_account_id)
        }

        fn find_by_id_and_deposit_account_type(
            &self,
            savings_account_id: i64,
            deposit_account_type: DepositAccountType,
        ) -> Result<Option<SavingsAccount>> {
            self.root(|a| {
                a.id == savings_account_id && a.deposit_account_type == deposit_account_type
            })
        }

        fn find_by_client_id(&self, client_id: i64) -> Result<Vec<SavingsAccount>> {
            self.roots(|a| a.client_id == Some(client_id))
        }

        fn find_by_status(&self, status: SavingsAccountStatus) -> Result<Vec<SavingsAccount>> {
            self.roots(|a| a.status == status)
        }

        fn find_by_client_id_and_group_id(
            &self,
            client_id: i64,
            group_id: i64,
        ) -> Result<Vec<SavingsAccount>> {
            self.roots(|a| a.client_id == Some(client_id) && a.group_id == Some(group_id))
        }

        fn find_by_group_id(&self, group_id: i64) -> Result<Vec<SavingsAccount>> {
            self.roots(|a| a.group_id == Some(group_id))
        }

        fn has_open_accounts_for_client(&self, client_id: i64) -> Result<bool> {
            Ok(!self
                .roots(|a| a.client_id == Some(client_id) && a.status.is_open())?
                .is_empty())
        }

        fn find_open_by_account_number(
            &self,
            account_number: &str,
        ) -> Result<Option<SavingsAccount>> {
            self.root(|a| a.account_number == account_number && a.status.is_open())
        }

        async fn save(&self, account: SavingsAccount) -> Result<SavingsAccount> {
            let mut accounts = self.accounts.write().unwrap();
            accounts.retain(|a| a.id != account.id);
            accounts.push(account.clone());
            Ok(account)
        }

        async fn save_and_flush(&self, account: SavingsAccount) -> Result<SavingsAccount> {
            let saved = self.save(account).await?;
            *self.flushes.lock().unwrap() += 1;
            Ok(saved)
        }

        async fn delete(&self, account: &SavingsAccount) -> Result<()> {
            self.accounts.write().unwrap().retain(|a| a.id != account.id);
            Ok(())
        }
    }

    // ============== Fixtures ==============

    fn transaction(
        id: i64,
        savings_account_id: i64,
        transaction_type: SavingsTransactionType,
        amount: rust_decimal::Decimal,
    ) -> SavingsAccountTransaction {
        SavingsAccountTransaction {
            id,
            savings_account_id,
            transaction_type,
            amount,
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            is_reversed: false,
        }
    }

    fn create_test_account(id: i64, external_id: Option<&str>) -> SavingsAccount {
        let mut account = SavingsAccount::new(
            id,
            format!("SA-{:06}", id),
            DepositAccountType::SavingsDeposit,
            "USD",
        )
        .with_client(7)
        .with_group(3)
        .with_status(SavingsAccountStatus::Active);
        account.external_id = external_id.map(str::to_string);
        account.transactions = LazyCollection::Resolved(vec![
            transaction(id * 10, id, SavingsTransactionType::Deposit, dec!(100)),
            transaction(id * 10 + 1, id, SavingsTransactionType::Withdrawal, dec!(40)),
        ]);
        account.charges = LazyCollection::Resolved(vec![SavingsAccountCharge {
            id: id * 10,
            savings_account_id: id,
            name: "Monthly fee".to_string(),
            amount: dec!(2),
            amount_paid: dec!(0),
            due_date: None,
            is_active: true,
        }]);
        account
    }

    fn create_facade(
        accounts: Vec<SavingsAccount>,
    ) -> (SavingsAccountFacade, Arc<MockSavingsAccountRepository>) {
        let repository = Arc::new(MockSavingsAccountRepository::with_accounts(accounts));
        let facade = SavingsAccountFacade::with_default_exclusions(repository.clone());
        (facade, repository)
    }

    fn is_not_found(err: &Error, expected_id: i64) -> bool {
        matches!(err, Error::SavingsAccount(SavingsAccountError::NotFound(id)) if *id == expected_id)
    }

    // ============== Not-found detection ==============

    #[test]
    fn test_get_by_id_or_fail_missing_account_is_not_found() {
        let (facade, _) = create_facade(vec![create_test_account(1, None)]);
        let err = facade.get_by_id_or_fail(42).unwrap_err();
        assert!(is_not_found(&err, 42), "unexpected error: {:?}", err);
    }

    #[test]
    fn test_get_by_id_and_type_or_fail_missing_account_is_not_found() {
        let (facade, _) = create_facade(vec![]);
        let err = facade
            .get_by_id_and_type_or_fail(9, DepositAccountType::FixedDeposit)
            .unwrap_err();
        assert!(is_not_found(&err, 9));
    }

    #[test]
    fn test_get_by_id_and_type_or_fail_type_mismatch_is_not_found() {
        let (facade, _) = create_facade(vec![create_test_account(5, None)]);
        let err = facade
            .get_by_id_and_type_or_fail(5, DepositAccountType::RecurringDeposit)
            .unwrap_err();
        assert!(is_not_found(&err, 5));
    }

    #[test]
    fn test_store_failure_is_not_translated() {
        let (facade, repository) = create_facade(vec![create_test_account(1, None)]);
        repository.set_fail_on_find(true);

        let err = facade.get_by_id_or_fail(1).unwrap_err();
        assert!(matches!(
            err,
            Error::Database(DatabaseError::ConnectionFailed(_))
        ));
    }

    #[test]
    fn test_other_lookups_report_absence_without_failing() {
        let (facade, _) = create_facade(vec![]);
        assert!(facade.list_by_client(1).unwrap().is_empty());
        assert!(facade
            .list_by_status(SavingsAccountStatus::Active)
            .unwrap()
            .is_empty());
        assert!(facade.list_by_client_and_group(1, 2).unwrap().is_empty());
        assert!(facade.list_by_group(2).unwrap().is_empty());
        assert!(!facade.exists_open_account_for_client(1).unwrap());
        assert!(facade
            .find_open_by_account_number("SA-999999")
            .unwrap()
            .is_none());
    }

    // ============== Eager-load policy ==============

    #[test]
    fn test_get_by_id_or_fail_loads_non_excluded_account() {
        let stored = create_test_account(1, Some("0x0000000000000000000000000000000000000001"));
        let (facade, repository) = create_facade(vec![stored.clone()]);

        let account = facade.get_by_id_or_fail(1).unwrap();

        assert!(account.is_lazy_loaded());
        assert!(account.update_summary());
        assert_eq!(account.transactions, stored.transactions);
        assert_eq!(account.charges, stored.charges);
        assert_eq!(repository.collection_loads(), vec![1]);
    }

    #[test]
    fn test_get_by_id_or_fail_loads_account_without_external_id() {
        let (facade, _) = create_facade(vec![create_test_account(2, None)]);
        let account = facade.get_by_id_or_fail(2).unwrap();
        assert!(account.is_lazy_loaded());
        assert!(account.update_summary());
    }

    #[test]
    fn test_get_by_id_or_fail_skips_excluded_account() {
        let (facade, repository) = create_facade(vec![create_test_account(3, Some(REWARDS_ACCOUNT))]);

        let account = facade.get_by_id_or_fail(3).unwrap();

        assert!(!account.transactions.is_resolved());
        assert!(!account.charges.is_resolved());
        assert!(!account.update_summary());
        assert!(repository.collection_loads().is_empty());
    }

    #[test]
    fn test_get_by_id_or_fail_skips_every_builtin_exclusion() {
        let accounts: Vec<SavingsAccount> = DEFAULT_EAGER_LOAD_EXCLUSIONS
            .iter()
            .enumerate()
            .map(|(i, &external_id)| create_test_account(i as i64 + 1, Some(external_id)))
            .collect();
        let (facade, repository) = create_facade(accounts);

        for id in 1..=DEFAULT_EAGER_LOAD_EXCLUSIONS.len() as i64 {
            let account = facade.get_by_id_or_fail(id).unwrap();
            assert!(!account.is_lazy_loaded(), "account {} was loaded", id);
            assert!(!account.update_summary());
        }
        assert!(repository.collection_loads().is_empty());
    }

    #[test]
    fn test_injected_exclusions_replace_builtin_set() {
        let repository = Arc::new(MockSavingsAccountRepository::with_accounts(vec![
            create_test_account(1, Some("custom-service-account")),
            create_test_account(2, Some(REWARDS_ACCOUNT)),
        ]));
        let facade = SavingsAccountFacade::new(
            repository.clone(),
            EagerLoadExclusions::new(["custom-service-account"]),
        );

        assert!(!facade.get_by_id_or_fail(1).unwrap().is_lazy_loaded());
        assert!(facade.get_by_id_or_fail(2).unwrap().is_lazy_loaded());
        assert_eq!(repository.collection_loads(), vec![2]);
    }

    #[test]
    fn test_get_by_id_and_type_or_fail_ignores_exclusions() {
        let (facade, _) = create_facade(vec![create_test_account(4, Some(MARKETPLACE_ZIMBABWE))]);

        let account = facade
            .get_by_id_and_type_or_fail(4, DepositAccountType::SavingsDeposit)
            .unwrap();

        assert!(account.is_lazy_loaded());
        assert!(!account.update_summary());
    }

    #[test]
    fn test_load_failure_propagates_unchanged() {
        let (facade, repository) = create_facade(vec![create_test_account(1, None)]);
        repository.set_fail_on_load(true);

        let err = facade.get_by_id_or_fail(1).unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::QueryFailed(_))));
    }

    #[test]
    fn test_loaded_account_summary_can_be_recomputed() {
        let (facade, _) = create_facade(vec![create_test_account(1, None)]);
        let mut account = facade.get_by_id_or_fail(1).unwrap();

        assert!(account.recompute_summary());
        assert_eq!(account.summary.total_deposits, dec!(100));
        assert_eq!(account.summary.total_withdrawals, dec!(40));
        assert_eq!(account.summary.account_balance, dec!(60));
    }

    // ============== Bulk loading ==============

    #[test]
    fn test_list_by_client_loads_every_account_including_excluded() {
        let (facade, _) = create_facade(vec![
            create_test_account(1, Some(REWARDS_ACCOUNT)),
            create_test_account(2, None),
            create_test_account(3, Some(MARKETPLACE_ZIMBABWE)),
        ]);

        let accounts = facade.list_by_client(7).unwrap();

        assert_eq!(accounts.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert!(accounts.iter().all(SavingsAccount::is_lazy_loaded));
        assert!(accounts.iter().all(|a| !a.update_summary()));
    }

    #[test]
    fn test_list_by_status_loads_every_matching_account() {
        let closed = create_test_account(2, None).with_status(SavingsAccountStatus::Closed);
        let (facade, repository) = create_facade(vec![
            create_test_account(1, Some(REWARDS_ACCOUNT)),
            closed,
            create_test_account(3, None),
        ]);

        let accounts = facade.list_by_status(SavingsAccountStatus::Active).unwrap();

        assert_eq!(accounts.len(), 2);
        assert!(accounts.iter().all(SavingsAccount::is_lazy_loaded));
        assert_eq!(repository.collection_loads(), vec![1, 3]);
    }

    #[test]
    fn test_group_listings_return_root_entities_only() {
        let (facade, repository) = create_facade(vec![
            create_test_account(1, None),
            create_test_account(2, Some(REWARDS_ACCOUNT)).with_group(8),
        ]);

        let by_client_and_group = facade.list_by_client_and_group(7, 3).unwrap();
        let by_group = facade.list_by_group(8).unwrap();

        assert_eq!(by_client_and_group.len(), 1);
        assert_eq!(by_group.len(), 1);
        assert!(by_client_and_group
            .iter()
            .chain(by_group.iter())
            .all(|a| !a.transactions.is_resolved() && !a.charges.is_resolved()));
        assert!(repository.collection_loads().is_empty());
    }

    #[test]
    fn test_bulk_load_on_empty_slice_is_noop() {
        let (facade, repository) = create_facade(vec![]);
        let mut accounts: Vec<SavingsAccount> = Vec::new();

        facade.load_lazy_collections(&mut accounts).unwrap();

        assert!(accounts.is_empty());
        assert!(repository.collection_loads().is_empty());
    }

    #[test]
    fn test_bulk_load_leaves_resolved_collections_untouched() {
        let (facade, repository) = create_facade(vec![create_test_account(1, None)]);
        let mut accounts = vec![create_test_account(1, None)];
        accounts[0].transactions = LazyCollection::Resolved(Vec::new());

        facade.load_lazy_collections(&mut accounts).unwrap();

        assert_eq!(accounts[0].transactions, LazyCollection::Resolved(Vec::new()));
        assert!(repository.collection_loads().is_empty());
    }

    // ============== Pass-through lookups ==============

    #[test]
    fn test_exists_open_account_for_client_ignores_closed_accounts() {
        let (facade, _) = create_facade(vec![
            create_test_account(1, None).with_status(SavingsAccountStatus::Closed)
        ]);
        assert!(!facade.exists_open_account_for_client(7).unwrap());

        let (facade, _) = create_facade(vec![
            create_test_account(1, None).with_status(SavingsAccountStatus::TransferOnHold)
        ]);
        assert!(facade.exists_open_account_for_client(7).unwrap());
    }

    #[test]
    fn test_find_open_by_account_number() {
        let (facade, repository) = create_facade(vec![
            create_test_account(1, None),
            create_test_account(2, None).with_status(SavingsAccountStatus::Matured),
        ]);

        let found = facade
            .find_open_by_account_number("SA-000001")
            .unwrap()
            .expect("open account should be found");
        assert_eq!(found.id, 1);
        assert!(!found.is_lazy_loaded());

        assert!(facade
            .find_open_by_account_number("SA-000002")
            .unwrap()
            .is_none());
        assert!(repository.collection_loads().is_empty());
    }

    // ============== Writes ==============

    #[tokio::test]
    async fn test_save_and_delete_delegate_to_repository() {
        let (facade, repository) = create_facade(vec![]);
        let account = create_test_account(11, None);

        let saved = facade.save(account.clone()).await.unwrap();
        assert_eq!(saved, account);
        assert_eq!(facade.get_by_id_or_fail(11).unwrap().id, 11);

        facade.delete(&saved).await.unwrap();
        assert!(is_not_found(&facade.get_by_id_or_fail(11).unwrap_err(), 11));
        assert_eq!(*repository.flushes.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_and_flush_delegates_to_repository() {
        let (facade, repository) = create_facade(vec![]);

        facade
            .save_and_flush(create_test_account(12, None))
            .await
            .unwrap();

        assert_eq!(*repository.flushes.lock().unwrap(), 1);
        assert!(repository.stored(12).is_some());
    }
}
