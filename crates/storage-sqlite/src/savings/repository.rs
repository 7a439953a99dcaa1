use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use savings_core::savings::{
    DepositAccountType, SavingsAccount, SavingsAccountCharge, SavingsAccountCollectionLoader,
    SavingsAccountRepositoryTrait, SavingsAccountStatus, SavingsAccountTransaction,
};
use savings_core::Result;

use super::model::{SavingsAccountChargeDB, SavingsAccountDB, SavingsAccountTransactionDB};
use crate::db::{checkpoint, get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{savings_account_charges, savings_account_transactions, savings_accounts};

fn open_status_codes() -> Vec<i32> {
    SavingsAccountStatus::OPEN
        .into_iter()
        .map(SavingsAccountStatus::code)
        .collect()
}

fn into_accounts(rows: Vec<SavingsAccountDB>) -> Result<Vec<SavingsAccount>> {
    rows.into_iter().map(SavingsAccount::try_from).collect()
}

/// Upserts the root row and rewrites every resolved collection.
/// Unresolved collections keep whatever rows they already have.
fn write_account(conn: &mut SqliteConnection, account: &SavingsAccount) -> Result<()> {
    let row = SavingsAccountDB::from(account);
    diesel::insert_into(savings_accounts::table)
        .values(&row)
        .on_conflict(savings_accounts::id)
        .do_update()
        .set(&row)
        .execute(conn)
        .map_err(StorageError::from)?;

    if let Some(transactions) = account.transactions.as_slice() {
        diesel::delete(
            savings_account_transactions::table
                .filter(savings_account_transactions::savings_account_id.eq(account.id)),
        )
        .execute(conn)
        .map_err(StorageError::from)?;

        let rows: Vec<SavingsAccountTransactionDB> = transactions
            .iter()
            .map(|t| SavingsAccountTransactionDB::for_account(account.id, t))
            .collect();
        if !rows.is_empty() {
            diesel::insert_into(savings_account_transactions::table)
                .values(&rows)
                .execute(conn)
                .map_err(StorageError::from)?;
        }
    }

    if let Some(charges) = account.charges.as_slice() {
        diesel::delete(
            savings_account_charges::table
                .filter(savings_account_charges::savings_account_id.eq(account.id)),
        )
        .execute(conn)
        .map_err(StorageError::from)?;

        let rows: Vec<SavingsAccountChargeDB> = charges
            .iter()
            .map(|c| SavingsAccountChargeDB::for_account(account.id, c))
            .collect();
        if !rows.is_empty() {
            diesel::insert_into(savings_account_charges::table)
                .values(&rows)
                .execute(conn)
                .map_err(StorageError::from)?;
        }
    }

    Ok(())
}

pub struct SavingsAccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SavingsAccountRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SavingsAccountRepository { pool, writer }
    }
}

impl SavingsAccountCollectionLoader for SavingsAccountRepository {
    fn load_transactions(&self, savings_account_id: i64) -> Result<Vec<SavingsAccountTransaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = savings_account_transactions::table
            .filter(savings_account_transactions::savings_account_id.eq(savings_account_id))
            .order((
                savings_account_transactions::transaction_date.asc(),
                savings_account_transactions::id.asc(),
            ))
            .select(SavingsAccountTransactionDB::as_select())
            .load::<SavingsAccountTransactionDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(SavingsAccountTransaction::try_from)
            .collect()
    }

    fn load_charges(&self, savings_account_id: i64) -> Result<Vec<SavingsAccountCharge>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = savings_account_charges::table
            .filter(savings_account_charges::savings_account_id.eq(savings_account_id))
            .order(savings_account_charges::id.asc())
            .select(SavingsAccountChargeDB::as_select())
            .load::<SavingsAccountChargeDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(SavingsAccountCharge::try_from).collect()
    }
}

#[async_trait]
impl SavingsAccountRepositoryTrait for SavingsAccountRepository {
    fn find_by_id(&self, savings_account_id: i64) -> Result<Option<SavingsAccount>> {
        let mut conn = get_connection(&self.pool)?;
        savings_accounts::table
            .find(savings_account_id)
            .select(SavingsAccountDB::as_select())
            .first::<SavingsAccountDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(SavingsAccount::try_from)
            .transpose()
    }

    fn find_by_id_and_deposit_account_type(
        &self,
        savings_account_id: i64,
        deposit_account_type: DepositAccountType,
    ) -> Result<Option<SavingsAccount>> {
        let mut conn = get_connection(&self.pool)?;
        savings_accounts::table
            .filter(savings_accounts::id.eq(savings_account_id))
            .filter(savings_accounts::deposit_account_type.eq(deposit_account_type.code()))
            .select(SavingsAccountDB::as_select())
            .first::<SavingsAccountDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(SavingsAccount::try_from)
            .transpose()
    }

    fn find_by_client_id(&self, client_id: i64) -> Result<Vec<SavingsAccount>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = savings_accounts::table
            .filter(savings_accounts::client_id.eq(client_id))
            .order(savings_accounts::id.asc())
            .select(SavingsAccountDB::as_select())
            .load::<SavingsAccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        into_accounts(rows)
    }

    fn find_by_status(&self, status: SavingsAccountStatus) -> Result<Vec<SavingsAccount>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = savings_accounts::table
            .filter(savings_accounts::status.eq(status.code()))
            .order(savings_accounts::id.asc())
            .select(SavingsAccountDB::as_select())
            .load::<SavingsAccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        into_accounts(rows)
    }

    fn find_by_client_id_and_group_id(
        &self,
        client_id: i64,
        group_id: i64,
    ) -> Result<Vec<SavingsAccount>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = savings_accounts::table
            .filter(savings_accounts::client_id.eq(client_id))
            .filter(savings_accounts::group_id.eq(group_id))
            .order(savings_accounts::id.asc())
            .select(SavingsAccountDB::as_select())
            .load::<SavingsAccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        into_accounts(rows)
    }

    fn find_by_group_id(&self, group_id: i64) -> Result<Vec<SavingsAccount>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = savings_accounts::table
            .filter(savings_accounts::group_id.eq(group_id))
            .order(savings_accounts::id.asc())
            .select(SavingsAccountDB::as_select())
            .load::<SavingsAccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        into_accounts(rows)
    }

    fn has_open_accounts_for_client(&self, client_id: i64) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let found = diesel::select(exists(
            savings_accounts::table
                .filter(savings_accounts::client_id.eq(client_id))
                .filter(savings_accounts::status.eq_any(open_status_codes())),
        ))
        .get_result::<bool>(&mut conn)
        .map_err(StorageError::from)?;
        Ok(found)
    }

    fn find_open_by_account_number(&self, account_number: &str) -> Result<Option<SavingsAccount>> {
        let mut conn = get_connection(&self.pool)?;
        savings_accounts::table
            .filter(savings_accounts::account_number.eq(account_number))
            .filter(savings_accounts::status.eq_any(open_status_codes()))
            .select(SavingsAccountDB::as_select())
            .first::<SavingsAccountDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(SavingsAccount::try_from)
            .transpose()
    }

    async fn save(&self, mut account: SavingsAccount) -> Result<SavingsAccount> {
        if account.recompute_summary() {
            debug!("Recomputed summary of savings account {}", account.id);
        }
        account.updated_at = chrono::Utc::now().naive_utc();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<SavingsAccount> {
                write_account(conn, &account)?;
                Ok(account)
            })
            .await
    }

    async fn save_and_flush(&self, account: SavingsAccount) -> Result<SavingsAccount> {
        let saved = self.save(account).await?;
        let mut conn = get_connection(&self.pool)?;
        checkpoint(&mut conn)?;
        Ok(saved)
    }

    async fn delete(&self, account: &SavingsAccount) -> Result<()> {
        let savings_account_id = account.id;
        let deleted = self
            .writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(
                    diesel::delete(savings_accounts::table.find(savings_account_id))
                        .execute(conn)
                        .map_err(StorageError::from)?,
                )
            })
            .await?;
        debug!(
            "Deleted {} savings account row(s) for id {}",
            deleted, savings_account_id
        );
        Ok(())
    }
}
