//! SQLite storage implementation for savings accounts.

mod model;
mod repository;

pub use model::{SavingsAccountChargeDB, SavingsAccountDB, SavingsAccountTransactionDB};
pub use repository::SavingsAccountRepository;
