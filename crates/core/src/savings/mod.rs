//! Savings accounts module - domain models, repository access façade and traits.

mod savings_config;
mod savings_constants;
mod savings_errors;
mod savings_facade;
mod savings_model;
mod savings_traits;


// Re-export the public interface
pub use savings_config::EagerLoadExclusions;
pub use savings_constants::*;
pub use savings_errors::SavingsAccountError;
pub use savings_facade::SavingsAccountFacade;
pub use savings_model::{
    DepositAccountType, LazyCollection, SavingsAccount, SavingsAccountCharge,
    SavingsAccountStatus, SavingsAccountSummary, SavingsAccountTransaction,
    SavingsTransactionType,
};
pub use savings_traits::{
    SavingsAccountCollectionLoader, SavingsAccountFacadeTrait, SavingsAccountRepositoryTrait,
};
