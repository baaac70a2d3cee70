//! Transaction management for the family ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Date ranges and filters for narrowing down which transactions a page shows
//! - View handlers for transaction-related web pages

mod core;
mod create;
mod delete;
mod edit;
mod filter;
mod form;
mod query;
pub(crate) mod range;
mod transactions_page;

pub use core::{
    Installments, Transaction, TransactionBuilder, TransactionId, TransactionKind,
    TransactionStatus,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use filter::{KindFilter, TransactionFilter};
pub use query::{
    create_transaction, create_transaction_table, delete_transaction, get_all_transactions,
    get_transaction, get_transactions_between, update_transaction,
};
pub(crate) use query::check_category_kind;
pub use range::{DateRange, QuickRange};
pub use transactions_page::get_transactions_page;
