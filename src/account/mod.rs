//! Bank accounts and their balances.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_account_endpoint, get_new_account_page};
pub use db::{
    create_account, create_account_table, delete_account, get_account, get_all_accounts,
    update_account,
};
pub use delete::delete_account_endpoint;
pub use domain::{Account, AccountId, AccountName};
pub use edit::{get_edit_account_page, update_account_endpoint};
pub use list::get_accounts_page;
