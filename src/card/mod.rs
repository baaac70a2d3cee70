//! Credit cards and their statements.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_card_endpoint, get_new_card_page};
pub use db::{create_card, create_card_table, get_all_cards, get_card, update_card};
pub use delete::delete_card_endpoint;
pub use domain::{Card, CardId, CardName, DayOfMonth, LastFour};
pub use edit::{get_edit_card_page, update_card_endpoint};
pub use list::get_cards_page;
