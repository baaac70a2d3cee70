//! Recurring transaction templates and the sync process that turns them into
//! concrete transactions.
//!
//! A template describes a repeating bill or income (e.g. rent on the 5th of
//! each month) without being a transaction itself. Syncing walks each active
//! template from the last occurrence it generated up to today and inserts one
//! transaction per elapsed period.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod materialize;
mod sync;

pub use create::{create_recurring_endpoint, get_new_recurring_page};
pub use db::{
    create_recurring_template_table, create_template, delete_template, get_active_templates,
    get_all_templates, get_template, record_materialized_through, update_template,
};
pub use delete::delete_recurring_endpoint;
pub use domain::{Frequency, RecurringTemplate, TemplateBuilder, TemplateId};
pub use edit::{get_edit_recurring_page, update_recurring_endpoint};
pub use list::get_recurring_page;
pub use materialize::{MaterializeOutcome, materialize_recurring_transactions};
pub use sync::sync_recurring_endpoint;
