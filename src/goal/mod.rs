//! Savings goals and their progress.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_goal_endpoint, get_new_goal_page};
pub use db::{create_goal, create_goal_table, get_all_goals, get_goal, update_goal};
pub use delete::delete_goal_endpoint;
pub use domain::{Goal, GoalId, GoalName};
pub use edit::{get_edit_goal_page, update_goal_endpoint};
pub use list::get_goals_page;
