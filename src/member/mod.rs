//! Family member management.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::{create_member_endpoint, get_new_member_page};
pub use db::{create_member, create_member_table, get_all_members, get_member, update_member};
pub use delete::delete_member_endpoint;
pub use domain::{Member, MemberId, MemberName};
pub use edit::{get_edit_member_page, update_member_endpoint};
pub use list::get_members_page;
