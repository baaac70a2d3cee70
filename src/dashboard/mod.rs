//! The dashboard page.
//!
//! Provides an overview of the family's finances for a filtered window:
//! headline stats, monthly cash flow, spending by category and the
//! per-category breakdown. The window defaults to the current month.

mod aggregation;
mod cards;
mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
