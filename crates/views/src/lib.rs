//! Terminal-agnostic view state for the inventory dashboard: the paginated
//! table, grouping and filtering helpers, KPI cards and one view model per
//! screen.

pub mod filter;
pub mod group;
pub mod kpi;
pub mod load_state;
pub mod screens;
pub mod table;
pub mod viewport;

pub use filter::{Filter, InclusiveRange, TextQuery};
pub use group::{group_by_header, subtotal, Group, GroupedRecord};
pub use kpi::KpiCard;
pub use load_state::LoadState;
pub use table::{Action, Cell, ClickOutcome, RowKey, Table, TableBody, TableView};
pub use viewport::{LayoutMode, ViewportObserver, ViewportWatch};
