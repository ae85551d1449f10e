pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod telemetry;
pub mod tui;
pub mod view;

pub use models::{ApplicationStatus, JobApplication, WorkType};
pub use view::{compute_visible_applications, paginate, FilterCriteria, Page, SortDirection, SortKey};
