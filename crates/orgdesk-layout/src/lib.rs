//! Department layout for OrgDesk
//!
//! Per-department lists of stat cards, features and tools with drag-and-drop
//! reordering, plus per-organization UI customization.

pub mod consistency;
pub mod customization;
pub mod error;
pub mod models;
pub mod reorder;
pub mod service;
pub mod storage;

pub use consistency::{ConsistencyMode, OptimisticList};
pub use customization::{
    Branding, CustomizationUpdate, DashboardText, OrganizationUiCustomization, Vertical,
};
pub use error::{Error, Result};
pub use models::{ItemDetails, ItemUpdate, NewItem, SectionItem, SectionKind};
pub use reorder::{changed_positions, normalize, reorder, Orderable};
pub use service::LayoutService;
pub use storage::{FileLayoutStore, InMemoryLayoutStore, LayoutStore, LayoutTables, SectionKey};
