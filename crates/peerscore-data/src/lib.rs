#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/peerscore/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod frame;
pub mod loader;
pub mod panel;
pub mod sector;

pub use error::{DataError, Result};
pub use frame::{f64_values, i32_values, row_order};
pub use loader::{
    PanelColumns, RowPolicy, attach_start_years, load_panel, load_start_years, panel_from_frame,
};
pub use panel::{CompanyId, PanelRecord, SizeTier};
pub use sector::{IsicSection, Sector};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
