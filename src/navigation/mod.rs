//! Per-style navigation: sidebar, product search, menus and colorway

pub mod colorway;
pub mod controller;
pub mod state;

pub use colorway::{ColorwayChoice, ColorwayOutcome, ColorwaySelector, PickerKind, SelectionMethod};
pub use controller::{NavigationController, StyleRun, settle_budget};
pub use state::{NavigationState, NavigationTrace, Stage};
