//! Browser access: session lifecycle and the [`Page`] seam the engine drives
//!
//! - [`BrowserSession`]: launch or connect to Chrome, authenticate, open the entry page
//! - [`Page`]: operations the navigation and extraction steps need from a document
//! - [`ChromePage`]: `Page` over a live tab
//! - [`SnapshotPage`]: `Page` over captured HTML

pub mod chrome;
pub mod config;
pub mod page;
pub mod session;
pub mod snapshot;

pub use chrome::ChromePage;
pub use config::{ConnectionOptions, LaunchOptions};
pub use page::{DomEvent, ElementHandle, FrameHandle, NativeOption, Page, Scope};
pub use session::{BrowserSession, Credentials};
pub use snapshot::{PageAction, SnapshotPage};
