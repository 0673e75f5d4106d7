//! # plm-bom
//!
//! Browser-driven extraction of bill-of-materials (BOM) data from a frame-based
//! PLM web application, via Chrome DevTools Protocol (CDP).
//!
//! For each style identifier the engine walks the application's sidebar,
//! product search, menus and colorway picker, then reads the BOM table from
//! the content frame and groups its rows by body.
//!
//! ## Features
//!
//! - **Declarative locators**: every element the pipeline needs is found by an
//!   ordered list of [`LocatorStrategy`] values, tried in turn
//! - **Failure isolation**: one style's failure is recorded in its
//!   [`StyleOutcome`]; the rest of the batch carries on
//! - **Offline replay**: [`SnapshotPage`] runs the whole pipeline over saved
//!   HTML, which is how the test suite drives it
//! - **HTTP endpoint**: `POST /api/plm-automation` (requires `server` feature)
//!
//! ## Command line
//!
//! ```bash
//! # Extract BOMs for two styles
//! cargo run --bin plm-bom -- run 1K123456AA 1K654321BB --url plm.example.com/Windchill/rfa/jsp/main/Main.jsp
//!
//! # Serve the HTTP endpoint
//! cargo run --features server --bin plm-bom-server -- --url plm.example.com/Windchill/rfa/jsp/main/Main.jsp
//! ```
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use plm_bom::{EngineConfig, HostConfig, Credentials};
//!
//! let host = HostConfig::new("https://plm.example.com/Windchill/rfa/jsp/main/Main.jsp")
//!     .credentials(Credentials::new("buyer", "secret"));
//!
//! match plm_bom::host::run(&host, &EngineConfig::default(), &["1K123456AA"]) {
//!     Ok(report) => println!("{}", report.message),
//!     Err(failure) => eprintln!("{}: {}", failure.error, failure.details),
//! }
//! ```
//!
//! ### Replaying saved pages
//!
//! ```rust
//! use plm_bom::{BatchProcessor, EngineConfig, SnapshotPage};
//!
//! let page = SnapshotPage::with_frames([
//!     ("sidebarframe", "<a href=\"javascript:findProduct()\">Find</a>"),
//!     ("contentframe", "<input type=\"text\" name=\"LCSPRODUCT_ptc_str_1\">"),
//! ]);
//! let mut config = EngineConfig::default();
//! config.timing.reset_timeout_ms = 0;
//! config.timing.menu_timeout_ms = 0;
//!
//! let report = BatchProcessor::new(&page, &config).process(&["ABC123XX"]);
//! assert_eq!(report.results[0].search_key, "ABC123");
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: Browser session, the [`Page`] seam and its two implementations
//! - [`dom`]: Selector Resolver and Frame Locator
//! - [`navigation`]: Navigation Controller and Colorway Selector
//! - [`extract`]: BOM Table Extractor
//! - [`batch`]: Batch Processor and reports
//! - [`host`]: Browser setup and batch entry point
//! - [`config`]: Engine configuration
//! - [`error`]: Error types and result aliases
//! - `server`: HTTP endpoint (requires `server` feature)

pub mod batch;
pub mod browser;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod host;
pub mod navigation;

#[cfg(feature = "server")]
pub mod server;

pub use batch::{BatchProcessor, BatchReport, FailureKind, FailureReport, StyleOutcome, StyleRequest};
pub use browser::{BrowserSession, ChromePage, ConnectionOptions, Credentials, LaunchOptions, Page, Scope, SnapshotPage};
pub use config::EngineConfig;
pub use dom::{FrameMatcher, LocatorStrategy, TextMatch};
pub use error::{BrowserError, Result};
pub use extract::{BomExtractor, BomRow, ComponentGroup, ExtractionResult};
pub use host::HostConfig;
pub use navigation::{NavigationController, NavigationState};
