//! Element and frame location
//!
//! - [`LocatorStrategy`]: one declarative way to find an element
//! - [`resolve`]: first hit over an ordered strategy list
//! - [`locate_frame`]: bounded wait for a named sub-document

pub mod frame;
pub mod locator;
pub mod resolver;

pub use frame::{FrameMatcher, locate_frame};
pub use locator::{AttributeMatch, LocatorStrategy, TextMatch};
pub use resolver::{Resolved, require, resolve, resolve_by_visible_text, resolve_within, wait_until};
