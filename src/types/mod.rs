// ABOUTME: Validated domain types for deployment targets.
// ABOUTME: Application names, namespaces and image references.

mod app_name;
mod image_ref;
mod label;
mod namespace;

pub use app_name::AppName;
pub use image_ref::{ImageRef, ParseImageRefError};
pub use label::{LabelError, MAX_LABEL_LEN};
pub use namespace::{DEFAULT_NAMESPACE, Namespace};
