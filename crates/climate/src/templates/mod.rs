pub mod layouts;
pub mod pages;

pub use layouts::{base, PageConfig};
pub use pages::{index_page, ROUTES};
