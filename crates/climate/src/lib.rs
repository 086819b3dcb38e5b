pub mod db;
pub mod routes;
pub mod startup;
pub mod templates;
pub mod utils;

pub use db::*;
pub use routes::*;
pub use startup::*;
pub use templates::*;
pub use utils::*;
