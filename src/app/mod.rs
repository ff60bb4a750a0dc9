pub mod context;
pub mod handlers;

pub use context::AppContext;
