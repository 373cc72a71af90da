mod error;
mod selection;
mod view;

pub use error::LiveError;
pub use view::{LiveHandle, LiveStatus, LiveView, Shared};
