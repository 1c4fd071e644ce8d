pub mod api;
pub mod backend;
pub mod error;
pub mod refresh;

pub use api::{ApiClient, HealthStatus};
pub use backend::Backend;
pub use error::ApiError;
pub use refresh::{Fence, RefreshBus, RefreshSubscription, Ticket};
