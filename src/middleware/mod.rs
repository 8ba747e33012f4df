// Middleware modules
pub mod logging;

// Export logging middleware and the request correlation id it attaches
pub use logging::{logging_middleware, RequestId};
