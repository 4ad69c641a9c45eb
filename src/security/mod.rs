mod sanitize;
mod system;
mod token;

pub use sanitize::{Sanitizer, DEFAULT_MAX_LENGTH};
pub use system::SystemHelper;
pub use token::{Claims, TokenValidator};
