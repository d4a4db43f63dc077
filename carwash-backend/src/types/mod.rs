pub mod date_key;
pub mod response;

pub use date_key::DateKey;
pub use response::ApiResponse;
