pub mod api_keys;
pub mod external;
pub mod security;
