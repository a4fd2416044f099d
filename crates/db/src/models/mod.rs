pub mod api_key;
pub mod security_event;
