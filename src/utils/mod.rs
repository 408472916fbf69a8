pub mod bot_detector;
pub mod client_ip;
pub mod code_generator;
pub mod gate_token;
pub mod hashing;
pub mod password;
pub mod url_normalizer;
