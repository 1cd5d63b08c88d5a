pub mod config_cmd;
pub mod output;
pub mod usage_cmd;
