pub mod completion;
pub mod db;
pub mod models;
pub mod parse;
pub mod planner;
pub mod prompts;
pub mod store;
