pub mod config;
pub mod indices;
pub mod run;
