pub mod account;
pub mod commit;
pub mod config;
pub mod generate;
pub mod history;
pub mod repos;
