#![doc = "The `tasklists` library crate."]
#![doc = ""]
#![doc = "A multi-user task list web application: accounts, named lists, and tasks"]
#![doc = "within those lists, behind a session gate and rendered as HTML pages."]
#![doc = "The binary (`main.rs`) reads the configuration, opens the database and"]
#![doc = "serves the routes declared here."]

pub mod auth;
pub mod config;
pub mod csrf;
pub mod db;
pub mod error;
pub mod flash;
pub mod forms;
pub mod models;
pub mod routes;
pub mod state;
pub mod views;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
