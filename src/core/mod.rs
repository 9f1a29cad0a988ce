pub mod account_manager;
pub mod services;
pub mod utils;

pub use account_manager::AccountManager;
