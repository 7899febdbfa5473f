pub mod admin_charge;
pub mod alert;
pub mod analytics;
pub mod employee;
pub mod expense;
pub mod goal;
pub mod package;
pub mod receipt;
pub mod role;
pub mod salary;
pub mod sale;
pub mod user;

// Re-export models for easier access
pub use admin_charge::*;
pub use alert::*;
pub use analytics::*;
pub use employee::*;
pub use expense::*;
pub use goal::*;
pub use package::*;
pub use receipt::*;
pub use role::*;
pub use salary::*;
pub use sale::*;
pub use user::*;
