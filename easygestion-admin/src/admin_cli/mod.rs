pub mod db_commands;
pub mod package_commands;
pub mod salary_commands;
pub mod user_commands;
pub mod utils;
