pub mod commands;
pub mod doctor;
pub mod error;
pub mod gateway;
pub mod paths;
pub mod profile;
pub mod store;
pub mod switcher;
pub mod ui;

#[cfg(test)]
pub mod test_utils;
