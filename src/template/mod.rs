pub mod handlers;
pub mod models;

#[cfg(test)]
mod mod_tests;
