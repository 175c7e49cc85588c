pub mod discover;
pub mod list;
pub mod run;
pub mod settings;
