pub mod prune;
pub mod resave;
pub mod show;
