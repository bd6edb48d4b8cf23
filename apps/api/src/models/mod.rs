pub mod activity;
pub mod content;
