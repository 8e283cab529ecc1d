pub mod health;
pub mod meetings;
pub mod root;
pub mod templates;
