pub mod entities;
pub mod listener;
