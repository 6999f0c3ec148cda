pub mod checker;
pub mod confirmer;
pub mod events;
