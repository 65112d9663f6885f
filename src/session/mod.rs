pub mod clock;
pub mod controller;
pub mod conversation;
pub mod events;
pub mod language;

#[cfg(test)]
pub(crate) mod tests;
