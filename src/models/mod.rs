//! Data models for the library card server

pub mod card;

pub use card::{Card, CardCommand, CardRequest, CardType, NewCard};
