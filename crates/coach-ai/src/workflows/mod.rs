pub mod clients;
pub mod diagnosis;
pub mod health;
pub mod quest;
