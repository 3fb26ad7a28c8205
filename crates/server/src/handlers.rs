pub mod actions;
pub mod cart;
pub mod health;
pub mod products;
