pub mod compare;
pub mod production;
pub mod sales;
