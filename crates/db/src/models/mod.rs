pub mod integration;
pub mod page;
pub mod sprint;
pub mod task;
pub mod user;
