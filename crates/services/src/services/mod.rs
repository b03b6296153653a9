pub mod board;
pub mod classify;
pub mod dashboard;
pub mod git_hosting;
pub mod report;
