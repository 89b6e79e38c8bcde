//! Kanban board backend: task CRUD with assignee resolution, status
//! grouping, and the client-side board session state.

pub mod actions;
pub mod app_state;
pub mod board;
pub mod board_session;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod routes;
pub mod task;
pub mod team;
