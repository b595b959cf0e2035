pub mod capture;
pub mod cards;
pub mod config;
pub mod decision;
pub mod display;
pub mod equity;
pub mod error;
pub mod exec;
pub mod game;
pub mod odds;
pub mod stdio;
pub mod store;
pub mod talk;
pub mod tools;
pub mod voice;
pub mod web;

pub use config::SeatConfig;
pub use error::{SeatError, SeatResult};
pub use store::{PlayerSetup, SessionStore, StateUpdate};
pub use tools::{Tool, ToolBox, ToolRequest, ToolResponse};
