//! Sticky-note task board.
//!
//! [`board::Board`] owns the notes and their stacking order and is the only
//! way to change them; [`storage`] keeps the board in a local key-value store;
//! [`tui`] draws it in the terminal and turns mouse drags into board calls.

pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod fields;
pub mod geometry;
pub mod logging;
pub mod stacking;
pub mod storage;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod layout;
    pub mod note_form;
    pub mod run;
}
