//! Focus and d-pad navigation engine for a TV media client, including the
//! carousel positioning rules that keep the selected card on screen.

pub mod carousel;
pub mod context;
pub mod data_source;
pub mod demo;
pub mod dpad;
pub mod engine;
pub mod focus_manager;
pub mod focus_state;
pub mod gamepad;
pub mod input;
pub mod messages;
pub mod model;
pub mod navigation;
pub mod positioning;
pub mod route;
pub mod screens;
pub mod scroll_driver;
pub mod scroll_positions;
pub mod storage;

pub use engine::{FocusEngine, KeyOutcome};
pub use focus_state::FocusState;
pub use input::{Key, KeyEvent, KeyPhase};
pub use storage::EngineConfig;
