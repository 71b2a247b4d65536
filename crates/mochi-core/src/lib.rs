pub mod audio;
pub mod beat;
pub mod boot;
pub mod chat;
pub mod constants;
pub mod dance;
pub mod director;
pub mod face;
pub mod mood;
pub mod motion;
pub mod render;
pub mod sim;
pub mod spring;
pub mod state;
pub mod targets;

pub use audio::*;
pub use beat::*;
pub use boot::*;
pub use chat::*;
pub use dance::*;
pub use director::*;
pub use face::*;
pub use mood::*;
pub use motion::*;
pub use render::*;
pub use sim::*;
pub use spring::*;
pub use state::*;
pub use targets::*;
