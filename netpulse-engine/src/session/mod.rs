mod controller;
mod error;
mod status;
mod worker;

pub use self::{
    controller::{CaptureMode, SessionController, SessionPhase, SessionSnapshot},
    error::SessionError,
    status::StatusEvent,
};

pub mod prelude {
    pub use super::{
        CaptureMode, SessionController, SessionError, SessionPhase, SessionSnapshot, StatusEvent,
    };
}
