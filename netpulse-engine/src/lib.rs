/*!
# Session Engine

Ties a packet source, the session store and the statistics together behind
[`SessionController`], the one object a front end talks to. Front ends poll
it for snapshots or incremental deltas and read [`StatusEvent`]s from its
channel; they never touch a source or the store directly.
*/

pub mod options;
pub mod report;
pub mod session;

pub use report::{render_report, report_file_name, write_report, ReportError};
pub use session::{
    CaptureMode, SessionController, SessionError, SessionPhase, SessionSnapshot, StatusEvent,
};
