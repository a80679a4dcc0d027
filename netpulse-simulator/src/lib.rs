/*!
# netpulse Simulator

Synthetic traffic for sessions without a capture backend, and for the sample
data a session can load on demand.

## Key Components:
- **Traffic profiles:** value pools for the continuous (`LIVE`) and sample (`SAMPLE`) traffic.
- **Generator:** seeded draws of well-formed packet records from a profile.
- **Anomaly injection:** oversized records, per-record or an exact count per batch.
- **Clocks:** wall-clock or virtual timestamps.
- **Simulator:** a [`PacketSource`](netpulse_capture::PacketSource) pacing records on the stop token.
*/

pub mod anomaly;
pub mod clock;
pub mod generator;
pub mod options;
pub mod profile;
pub mod sample;
pub mod simulator;

pub use clock::{Clock, SystemClock, VirtualClock};
pub use generator::TrafficGenerator;
pub use options::{SampleOptions, SimulatorOptions};
pub use profile::TrafficProfile;
pub use sample::generate_sample_batch;
pub use simulator::Simulator;
