use std::sync::Arc;

use tracing::{debug, trace};

use netpulse_capture::{PacketSource, SourceError};
use netpulse_core::{PacketRecord, StopToken};

use crate::anomaly;
use crate::clock::{Clock, SystemClock};
use crate::generator::TrafficGenerator;
use crate::options::SimulatorOptions;
use crate::profile::TrafficProfile;

/// Continuous simulated capture using the live profile.
///
/// Emits one record per `emit_interval`; the pause is a wait on the stop token,
/// so cancellation never has to sit out a full interval.
pub struct Simulator {
    generator: TrafficGenerator,
    options: SimulatorOptions,
    clock: Arc<dyn Clock>,
    emitted: u64,
}

impl Simulator {
    pub fn new(options: SimulatorOptions) -> Self {
        Self::with_clock(options, Arc::new(SystemClock))
    }

    pub fn with_clock(options: SimulatorOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            generator: TrafficGenerator::new(TrafficProfile::LIVE, options.seed),
            options,
            clock,
            emitted: 0,
        }
    }

    /// Records emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    fn next_record(&mut self) -> PacketRecord {
        let record = self.generator.next_record(self.clock.now_secs());
        anomaly::maybe_oversize(record, self.options.anomaly_rate, self.generator.rng())
    }
}

impl PacketSource for Simulator {
    fn name(&self) -> &'static str {
        "simulator"
    }

    fn is_live(&self) -> bool {
        false
    }

    fn run(
        &mut self,
        sink: &mut dyn FnMut(PacketRecord),
        stop: &StopToken,
    ) -> Result<(), SourceError> {
        debug!(
            interval_ms = self.options.emit_interval.as_millis() as u64,
            anomaly_rate = self.options.anomaly_rate,
            "Simulator running"
        );
        while !stop.is_cancelled() {
            let record = self.next_record();
            trace!(protocol = %record.protocol(), size = record.size(), "Simulated record");
            sink(record);
            self.emitted += 1;

            if stop.wait_timeout(self.options.emit_interval) {
                break;
            }
        }
        debug!(emitted = self.emitted, "Simulator stopped");
        Ok(())
    }
}
