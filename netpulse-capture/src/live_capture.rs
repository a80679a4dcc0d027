//! Live capture from a network interface.
//!
//! Built on pcap when the `live-capture` feature is enabled. Without it,
//! [`LiveCapture::open`] always reports the backend as unavailable, which the
//! session layer treats as "fall back to the simulator".

use crate::source::SourceError;

/// Parameters for opening a live capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveCaptureOptions {
    /// Interface name; `any` captures on every interface (Linux).
    pub interface: String,
    pub promiscuous: bool,
    /// Bytes kept per frame.
    pub snaplen: i32,
    /// Kernel buffer size in bytes.
    pub buffer_size: i32,
    /// How long a read may block before the stop token is checked again.
    pub read_timeout_ms: i32,
}

impl Default for LiveCaptureOptions {
    fn default() -> Self {
        Self {
            interface: "any".into(),
            promiscuous: true,
            snaplen: 65535,
            buffer_size: 1 << 20,
            read_timeout_ms: 250,
        }
    }
}

#[cfg(feature = "live-capture")]
mod pcap_backend {
    use pcap::{Active, Capture, Device, Linktype};
    use tracing::{debug, info, trace, warn};

    use netpulse_core::{PacketRecord, StopToken};
    use netpulse_protocols::{FrameDecoder, LinkKind};

    use super::LiveCaptureOptions;
    use crate::source::{PacketSource, SourceError};

    fn backend_error(err: pcap::Error) -> SourceError {
        SourceError::BackendUnavailable(err.to_string())
    }

    /// A pcap capture handle plus the decoder for its link type.
    pub struct LiveCapture {
        capture: Capture<Active>,
        decoder: FrameDecoder,
        interface: String,
        skipped_frames: u64,
    }

    impl LiveCapture {
        /// Opens `options.interface`.
        ///
        /// Failing to enumerate devices or to activate the handle (missing
        /// privileges, missing library) is reported as
        /// [`SourceError::BackendUnavailable`].
        pub fn open(options: &LiveCaptureOptions) -> Result<Self, SourceError> {
            let device = Device::list()
                .map_err(backend_error)?
                .into_iter()
                .find(|d| d.name == options.interface)
                .ok_or_else(|| SourceError::DeviceNotFound(options.interface.clone()))?;

            let capture = Capture::from_device(device)
                .map_err(backend_error)?
                .promisc(options.promiscuous)
                .snaplen(options.snaplen)
                .buffer_size(options.buffer_size)
                .timeout(options.read_timeout_ms)
                .open()
                .map_err(backend_error)?;

            let Linktype(dlt) = capture.get_datalink();
            let link = LinkKind::from_dlt(dlt).unwrap_or_else(|| {
                warn!(dlt, "Unsupported link type, decoding frames as Ethernet");
                LinkKind::Ethernet
            });
            info!(interface = %options.interface, ?link, "Opened live capture");

            Ok(Self {
                capture,
                decoder: FrameDecoder::new(link),
                interface: options.interface.clone(),
                skipped_frames: 0,
            })
        }

        /// Frames dropped because they could not be decoded.
        pub fn skipped_frames(&self) -> u64 {
            self.skipped_frames
        }
    }

    impl PacketSource for LiveCapture {
        fn name(&self) -> &'static str {
            "pcap"
        }

        fn is_live(&self) -> bool {
            true
        }

        fn run(
            &mut self,
            sink: &mut dyn FnMut(PacketRecord),
            stop: &StopToken,
        ) -> Result<(), SourceError> {
            while !stop.is_cancelled() {
                match self.capture.next_packet() {
                    Ok(packet) => {
                        let header = *packet.header;
                        let timestamp =
                            header.ts.tv_sec as f64 + header.ts.tv_usec as f64 / 1_000_000.0;
                        match self.decoder.decode(packet.data, header.len, timestamp) {
                            Ok(record) => sink(record),
                            Err(e) => {
                                self.skipped_frames += 1;
                                trace!("Skipping undecodable frame: {e}");
                            }
                        }
                    }
                    Err(pcap::Error::TimeoutExpired) => {
                        // No packet in this timeout window; re-check the stop token.
                        continue;
                    }
                    Err(e) => {
                        warn!(interface = %self.interface, "Live capture failed: {e}");
                        return Err(SourceError::Capture(e.to_string()));
                    }
                }
            }
            debug!(
                interface = %self.interface,
                skipped = self.skipped_frames,
                "Live capture stopped"
            );
            Ok(())
        }
    }
}

#[cfg(feature = "live-capture")]
pub use pcap_backend::LiveCapture;

#[cfg(not(feature = "live-capture"))]
mod unavailable {
    use std::convert::Infallible;

    use netpulse_core::{PacketRecord, StopToken};

    use super::LiveCaptureOptions;
    use crate::source::{PacketSource, SourceError};

    /// Placeholder for builds without libpcap; it can never be constructed.
    pub struct LiveCapture {
        never: Infallible,
    }

    impl LiveCapture {
        pub fn open(_options: &LiveCaptureOptions) -> Result<Self, SourceError> {
            Err(SourceError::BackendUnavailable(
                "built without the live-capture feature".into(),
            ))
        }

        pub fn skipped_frames(&self) -> u64 {
            match self.never {}
        }
    }

    impl PacketSource for LiveCapture {
        fn name(&self) -> &'static str {
            "pcap"
        }

        fn is_live(&self) -> bool {
            true
        }

        fn run(
            &mut self,
            _sink: &mut dyn FnMut(PacketRecord),
            _stop: &StopToken,
        ) -> Result<(), SourceError> {
            match self.never {}
        }
    }
}

#[cfg(not(feature = "live-capture"))]
pub use unavailable::LiveCapture;

/// Whether this build can capture real traffic at all.
pub const fn backend_compiled() -> bool {
    cfg!(feature = "live-capture")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_capture_everything() {
        let options = LiveCaptureOptions::default();
        assert_eq!(options.interface, "any");
        assert!(options.promiscuous);
        assert!(options.read_timeout_ms > 0);
    }

    #[cfg(not(feature = "live-capture"))]
    #[test]
    fn open_without_backend_reports_unavailable() {
        assert!(!backend_compiled());
        let result = LiveCapture::open(&LiveCaptureOptions::default());
        assert!(matches!(result, Err(SourceError::BackendUnavailable(_))));
    }
}
