//! ## netpulse-cli::view
//! **Terminal rendering of a session**
//!
//! Every `render_*` function is pure and returns the text to print; the
//! [`LiveView`] decides what is due on each refresh tick.

use std::fmt::{Display, Write};

use chrono::{Local, TimeZone};
use crossbeam::channel::Receiver;
use tokio::time::{Duration, Instant};

use netpulse_config::DisplayConfig;
use netpulse_core::{PacketRecord, StoreCursor, StoreDelta};
use netpulse_engine::{SessionController, StatusEvent};
use netpulse_stats::{format_packet_info, record_time, StatValue, TimeBucket, TrafficSummary};

const PACKET_HEADER: &str = "No.\tTime\tSource\tDestination\tProtocol\tLength\tInfo";
const BAR_WIDTH: usize = 40;

/// Packet rows numbered from `first_number`, with the column header.
pub fn render_rows<Tz>(records: &[PacketRecord], first_number: usize, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();
    if records.is_empty() {
        return out;
    }
    out.push_str(PACKET_HEADER);
    out.push('\n');
    for (offset, record) in records.iter().enumerate() {
        let time = record_time(record.timestamp(), tz)
            .map(|t| t.format("%H:%M:%S%.3f").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}\t{time}\t{}\t{}\t{}\t{}\t{}",
            first_number + offset,
            record.source_label(),
            record.dest_label(),
            record.protocol(),
            record.size(),
            format_packet_info(record),
        );
    }
    out
}

/// The statistics dump under a `Statistics` heading.
pub fn render_summary(summary: &TrafficSummary) -> String {
    let mut out = String::from("Statistics\n----------\n");
    for entry in summary.entries() {
        match entry.value {
            StatValue::Text(value) => {
                let _ = writeln!(out, "{}: {value}", entry.label);
            }
            StatValue::Nested(items) => {
                let _ = writeln!(out, "{}:", entry.label);
                for (key, value) in items {
                    let _ = writeln!(out, "  {key}: {value}");
                }
            }
        }
    }
    out
}

/// Horizontal bar chart of packets per bucket, scaled to the busiest one.
pub fn render_timeline<Tz>(buckets: &[TimeBucket], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::from("Traffic Timeline\n----------------\n");
    let peak = buckets.iter().map(|b| b.packets).max().unwrap_or(0);
    if peak == 0 {
        out.push_str("(no traffic)\n");
        return out;
    }
    for bucket in buckets {
        let label = tz
            .timestamp_opt(bucket.start, 0)
            .single()
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| bucket.start.to_string());
        let filled = (bucket.packets * BAR_WIDTH).div_ceil(peak);
        let _ = writeln!(
            out,
            "{label} {:<width$} {} pkts, {} bytes",
            "#".repeat(filled),
            bucket.packets,
            bucket.bytes,
            width = BAR_WIDTH,
        );
    }
    out
}

/// Incremental terminal view of a running session.
pub struct LiveView {
    display: DisplayConfig,
    cursor: StoreCursor,
    chart_due: Instant,
}

impl LiveView {
    pub fn new(display: DisplayConfig, cursor: StoreCursor) -> Self {
        let chart_due = Instant::now() + Duration::from_millis(display.chart_interval_ms);
        Self {
            display,
            cursor,
            chart_due,
        }
    }

    /// Prints pending status events. Returns `true` once the capture stopped.
    pub fn drain_events(&self, events: &Receiver<StatusEvent>) -> bool {
        let mut stopped = false;
        for event in events.try_iter() {
            match &event {
                StatusEvent::Error(_) | StatusEvent::BackendUnavailable(_) => eprintln!("{event}"),
                _ => println!("{event}"),
            }
            stopped |= event == StatusEvent::CaptureStopped;
        }
        stopped
    }

    /// Renders the rows of `delta` and advances the view past it.
    ///
    /// Rows are numbered by their sequence in the store, so numbering only
    /// restarts when the session is cleared or replaced. Records evicted
    /// before they could be shown are counted, not silently skipped.
    pub fn apply<Tz>(&mut self, delta: &StoreDelta, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let mut out = String::new();
        let previous = std::mem::replace(&mut self.cursor, delta.cursor);
        let first_seq = delta
            .cursor
            .sequence()
            .saturating_sub(delta.records.len() as u64);

        if delta.cursor.epoch() != previous.epoch() {
            out.push_str("-- view reset --\n");
        } else if first_seq > previous.sequence() {
            let _ = writeln!(
                out,
                "... {} packets dropped by retention",
                first_seq - previous.sequence()
            );
        }

        let skip = delta.records.len().saturating_sub(self.display.packet_rows);
        if skip > 0 {
            let _ = writeln!(out, "... {skip} more packets");
        }
        let first_number = first_seq as usize + skip + 1;
        out.push_str(&render_rows(&delta.records[skip..], first_number, tz));
        out
    }

    /// Prints packets appended since the last refresh (at most
    /// `packet_rows` of the newest), plus the statistics and timeline when
    /// the chart interval elapsed.
    pub fn refresh(&mut self, session: &SessionController) {
        let delta = session.read_since(self.cursor);
        print!("{}", self.apply(&delta, &Local));

        let now = Instant::now();
        if now >= self.chart_due {
            self.chart_due = now + Duration::from_millis(self.display.chart_interval_ms);
            self.print_charts(session);
        }
    }

    pub fn print_charts(&self, session: &SessionController) {
        let snapshot = session.snapshot();
        println!();
        print!("{}", render_summary(&snapshot.summary));
        println!();
        print!(
            "{}",
            render_timeline(&session.timeline(self.display.timeline_bucket_secs), &Local)
        );
        println!();
    }
}
