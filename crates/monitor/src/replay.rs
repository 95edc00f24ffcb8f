//! Replay of recorded detector output (JSON Lines, one frame per line)

use alerting::{AlertActuator, AlertCommand};
use dms::DetectionFrame;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::info;

use crate::session::{FrameReport, MonitorSession};
use crate::MonitorError;

/// Totals for one replay run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: usize,
    /// Lines that could not be parsed as a frame
    pub failed: usize,
    pub starts: usize,
    pub stops: usize,
}

/// Feed every frame from `reader` through `session`, calling `on_report` per frame.
///
/// Malformed lines are reported as detection failures and skipped.
pub async fn replay<R, A, F>(
    session: &mut MonitorSession<A>,
    reader: R,
    mut on_report: F,
) -> Result<ReplaySummary, MonitorError>
where
    R: AsyncBufRead + Unpin,
    A: AlertActuator,
    F: FnMut(&FrameReport) -> Result<(), MonitorError>,
{
    let mut summary = ReplaySummary::default();
    let mut lines = reader.lines();
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let frame: DetectionFrame = match serde_json::from_str(line) {
            Ok(frame) => frame,
            Err(e) => {
                summary.failed += 1;
                session.report_detection_failure(line_no, e);
                continue;
            }
        };

        let report = session.process_frame(&frame);
        summary.frames += 1;
        match report.command {
            AlertCommand::Start => summary.starts += 1,
            AlertCommand::Stop => summary.stops += 1,
            AlertCommand::None => {}
        }
        on_report(&report)?;
    }

    info!(
        "Replay finished: {} frames, {} failed, {} alerts",
        summary.frames, summary.failed, summary.starts
    );
    Ok(summary)
}
