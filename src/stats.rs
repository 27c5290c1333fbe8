use std::time::Duration;

use crate::config::format_size;
use crate::producer::PoolReport;
use crate::scan::ScanSummary;

/// Statistics for one generate run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateStats {
    pub producers: usize,
    pub lines_written: u64,
    pub bytes_written: u64,
    pub final_file_size: u64,
    pub failed_producers: usize,
    pub interrupted: bool,
    pub processing_time: Duration,
}

impl GenerateStats {
    pub fn from_report(report: &PoolReport, bytes_written: u64, final_file_size: u64) -> Self {
        Self {
            producers: report.producers.len(),
            lines_written: report.total_lines(),
            bytes_written,
            final_file_size,
            failed_producers: report.failures().count(),
            interrupted: report.interrupted(),
            processing_time: report.elapsed,
        }
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Lines written: {} by {} producers, {} in {}ms",
            self.lines_written,
            self.producers,
            format_size(self.bytes_written),
            self.processing_time.as_millis()
        );

        push_rates(
            &mut output,
            self.lines_written,
            self.bytes_written,
            self.processing_time,
        );

        output.push_str(&format!("; final file size {}", format_size(self.final_file_size)));

        if self.failed_producers > 0 {
            output.push_str(&format!(", {} producers failed", self.failed_producers));
        }
        if self.interrupted {
            output.push_str(" (interrupted)");
        }

        output
    }
}

/// Statistics for one scan run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanStats {
    pub workers: usize,
    pub file_size: u64,
    pub bytes_read: u64,
    pub lines: u64,
    pub malformed: u64,
    pub failed_workers: usize,
    pub processing_time: Duration,
}

impl ScanStats {
    pub fn from_summary(summary: &ScanSummary) -> Self {
        Self {
            workers: summary.outcomes.len(),
            file_size: summary.file_size,
            bytes_read: summary.bytes_read(),
            lines: summary.lines(),
            malformed: summary.totals.malformed(),
            failed_workers: summary.failures().count(),
            processing_time: summary.elapsed,
        }
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Lines scanned: {} with {} workers over {} in {}ms",
            self.lines,
            self.workers,
            format_size(self.file_size),
            self.processing_time.as_millis()
        );

        push_rates(&mut output, self.lines, self.bytes_read, self.processing_time);

        if self.malformed > 0 {
            output.push_str(&format!(", {} malformed", self.malformed));
        }
        if self.failed_workers > 0 {
            output.push_str(&format!(
                ", {} of {} workers failed (partial result)",
                self.failed_workers, self.workers
            ));
        }

        output
    }
}

fn push_rates(output: &mut String, lines: u64, bytes: u64, elapsed: Duration) {
    let millis = elapsed.as_millis();
    if millis > 0 && lines > 0 {
        let secs = elapsed.as_secs_f64();
        output.push_str(&format!(
            " ({:.0} lines/s, {:.1} MB/s)",
            lines as f64 / secs,
            bytes as f64 / secs / (1024.0 * 1024.0)
        ));
    }
}
