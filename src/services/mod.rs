pub mod filter;
pub mod report;

pub use filter::{FilterError, FilterService, FilterSummary, FilteredLines, filter_lines};
pub use report::{ReportError, RunRecord, append_report, read_reports};
