use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::models::error::SinkError;
use crate::models::session_report::SessionReport;

/// Append a session report as one JSON line.
pub fn append_report(report: &SessionReport, path: &Path) -> Result<(), SinkError> {
    let mut line = serde_json::to_string(report)
        .map_err(|e| SinkError::Write(format!("failed to serialize report: {}", e)))?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| SinkError::Open(format!("{}: {}", path.display(), e)))?;
    file.write_all(line.as_bytes())
        .map_err(|e| SinkError::Write(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

/// Read every report from a JSON-lines report log, oldest first.
pub fn read_reports(path: &Path) -> Result<Vec<SessionReport>, SinkError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| SinkError::Open(format!("{}: {}", path.display(), e)))?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line)
                .map_err(|e| SinkError::Write(format!("failed to parse report: {}", e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session_report::SessionOutcome;

    #[test]
    fn reports_accumulate_as_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");

        let mut first = SessionReport::begin("s", "b");
        first.finish(SessionOutcome::Stopped, "00".into());
        let mut second = SessionReport::begin("s", "b");
        second.finish(SessionOutcome::Failed("denied".into()), "11".into());

        append_report(&first, &path).unwrap();
        append_report(&second, &path).unwrap();

        let reports = read_reports(&path).unwrap();
        assert_eq!(reports, vec![first, second]);
    }
}
