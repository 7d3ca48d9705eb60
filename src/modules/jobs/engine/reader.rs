/// Flat-file reader for delimited exam records
///
/// Format: comma-separated, first line is a header and is always skipped,
/// exactly three fields per line in fixed order `studentId, courseName,
/// score`. A wrong field count or an unparseable score is a read-phase
/// fault; the offending line is consumed so the run can continue.
use crate::log_info;
use crate::modules::jobs::engine::ItemReader;
use crate::modules::results::domain::entities::StudentResult;
use crate::shared::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

#[derive(Debug)]
pub struct FlatFileReader {
    lines: Lines<BufReader<File>>,
    line_number: usize,
    path: String,
}

impl FlatFileReader {
    pub fn open(path: &str) -> AppResult<Self> {
        let file = File::open(path)
            .map_err(|e| AppError::IoError(format!("Failed to open '{}': {}", path, e)))?;
        let mut lines = BufReader::new(file).lines();

        // Header line is always skipped
        if let Some(header) = lines.next() {
            header.map_err(|e| {
                AppError::IoError(format!("Failed to read header of '{}': {}", path, e))
            })?;
        }

        log_info!("Reading file from path: {}", path);
        Ok(Self {
            lines,
            line_number: 1,
            path: path.to_string(),
        })
    }

    fn parse_line(line: &str, line_number: usize) -> AppResult<StudentResult> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 3 {
            return Err(AppError::ParseError(format!(
                "line {}: expected 3 fields, found {}",
                line_number,
                fields.len()
            )));
        }

        let score: i32 = fields[2].trim().parse().map_err(|e| {
            AppError::ParseError(format!(
                "line {}: invalid score '{}': {}",
                line_number,
                fields[2].trim(),
                e
            ))
        })?;

        // Field content stays untrimmed; blank-after-trim ids and course
        // names are a validation concern, not a parse fault.
        Ok(StudentResult::new(
            fields[0].to_string(),
            fields[1].to_string(),
            score,
        ))
    }
}

#[async_trait]
impl ItemReader<StudentResult> for FlatFileReader {
    async fn read(&mut self) -> AppResult<Option<StudentResult>> {
        match self.lines.next() {
            Some(Ok(line)) => {
                self.line_number += 1;
                Self::parse_line(&line, self.line_number).map(Some)
            }
            Some(Err(e)) => {
                self.line_number += 1;
                Err(AppError::IoError(format!(
                    "Failed to read line {} of '{}': {}",
                    self.line_number, self.path, e
                )))
            }
            None => Ok(None),
        }
    }
}
