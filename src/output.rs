use std::io::{self, Write};

use serde::Serialize;

use crate::app::{DatasetReport, RunReport};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct ReportOutput;

impl ReportOutput {
    pub fn print_run(result: &RunReport, mode: OutputMode) -> io::Result<()> {
        match mode {
            OutputMode::Json => Self::print_json(result),
            OutputMode::Text => {
                let mut stdout = io::stdout();
                for dataset in &result.datasets {
                    stdout.write_all(Self::summary(dataset).as_bytes())?;
                }
                Ok(())
            }
        }
    }

    pub fn print_dataset(result: &DatasetReport, mode: OutputMode) -> io::Result<()> {
        match mode {
            OutputMode::Json => Self::print_json(result),
            OutputMode::Text => io::stdout().write_all(Self::summary(result).as_bytes()),
        }
    }

    pub fn summary(report: &DatasetReport) -> String {
        let mut text = format!(
            "{}: {} rows ({} duplicates), {} years -> {} observations\n",
            report.dataset,
            report.input_rows,
            report.duplicate_rows,
            report.year_columns,
            report.long_rows
        );
        for output in &report.outputs {
            text.push_str(&format!(
                "  {} {} rows -> {}\n",
                output.unit, output.rows, output.path
            ));
        }
        for dropped in &report.dropped {
            text.push_str(&format!(
                "  {} {} rows dropped (no output file)\n",
                dropped.unit, dropped.rows
            ));
        }
        text
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
