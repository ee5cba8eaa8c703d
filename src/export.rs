// 📤 Export - CSV series for charts and spreadsheets

use crate::amortization::AmortizationYearEntry;
use crate::break_even::BreakEvenYear;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row).context("Failed to write CSV row")?;
    }
    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Header: year,cumulative_principal_paid,cumulative_interest_paid,remaining_balance
pub fn write_schedule_csv<W: Write>(writer: W, schedule: &[AmortizationYearEntry]) -> Result<()> {
    write_rows(writer, schedule)
}

/// Header: year,cumulative_owning_cost,cumulative_renting_cost
pub fn write_break_even_csv<W: Write>(writer: W, yearly: &[BreakEvenYear]) -> Result<()> {
    write_rows(writer, yearly)
}

pub fn schedule_to_csv_string(schedule: &[AmortizationYearEntry]) -> Result<String> {
    let mut buffer = Vec::new();
    write_schedule_csv(&mut buffer, schedule)?;
    String::from_utf8(buffer).context("CSV output was not valid UTF-8")
}
