//! Command output on stdout, as text lines or JSON.

use std::io::Write;

use serde::Serialize;

use crate::commands::CommandError;

#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `value` as JSON, or the lines from `render` as text.
    pub fn emit<T, F>(&self, value: &T, render: F) -> Result<(), CommandError>
    where
        T: Serialize + ?Sized,
        F: FnOnce() -> Vec<String>,
    {
        let mut stdout = std::io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, value)?;
            writeln!(stdout)?;
        } else {
            for line in render() {
                writeln!(stdout, "{line}")?;
            }
        }
        Ok(())
    }

    /// A one-line confirmation. Suppressed in JSON mode.
    pub fn notice(&self, message: &str) -> Result<(), CommandError> {
        if !self.json {
            writeln!(std::io::stdout().lock(), "{message}")?;
        }
        Ok(())
    }
}

/// Pad `cells` into aligned columns.
pub fn table(header: &[&str], rows: Vec<Vec<String>>) -> Vec<String> {
    let mut widths: Vec<usize> = header.iter().map(|cell| cell.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_owned()
    };

    let header = header.iter().map(|cell| (*cell).to_owned()).collect();
    std::iter::once(render(header))
        .chain(rows.into_iter().map(render))
        .collect()
}
