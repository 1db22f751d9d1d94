// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text vs JSON rendering of job reports and device listings.

use std::io::Write;

use printdesk_core::error::Result;
use printdesk_service::{DeviceInventory, JobReport};
use serde::Serialize;

/// Human-readable rendering, implemented by every printable payload.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

#[derive(Debug, Clone, Copy)]
pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn write<T: Render + Serialize>(&self, payload: &T, w: &mut dyn Write) -> Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut *w, payload)?;
            writeln!(w)?;
        } else {
            payload.render_text(w)?;
        }
        Ok(())
    }

    pub fn to_stdout<T: Render + Serialize>(&self, payload: &T) -> Result<()> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write(payload, &mut handle)
    }

    pub fn to_string<T: Render + Serialize>(&self, payload: &T) -> Result<String> {
        let mut buf = Vec::new();
        self.write(payload, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Render for JobReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            writeln!(w, "  hint: {suggestion}")?;
        }
        for file in &self.files {
            writeln!(w, "  {}", file.display())?;
        }
        Ok(())
    }
}

impl Render for DeviceInventory {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Detected platform: {}", self.platform)?;
        writeln!(w)?;

        writeln!(w, "Available printers (use with --printer):")?;
        if self.printers.is_empty() {
            writeln!(w, "  (no printers found)")?;
        }
        for printer in &self.printers {
            let marker = if printer.is_default { " (default)" } else { "" };
            writeln!(w, "  - {}{marker}", printer.name)?;
        }
        writeln!(w)?;

        writeln!(w, "Available scanners (use with --scanner):")?;
        if self.scanners.is_empty() {
            writeln!(w, "  (no scanners found)")?;
        }
        for scanner in &self.scanners {
            writeln!(w, "  - {}: {}", scanner.id, scanner.description)?;
        }

        if let Some(example) = self.example_command() {
            writeln!(w)?;
            writeln!(w, "Example:")?;
            writeln!(w, "  {example}")?;
        }
        Ok(())
    }
}
