//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use docusplit_core::ExtractionReport;
use docusplit_core::ParseReport;
use docusplit_core::diagnostics::Diagnostic;
use docusplit_core::diagnostics::Severity;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
    err_term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
            err_term: Term::stderr(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn write_heading(&self, mark: &str, text: &str, ok: bool) {
        if self.use_colors {
            let mark = if ok {
                style(mark).green().bold()
            } else {
                style(mark).yellow().bold()
            };
            let _ = self.term.write_line(&format!("{mark} {text}"));
        } else {
            let _ = self.term.write_line(text);
        }
    }

    fn write_warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }
        let _ = self.term.write_line("");
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{}", style("Warnings:").yellow().bold()));
        } else {
            let _ = self.term.write_line("Warnings:");
        }
        for warning in warnings {
            let _ = self.term.write_line(&format!("  - {warning}"));
        }
    }

    fn write_notes(&self, diagnostics: &[Diagnostic]) {
        let notes: Vec<&Diagnostic> = diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Info)
            .collect();
        if notes.is_empty() {
            return;
        }
        let _ = self.term.write_line("");
        let _ = self.term.write_line("Notes:");
        for note in notes {
            let _ = self.term.write_line(&format!("  - {note}"));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(
        &self,
        parsed: &ParseReport,
        extracted: &ExtractionReport,
        diagnostics: &[Diagnostic],
    ) -> Result<()> {
        // Failures are errors and survive --quiet.
        for failure in &extracted.failures {
            let prefix = if self.use_colors {
                style("ERROR:").red().bold().to_string()
            } else {
                "ERROR:".to_string()
            };
            let _ = self.err_term.write_line(&format!(
                "{prefix} section {} ({}): {} [{}]",
                failure.section_index,
                failure.path.display(),
                failure.reason,
                failure.code
            ));
        }

        if self.quiet {
            return Ok(());
        }

        if extracted.is_complete() {
            self.write_heading("✓", "Extraction complete", true);
        } else {
            self.write_heading(
                "⚠",
                &format!(
                    "Extraction finished with {} failures",
                    extracted.failures.len()
                ),
                false,
            );
        }

        let _ = self.term.write_line(&format!(
            "  Records found:    {}",
            Self::format_number(parsed.records.len())
        ));
        let _ = self.term.write_line(&format!(
            "  Files written:    {}",
            Self::format_number(extracted.files_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            humanize_bytes(extracted.bytes_written)
        ));

        if extracted.files_skipped > 0 {
            let _ = self.term.write_line(&format!(
                "  Files skipped:    {}",
                extracted.files_skipped
            ));
        }
        if parsed.sections_dropped > 0 {
            let _ = self.term.write_line(&format!(
                "  Sections dropped: {}",
                parsed.sections_dropped
            ));
        }

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Bytes read:       {}",
                humanize_bytes(parsed.bytes_read)
            ));
            let _ = self.term.write_line(&format!(
                "  Duration:         {:?}",
                parsed.duration + extracted.duration
            ));
            for path in &extracted.written {
                let _ = self.term.write_line(&format!("    {}", path.display()));
            }
        }

        let mut warnings = parsed.warnings.clone();
        warnings.extend(extracted.warnings.iter().cloned());
        self.write_warnings(&warnings);

        if self.verbose {
            self.write_notes(diagnostics);
        }

        Ok(())
    }

    fn format_listing_short(&self, report: &ParseReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for record in &report.records {
            let _ = self.term.write_line(record.filename());
        }

        self.write_warnings(&report.warnings);
        Ok(())
    }

    fn format_listing_long(&self, report: &ParseReport, human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for record in &report.records {
            let size_str = if human_readable {
                humanize_bytes(record.size() as u64)
            } else {
                record.size().to_string()
            };
            let sha1 = if record.sha1().is_empty() {
                "-"
            } else {
                record.sha1()
            };
            let guid = if record.guid().is_empty() {
                "-"
            } else {
                record.guid()
            };

            let _ = self.term.write_line(&format!(
                "{:<10} {:>10}  {:<40}  {}",
                record.declared_type(),
                size_str,
                sha1,
                record.filename()
            ));
            let _ = self.term.write_line(&format!(
                "{:<10} {:>10}  guid {guid}, {}",
                "",
                "",
                record.position()
            ));
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} files, {}",
            Self::format_number(report.records.len()),
            humanize_bytes(report.total_content_bytes())
        ));

        self.write_warnings(&report.warnings);
        Ok(())
    }
}
