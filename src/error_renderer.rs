//! Error rendering using ariadne
//!
//! This module renders sift errors with source code snippets: syntax errors
//! point into the JSON input, compilation errors into the filter.

use crate::{Diagnostic, Error, Severity};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use sift::{Engine, render_error};
///
/// let engine = Engine::default();
/// if let Err(e) = engine.compile(".a | nope(1)") {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &Error) {
    render_error_to_writer(error, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, writer: &mut dyn Write, use_color: bool) -> std::io::Result<()> {
    render_error_to_writer(error, writer, use_color)
}

/// Render an error to a String
pub fn render_error_to_string(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Syntax { diagnostic, src } => {
            render_diagnostic("<input>", src, diagnostic, writer, use_color)
        }
        Error::Compilation { diagnostic, src } => {
            render_diagnostic("<filter>", src, diagnostic, writer, use_color)
        }
        Error::Runtime(msg) => writeln!(writer, "Runtime error: {}", msg),
        Error::ResourceExceeded(msg) => writeln!(writer, "Resource limit exceeded: {}", msg),
        Error::Api(msg) => writeln!(writer, "API error: {}", msg),
    }
}

fn render_diagnostic(
    name: &str,
    source: &str,
    diag: &Diagnostic,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let kind = match diag.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
        Severity::Info => ReportKind::Advice,
    };

    // ariadne wants a span inside the source, even for errors at the end.
    let end = diag.span.0.end.min(source.len());
    let start = diag.span.0.start.min(end);

    let mut report = Report::build(kind, (name, start..end))
        .with_message(&diag.message)
        .with_config(ariadne::Config::default().with_color(use_color));

    if let Some(code) = &diag.code {
        report = report.with_code(code);
    }

    report = report.with_label(
        Label::new((name, start..end))
            .with_message(&diag.message)
            .with_color(colors.next()),
    );

    if let Some(help) = &diag.help {
        report = report.with_help(help);
    }

    report.finish().write((name, Source::from(source)), &mut *writer)
}
