//! User-facing error message formatting.
//!
//! Uses typed error matching (DashboardError, PolarsError variants, io::ErrorKind) rather than
//! string parsing to produce actionable messages.

use polars::prelude::PolarsError;
use std::io;
use std::path::Path;

use crate::error::DashboardError;

/// One-line message for any dashboard error.
pub fn user_message(err: &DashboardError) -> String {
    match err {
        DashboardError::DatasetNotFound { searched } => {
            let mut msg = String::from("Dataset file not found. Looked in:");
            for path in searched {
                msg.push_str(&format!("\n  {}", path.display()));
            }
            msg.push_str("\nPass --path or add a directory to [data] search_paths.");
            msg
        }
        DashboardError::EmptySelection => {
            "Choose at least one seller group to see the dashboard.".to_string()
        }
        DashboardError::MissingColumn { field, header } => format!(
            "Column '{}' ({}) is missing from the dataset. Check the [columns] section of the config.",
            header, field
        ),
        DashboardError::InvalidTimestamp { message } => format!(
            "Order timestamps could not be parsed ({}). Set [data] timestamp_format if the format is unusual.",
            first_line(message)
        ),
        DashboardError::InvalidAmount { column, message } => format!(
            "Column '{}' has values that are not amounts: {}",
            column,
            first_line(message)
        ),
        DashboardError::InvalidSchema(msg) => format!("Unexpected table layout: {}", msg),
        DashboardError::Validation(msg) => format!(
            "Dataset failed strict validation: {}. Use --validation warn to load it anyway.",
            msg
        ),
        DashboardError::Polars(pe) => user_message_from_polars(pe),
        DashboardError::Io(e) => user_message_from_io(e, None),
    }
}

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!(
            "Column not found: {}. Check the [columns] header mapping.",
            msg
        ),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Row shape mismatch: {}", msg),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::OutOfBounds(msg) => format!("Index or row out of bounds: {}", msg),
        PE::ComputeError(msg) => first_line(msg).to_string(),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::Interrupted => "Operation interrupted.".to_string(),
        ErrorKind::OutOfMemory => "Out of memory.".to_string(),
        ErrorKind::Other => {
            let msg = err.to_string();
            if msg.contains("Is a directory") {
                return "Path is a directory, not a file.".to_string();
            }
            return if context.is_some() {
                format!("I/O error: {}", msg)
            } else {
                msg
            };
        }
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find DashboardError, PolarsError or io::Error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, path: Option<&Path>) -> String {
    let with_path = |msg: String| match path {
        Some(p) => format!("Failed to load {}: {}", p.display(), msg),
        None => msg,
    };
    for cause in report.chain() {
        if let Some(de) = cause.downcast_ref::<DashboardError>() {
            return user_message(de);
        }
        if let Some(pe) = cause.downcast_ref::<PolarsError>() {
            return with_path(user_message_from_polars(pe));
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return with_path(user_message_from_io(io_err, None));
        }
    }

    // Fallback: use first line of display to avoid long tracebacks
    let display = report.to_string();
    with_path(first_line(&display).to_string())
}

fn first_line(msg: &str) -> &str {
    msg.lines()
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("An error occurred")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_not_found_lists_every_candidate() {
        let err = DashboardError::DatasetNotFound {
            searched: vec![PathBuf::from("/a/orders.csv"), PathBuf::from("/b/orders.csv")],
        };
        let msg = user_message(&err);
        assert!(msg.contains("/a/orders.csv"));
        assert!(msg.contains("/b/orders.csv"));
        assert!(msg.contains("--path"));
    }

    #[test]
    fn test_empty_selection_notice() {
        let msg = user_message(&DashboardError::EmptySelection);
        assert!(msg.contains("at least one seller group"));
    }

    #[test]
    fn test_user_message_from_io_not_found() {
        let err = io::Error::new(io::ErrorKind::NotFound, "No such file");
        let msg = user_message_from_io(&err, None);
        assert!(
            msg.contains("not found"),
            "expected 'not found', got: {}",
            msg
        );
    }

    #[test]
    fn test_user_message_from_polars_column_not_found() {
        let err = PolarsError::ColumnNotFound("셀러명".into());
        let msg = user_message(&DashboardError::Polars(err));
        assert!(msg.contains("셀러명"), "expected column name, got: {}", msg);
        assert!(msg.contains("[columns]"), "expected config hint, got: {}", msg);
    }

    #[test]
    fn test_report_downcasts_dashboard_error() {
        let report = color_eyre::eyre::Report::new(DashboardError::EmptySelection);
        let msg = user_message_from_report(&report, None);
        assert!(msg.contains("seller group"));
    }
}
