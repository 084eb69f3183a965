//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use engine::{Currency, Dispatch, FieldValue, Listing, Record, Status};

fn cell(value: &FieldValue<'_>, currency: Currency) -> String {
    match value {
        FieldValue::Money(money) => money.format(currency),
        other => other.display(),
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let mut out = text.to_string();
    out.extend(std::iter::repeat_n(' ', width.saturating_sub(len)));
    out
}

/// Summary cards, then the page as an aligned table, then the pager line.
pub fn listing<R: Record>(listing: &Listing<'_, R>, currency: Currency) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Summary ({}):", listing.summary_scope.as_str());
    let name_width = listing
        .summary
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    for (name, value) in listing.summary.iter() {
        let _ = writeln!(out, "  {}  {}", pad(name, name_width), value.render(currency));
    }
    out.push('\n');

    let fields = R::fields();
    let rows: Vec<Vec<String>> = listing
        .rows
        .iter()
        .map(|record| {
            fields
                .iter()
                .map(|field| cell(&field.read(record), currency))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(field.name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = fields
        .iter()
        .zip(&widths)
        .map(|(field, width)| pad(&field.name.to_uppercase(), *width))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());

    if rows.is_empty() {
        let _ = writeln!(out, "(no matching {})", R::ENTITY);
    }
    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(text, width)| pad(text, *width))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }

    let page = &listing.page;
    let _ = write!(
        out,
        "\npage {}/{}, rows {}-{} of {}",
        page.page,
        page.total_pages,
        page.first_row(),
        page.last_row(),
        page.total_rows
    );
    out
}

/// Fields, statuses and transitions of an entity.
pub fn schema<R: Record>() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", R::ENTITY.label(), R::ENTITY);

    let _ = writeln!(out, "\nfields:");
    let width = R::fields()
        .iter()
        .map(|f| f.name.len())
        .max()
        .unwrap_or(0);
    for field in R::fields() {
        let _ = writeln!(out, "  {}  {}", pad(field.name, width), field.kind.as_str());
    }

    let statuses: Vec<&str> = <R::Status as Status>::ALL
        .iter()
        .map(|s| s.as_str())
        .collect();
    let _ = writeln!(
        out,
        "\nstatuses ({}): {}",
        R::STATUS_FIELD,
        statuses.join(", ")
    );
    let _ = writeln!(out, "search: {}", R::search_fields().join(", "));

    let _ = writeln!(out, "\nactions:");
    let _ = writeln!(out, "  view  (any status)");
    for t in R::actions().transitions() {
        let from: Vec<&str> = t.from.iter().map(|s| s.as_str()).collect();
        let _ = writeln!(
            out,
            "  {}  {} -> {}{}",
            t.action,
            from.join("|"),
            t.to.as_str(),
            if t.requires_reason {
                "  (reason required)"
            } else {
                ""
            }
        );
    }
    out.trim_end().to_string()
}

pub fn dispatch(dispatch: &Dispatch) -> String {
    match dispatch {
        Dispatch::Open { record_id } => format!("open {record_id}"),
        Dispatch::Transition {
            request,
            notification,
        } => {
            let mut out = format!(
                "{}\n  request {}: {} -> {}",
                notification.message, request.id, request.from_status, request.to_status
            );
            if let Some(reason) = &request.reason {
                let _ = write!(out, "\n  reason: {reason}");
            }
            out
        }
    }
}
