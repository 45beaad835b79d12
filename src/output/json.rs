use crate::error::Result;
use crate::report::Report;

/// Render a report as pretty-printed JSON, in the persistence-contract shape.
pub fn render(report: &Report) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}
