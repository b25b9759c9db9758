use prettytable::{color, format, format::TableFormat, Attr, Cell, Row, Table};
use serde_json::Value;

use crate::cmd::CommandOutput;

pub struct ResponseTable {
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl ResponseTable {
    /// Reorders rows by the named column. Unknown columns leave the
    /// table untouched.
    pub fn sort_by(mut self, arg_key: &Option<impl AsRef<str>>) -> Self {
        let idx = match arg_key
            .as_ref()
            .and_then(|key| self.columns.iter().position(|c| c == key.as_ref()))
        {
            Some(idx) => idx,
            None => return self,
        };
        self.values
            .sort_by_key(|row| Some(row.as_array()?.get(idx)?.to_string()));
        self
    }
}

impl From<ResponseTable> for CommandOutput {
    fn from(table: ResponseTable) -> Self {
        CommandOutput::Table {
            columns: table.columns,
            values: table.values,
        }
    }
}

pub(crate) fn print_table(columns: &[String], values: &[Value]) {
    let mut table = Table::new();
    table.set_format(*FORMAT_BASIC);

    table.set_titles(Row::new(
        columns
            .iter()
            .map(|c| {
                Cell::new(c)
                    .with_style(Attr::Bold)
                    .with_style(Attr::ForegroundColor(color::GREEN))
            })
            .collect(),
    ));

    // An empty body row keeps the frame readable when there is no data.
    if values.is_empty() {
        let _ = table.add_row(columns.iter().map(|_| Cell::new("")).collect());
    }
    for row in values {
        if let Some(cells) = row.as_array() {
            table.add_row(cells.iter().map(|v| Cell::new(&cell_text(v))).collect());
        }
    }
    let _ = table.printstd();
}

pub(crate) fn print_json_table(columns: &[String], values: &[Value]) -> anyhow::Result<()> {
    let objects: Option<Vec<Value>> = values
        .iter()
        .map(|row| match row {
            Value::Array(cells) if cells.len() == columns.len() => Some(
                columns
                    .iter()
                    .cloned()
                    .zip(cells.iter().cloned())
                    .collect::<serde_json::Map<String, Value>>()
                    .into(),
            ),
            _ => None,
        })
        .collect();

    let doc = match objects {
        Some(objects) => Value::Array(objects),
        // Ragged rows cannot be keyed by column, dump the raw layout.
        None => serde_json::json!({ "headers": columns, "values": values }),
    };
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        v => v.to_string(),
    }
}

lazy_static::lazy_static! {
    pub static ref FORMAT_BASIC: TableFormat = format::FormatBuilder::new()
        .column_separator('│')
        .borders('│')
        .separators(
            &[format::LinePosition::Top],
            format::LineSeparator::new('─', '┬', '┌', '┐')
        )
        .separators(
            &[format::LinePosition::Title],
            format::LineSeparator::new('─', '┼', '├', '┤')
        )
        .separators(
            &[format::LinePosition::Bottom],
            format::LineSeparator::new('─', '┴', '└', '┘')
        )
        .padding(2, 2)
        .build();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_known_column_reorders_rows() {
        let table = ResponseTable {
            columns: vec!["crop".to_string(), "price".to_string()],
            values: vec![
                serde_json::json!(["Wheat", "30"]),
                serde_json::json!(["Onions", "12"]),
                serde_json::json!(["Rice", "45"]),
            ],
        };
        let sorted = table.sort_by(&Some("crop"));
        assert_eq!(
            sorted.values,
            vec![
                serde_json::json!(["Onions", "12"]),
                serde_json::json!(["Rice", "45"]),
                serde_json::json!(["Wheat", "30"]),
            ]
        );
    }

    #[test]
    fn sort_by_unknown_column_is_noop() {
        let table = ResponseTable {
            columns: vec!["crop".to_string()],
            values: vec![serde_json::json!(["Wheat"]), serde_json::json!(["Corn"])],
        };
        let sorted = table.sort_by(&Some("location"));
        assert_eq!(
            sorted.values,
            vec![serde_json::json!(["Wheat"]), serde_json::json!(["Corn"])]
        );
    }
}
