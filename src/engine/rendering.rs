//! Turns result rows into text.
use crate::engine::rows::Row;

/// One JSON object per row, one row per line, columns in SELECT order.
pub fn render_json_lines(rows: &[Row]) -> Result<String, crate::Error> {
    let lines = rows
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lines.join("\n"))
}

/// A plain text table, for people.
///
/// ```text
/// id | name
/// ---+-----
/// 2  | Jane
/// ```
pub fn render_table(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return "(no rows)".to_string();
    };

    let headers: Vec<&str> = first.keys().collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|(_, value)| value.to_string()).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            cells
                .iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain([header.chars().count()])
                .max()
                .unwrap_or_default()
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_line(headers.iter().copied(), &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        lines.push(render_line(row.iter().map(String::as_str), &widths));
    }

    lines.join("\n")
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rows::Value;

    fn rows() -> Vec<Row> {
        vec![
            [("id", Value::from("1")), ("name", Value::from("John"))]
                .into_iter()
                .collect(),
            [("id", Value::from("22")), ("name", Value::Null)]
                .into_iter()
                .collect(),
        ]
    }

    #[test]
    fn test_json_lines() {
        assert_eq!(
            "{\"id\":\"1\",\"name\":\"John\"}\n{\"id\":\"22\",\"name\":null}",
            render_json_lines(&rows()).unwrap()
        );
        assert_eq!("", render_json_lines(&[]).unwrap());
    }

    #[test]
    fn test_table() {
        assert_eq!(
            "id | name\n\
             ---+-----\n\
             1  | John\n\
             22 | NULL",
            render_table(&rows())
        );
        assert_eq!("(no rows)", render_table(&[]));
    }
}
