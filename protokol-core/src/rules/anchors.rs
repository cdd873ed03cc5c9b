// Label-anchored value lookups shared by the meeting-level extractors.
//
// Three ways of reading the value behind a fixed label:
// - inline: rest of the label's line
// - block: rest of the label's line plus continuation lines
// - table: cells under a label cell in a table grid

use crate::types::Table;

/// Rest of the line after the first occurrence of `label`, trimmed.
/// "" when the label never appears.
pub fn inline_value(text: &str, label: &str) -> String {
    if label.is_empty() {
        return String::new();
    }
    match text.find(label) {
        Some(start) => {
            let rest = &text[start + label.len()..];
            let line_end = rest.find('\n').unwrap_or(rest.len());
            rest[..line_end].trim().to_string()
        }
        None => String::new(),
    }
}

/// Values after `label`: the rest of its own line (when non-empty) and every
/// following line until a blank line or a line that contains a colon, which
/// marks the next labelled field.
pub fn block_values(text: &str, label: &str) -> Vec<String> {
    if label.is_empty() {
        return Vec::new();
    }
    let Some(start) = text.find(label) else {
        return Vec::new();
    };

    let mut lines = text[start + label.len()..].split('\n');
    let mut values = Vec::new();

    if let Some(first) = lines.next() {
        let first = first.trim();
        if !first.is_empty() {
            values.push(first.to_string());
        }
    }

    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.contains(':') {
            break;
        }
        values.push(line.to_string());
    }

    values
}

/// Cells listed under the row whose first cell equals `label`.
///
/// Collection starts on the row after the label row and stops at the next
/// column-0 cell ending with a colon (another label). Column 0 and column 1
/// values are appended in encounter order. A repeated label row does not
/// stop collection; its column-1 value is kept.
pub fn table_values(table: &Table, label: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut found = false;

    for row in 0..table.rows.len() {
        let first = table.cell(row, 0);

        if found {
            if first.ends_with(':') && first != label {
                break;
            }
            if !first.is_empty() && first != label && !first.ends_with(':') {
                values.push(first.to_string());
            }
            let second = table.cell(row, 1);
            if !second.is_empty() {
                values.push(second.to_string());
            }
        }

        if first == label {
            found = true;
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn inline_takes_rest_of_first_matching_line() {
        let text = "Кворум:   є  \nКворум: ні";
        assert_eq!(inline_value(text, "Кворум:"), "є");
    }

    #[test]
    fn inline_does_not_continue_onto_next_line() {
        assert_eq!(inline_value("Відсутні:\nПетренко", "Відсутні:"), "");
    }

    #[test]
    fn inline_missing_label_is_empty() {
        assert_eq!(inline_value("нічого", "Запрошені:"), "");
    }

    #[test]
    fn block_stops_at_blank_line() {
        let text = "Члени комітету: Іванов\nПетренко\n\nСидоренко";
        assert_eq!(block_values(text, "Члени комітету:"), vec!["Іванов", "Петренко"]);
    }

    #[test]
    fn block_stops_at_next_label() {
        let text = "Члени комітету:\nІванов\nПетренко\nСекретар: Коваль";
        assert_eq!(block_values(text, "Члени комітету:"), vec!["Іванов", "Петренко"]);
    }

    #[test]
    fn table_collects_both_columns_until_next_label() {
        let t = table(&[
            &["Голова комітету:", "ignored"],
            &["Іванов І.І.", "директор"],
            &["", "Петренко П.П."],
            &["Члени комітету:", ""],
            &["Сидоренко С.С."],
        ]);
        assert_eq!(
            table_values(&t, "Голова комітету:"),
            vec!["Іванов І.І.", "директор", "Петренко П.П."]
        );
        assert_eq!(table_values(&t, "Члени комітету:"), vec!["Сидоренко С.С."]);
    }

    #[test]
    fn table_repeated_label_keeps_second_column() {
        let t = table(&[
            &["Члени комітету:"],
            &["Іванов"],
            &["Члени комітету:", "Петренко"],
            &["Кворум:", "є"],
        ]);
        assert_eq!(table_values(&t, "Члени комітету:"), vec!["Іванов", "Петренко"]);
    }

    #[test]
    fn table_without_label_is_empty() {
        let t = table(&[&["a", "b"]]);
        assert!(table_values(&t, "Голова комітету:").is_empty());
    }
}
