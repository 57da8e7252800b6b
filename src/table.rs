// Bordered text tables for terminal output

use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// A small grid of text cells with a header row
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    align: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = (S, Align)>) -> Self {
        let (headers, align) = headers.into_iter().map(|(h, a)| (h.into(), a)).unzip();
        Self {
            headers,
            align,
            rows: Vec::new(),
        }
    }

    /// Add a row; missing cells are blank and extra cells are dropped
    pub fn add_row(&mut self, cells: Vec<String>) {
        let mut row: Vec<String> = cells
            .into_iter()
            .take(self.headers.len())
            .map(|cell| cell.replace(['\r', '\n'], " "))
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();

        let border = {
            let mut line = String::from("+");
            for width in &widths {
                line.push_str(&"-".repeat(width + 2));
                line.push('+');
            }
            line
        };

        let render_row = |cells: &[String]| {
            let mut line = String::from("|");
            for ((cell, width), align) in cells.iter().zip(&widths).zip(&self.align) {
                let padded = match align {
                    Align::Left => format!("{:<width$}", cell, width = width),
                    Align::Center => format!("{:^width$}", cell, width = width),
                };
                line.push(' ');
                line.push_str(&padded);
                line.push_str(" |");
            }
            line
        };

        let mut out = Vec::with_capacity(self.rows.len() + 4);
        out.push(border.clone());
        out.push(render_row(&self.headers));
        out.push(border.clone());
        for row in &self.rows {
            out.push(render_row(row));
        }
        out.push(border);
        out.join("\n")
    }
}

/// The `list` view: ID, resolved marker, description
pub fn task_table(tasks: &[Task]) -> Table {
    let mut table = Table::new([
        ("ID", Align::Left),
        ("Resolved", Align::Center),
        ("Description", Align::Left),
    ]);

    for task in tasks {
        let resolved = if task.is_resolved() { "*" } else { "" };
        table.add_row(vec![
            task.task_id.to_string(),
            resolved.to_string(),
            task.description.clone(),
        ]);
    }

    table
}
