use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use rusty_eda::data::summary::{describe, describe_categorical, info};
use rusty_eda::{Dataset, Value};

/// Rows shown in the preview table.
const PREVIEW_ROWS: usize = 200;

fn fmt_stat(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.4}")).unwrap_or_else(|| "–".into())
}

fn fmt_cell(v: &Value) -> String {
    match v {
        Value::Float(x) => format!("{x:.4}"),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Data preview
// ---------------------------------------------------------------------------

/// The first rows of the dataset, one table column per data column.
pub fn data_preview(ui: &mut Ui, dataset: &Dataset) {
    let columns = dataset.columns();
    let n_rows = dataset.len().min(PREVIEW_ROWS);

    egui::ScrollArea::horizontal()
        .id_salt("preview_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(260.0)
                .column(TableColumn::auto())
                .columns(TableColumn::auto().at_least(60.0), columns.len())
                .header(20.0, |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.strong("#");
                    });
                    for col in columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&col.name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, n_rows, |mut row| {
                        let i = row.index();
                        row.col(|ui: &mut Ui| {
                            ui.label(i.to_string());
                        });
                        for col in columns {
                            row.col(|ui: &mut Ui| {
                                ui.label(fmt_cell(&col.values[i]));
                            });
                        }
                    });
                });
        });

    if dataset.len() > PREVIEW_ROWS {
        ui.label(RichText::new(format!("showing {PREVIEW_ROWS} of {} rows", dataset.len())).weak());
    }
}

// ---------------------------------------------------------------------------
// dtypes / info / describe
// ---------------------------------------------------------------------------

/// Column types and non-null counts, like `df.info()`.
pub fn info_grid(ui: &mut Ui, dataset: &Dataset) {
    egui::Grid::new("info_grid")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong("Column");
            ui.strong("Non-null");
            ui.strong("Dtype");
            ui.end_row();
            for row in info(dataset) {
                ui.label(&row.column);
                ui.label(format!("{} / {}", row.non_null, dataset.len()));
                ui.label(row.dtype.dtype_name());
                ui.end_row();
            }
        });
}

/// Summary statistics for numerical and categorical columns.
pub fn describe_grids(ui: &mut Ui, dataset: &Dataset) {
    let numeric = describe(dataset);
    if !numeric.is_empty() {
        egui::Grid::new("describe_numeric")
            .striped(true)
            .show(ui, |ui: &mut Ui| {
                for h in ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"] {
                    ui.strong(h);
                }
                ui.end_row();
                for s in &numeric {
                    ui.label(&s.column);
                    ui.label(s.count.to_string());
                    for v in [s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max] {
                        ui.label(fmt_stat(v));
                    }
                    ui.end_row();
                }
            });
        ui.add_space(8.0);
    }

    let categorical = describe_categorical(dataset);
    if !categorical.is_empty() {
        egui::Grid::new("describe_categorical")
            .striped(true)
            .show(ui, |ui: &mut Ui| {
                for h in ["", "count", "unique", "top", "freq"] {
                    ui.strong(h);
                }
                ui.end_row();
                for s in &categorical {
                    ui.label(&s.column);
                    ui.label(s.count.to_string());
                    ui.label(s.unique.to_string());
                    ui.label(s.top.as_deref().unwrap_or("–"));
                    ui.label(s.freq.to_string());
                    ui.end_row();
                }
            });
    }
}
