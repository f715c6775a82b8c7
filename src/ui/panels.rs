use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rusty_eda::{Bucket, RequestedType};

use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – coercion form and column selection
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let Some(session) = &state.session else {
        ui.heading("Controls");
        ui.separator();
        ui.label("No dataset loaded.");
        return;
    };

    // Owned copies so the widgets below can mutate `state`.
    let dtypes = session.dataset().dtypes();
    let classification = session.classify();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Change data type ----
            ui.heading("Change data type");
            ui.separator();

            ui.label("Select column to change data type:");
            let current_col = state.coerce_column.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("coerce_column")
                .selected_text(&current_col)
                .show_ui(ui, |ui: &mut Ui| {
                    for (name, dtype) in &dtypes {
                        let label = format!("{name}  ({dtype})");
                        if ui.selectable_label(current_col == *name, label).clicked() {
                            state.coerce_column = Some(name.clone());
                        }
                    }
                });

            ui.label("Select new data type:");
            egui::ComboBox::from_id_salt("coerce_type")
                .selected_text(state.coerce_type.name())
                .show_ui(ui, |ui: &mut Ui| {
                    for t in RequestedType::ALL {
                        ui.selectable_value(&mut state.coerce_type, t, t.name());
                    }
                });

            if ui.button("Change Data Type").clicked() {
                state.apply_coercion();
            }

            ui.add_space(12.0);

            // ---- Columns to plot ----
            ui.heading("Visualize data");
            ui.separator();

            ui.horizontal(|ui: &mut Ui| {
                for bucket in Bucket::ALL {
                    let n = classification.members(bucket).len();
                    ui.radio_value(&mut state.bucket, bucket, format!("{bucket} ({n})"));
                }
            });

            let bucket = state.bucket;
            let members = classification.members(bucket);
            if members.is_empty() {
                ui.label(format!("No {bucket} columns found in the dataset."));
            } else {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.select_all(bucket);
                    }
                    if ui.small_button("None").clicked() {
                        state.select_none(bucket);
                    }
                });
                for name in members {
                    let mut checked = state.selected(bucket).contains(name);
                    if ui.checkbox(&mut checked, name.as_str()).changed() {
                        state.toggle_column(bucket, name);
                    }
                }
            }

            if !classification.other.is_empty() {
                ui.add_space(8.0);
                ui.label(
                    RichText::new(format!("Not plotted: {}", classification.other.join(", ")))
                        .weak(),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(session) = &state.session {
            let ds = session.dataset();
            ui.label(format!(
                "{}: {} rows × {} columns",
                session.source(),
                ds.len(),
                ds.width()
            ));
        }

        ui.separator();

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.label(RichText::new(msg).color(Color32::DARK_GREEN));
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open a dataset")
        .add_filter("Supported files", &["csv", "tsv", "zip"])
        .add_filter("CSV", &["csv", "tsv"])
        .add_filter("ZIP", &["zip"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
