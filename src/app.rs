use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyEdaApp {
    pub state: AppState,
}

impl eframe::App for RustyEdaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: coercion + column selection ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: data, statistics, charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(session) = &self.state.session else {
                plot::visualization(ui, &self.state);
                return;
            };
            let dataset = session.dataset();

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    egui::CollapsingHeader::new("Data")
                        .default_open(true)
                        .show(ui, |ui: &mut Ui| table::data_preview(ui, dataset));
                    egui::CollapsingHeader::new("Data types")
                        .default_open(false)
                        .show(ui, |ui: &mut Ui| table::info_grid(ui, dataset));
                    egui::CollapsingHeader::new("Statistics")
                        .default_open(false)
                        .show(ui, |ui: &mut Ui| table::describe_grids(ui, dataset));

                    ui.separator();
                    ui.heading("Visualize data");
                    plot::visualization(ui, &self.state);
                });
        });
    }
}
