use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points};

use rusty_eda::viz::series::{histogram, numeric_values, scatter_pairs, value_counts};
use rusty_eda::{Dataset, Dispatch, RenderInstruction};

use crate::color::ColorMap;
use crate::state::AppState;

/// Bins on the diagonal of the pair grid.
const HISTOGRAM_BINS: usize = 20;
/// Categories shown per count plot; the rest are summarised in a note.
const MAX_CATEGORIES: usize = 40;

// ---------------------------------------------------------------------------
// Visualization area (central panel)
// ---------------------------------------------------------------------------

/// Render whatever the current bucket and selection dispatch to.
pub fn visualization(ui: &mut Ui, state: &AppState) {
    let (Some(session), Some(outcome)) = (&state.session, state.visualization()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV or ZIP file to explore it  (File → Open…)");
        });
        return;
    };
    let dataset = session.dataset();

    match outcome {
        Ok(Dispatch::NoCandidates) => {
            ui.label(format!("No {} columns found in the dataset.", state.bucket));
        }
        Ok(Dispatch::EmptySelection) => {
            ui.label(format!(
                "Select the {} columns to plot in the side panel.",
                state.bucket
            ));
        }
        Ok(Dispatch::Render(instructions)) => {
            for instruction in &instructions {
                render(ui, dataset, instruction);
                ui.add_space(12.0);
            }
        }
        Err(e) => {
            ui.label(RichText::new(format!("{e}")).color(Color32::RED));
        }
    }
}

fn render(ui: &mut Ui, dataset: &Dataset, instruction: &RenderInstruction) {
    match instruction {
        RenderInstruction::Pairwise { columns } => pair_grid(ui, dataset, columns),
        RenderInstruction::Frequency { column } => count_plot(ui, dataset, column),
    }
}

// ---------------------------------------------------------------------------
// Pair grid: histograms on the diagonal, scatter plots elsewhere
// ---------------------------------------------------------------------------

fn pair_grid(ui: &mut Ui, dataset: &Dataset, columns: &[String]) {
    let n = columns.len();
    let cell = ((ui.available_width() - 8.0 * n as f32) / n as f32).clamp(120.0, 320.0);

    for (row, y) in columns.iter().enumerate() {
        ui.horizontal(|ui: &mut Ui| {
            for (col, x) in columns.iter().enumerate() {
                let id = format!("pair_{row}_{col}");
                let mut plot = Plot::new(id)
                    .width(cell)
                    .height(cell)
                    .show_axes([row + 1 == n, col == 0])
                    .allow_scroll(false);
                if row + 1 == n {
                    plot = plot.x_axis_label(x.as_str());
                }
                if col == 0 {
                    plot = plot.y_axis_label(y.as_str());
                }

                if row == col {
                    let values = numeric_values(dataset, x).unwrap_or_default();
                    let bars: Vec<Bar> = histogram(&values, HISTOGRAM_BINS)
                        .iter()
                        .map(|b| Bar::new(b.center(), b.count as f64).width(b.width()))
                        .collect();
                    plot.show(ui, |plot_ui| {
                        plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
                    });
                } else {
                    let points = scatter_pairs(dataset, x, y).unwrap_or_default();
                    plot.show(ui, |plot_ui| {
                        plot_ui.points(
                            Points::new(PlotPoints::from(points))
                                .radius(2.0)
                                .color(Color32::LIGHT_BLUE),
                        );
                    });
                }
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Count plot for one categorical column
// ---------------------------------------------------------------------------

fn count_plot(ui: &mut Ui, dataset: &Dataset, column: &str) {
    ui.strong(column);
    let counts = match value_counts(dataset, column) {
        Ok(c) => c,
        Err(e) => {
            ui.label(RichText::new(format!("{e}")).color(Color32::RED));
            return;
        }
    };

    let shown = &counts[..counts.len().min(MAX_CATEGORIES)];
    let colors = ColorMap::new(shown.iter().map(|(v, _)| v));
    let bars: Vec<Bar> = shown
        .iter()
        .enumerate()
        .map(|(i, (value, n))| {
            Bar::new(i as f64, *n as f64)
                .name(value.to_string())
                .fill(colors.color_for(value))
                .width(0.8)
        })
        .collect();

    Plot::new(format!("count_{column}"))
        .height(240.0)
        .legend(egui_plot::Legend::default())
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });

    if counts.len() > MAX_CATEGORIES {
        ui.label(
            RichText::new(format!(
                "showing the {MAX_CATEGORIES} most frequent of {} values",
                counts.len()
            ))
            .weak(),
        );
    }
}
