#![cfg(feature = "egui")]

use eframe::egui::{self, Color32, RichText, Sense, Vec2};

use crate::details::{self, EntityDetails};
use crate::model::LayerKind;
use crate::render::style;
use crate::stream::ConnectionStatus;

use super::render::{paint_display_list, rgb_to_color32};
use super::state::LivingMapApp;

fn status_dot_color(status: ConnectionStatus) -> Color32 {
    match status {
        ConnectionStatus::Open => Color32::from_rgb(76, 175, 80),
        ConnectionStatus::Connecting => Color32::from_rgb(255, 193, 7),
        ConnectionStatus::Closed => Color32::GRAY,
        ConnectionStatus::Error => Color32::from_rgb(244, 67, 54),
    }
}

pub(crate) fn update(app: &mut LivingMapApp, ctx: &egui::Context, _frame: &mut eframe::Frame) {
    top_bar(app, ctx);
    details_panel(app, ctx);
    canvas(app, ctx);
}

fn top_bar(app: &mut LivingMapApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("living_map_top").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Living Map").strong());
            ui.separator();

            let mut layer = app.selection.active_layer();
            for kind in LayerKind::ALL {
                ui.selectable_value(&mut layer, kind, kind.title());
            }
            if layer != app.selection.active_layer() {
                app.selection.set_layer(layer);
            }
            ui.separator();

            let status = app.client.status();
            let (dot, _) = ui.allocate_exact_size(Vec2::splat(12.0), Sense::hover());
            ui.painter()
                .circle_filled(dot.center(), 5.0, status_dot_color(status));
            ui.label(status.as_str());

            let fetch = app.client.fetch_state();
            if fetch.loading {
                ui.spinner();
            }
            if let Some(error) = &fetch.error {
                ui.separator();
                ui.colored_label(Color32::from_rgb(244, 67, 54), format!("Fetch failed: {error}"));
                if ui.button("Retry").clicked() {
                    app.client.refetch();
                }
            }
        });
    });
}

fn details_panel(app: &mut LivingMapApp, ctx: &egui::Context) {
    egui::SidePanel::right("living_map_details")
        .resizable(true)
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Details");
            ui.separator();
            let Some(snapshot) = app.client.snapshot() else {
                ui.label("Waiting for the first snapshot…");
                return;
            };
            let selection = app.selection.get();
            match (&selection.selected, details::selected_details(&snapshot, &selection)) {
                (None, _) => {
                    ui.label("Click an entity to inspect it.");
                }
                (Some(id), None) => {
                    ui.label(format!(
                        "'{id}' is not on the {} layer.",
                        selection.active_layer.title()
                    ));
                }
                (Some(_), Some(entity)) => entity_grid(ui, &entity),
            }

            ui.add_space(12.0);
            ui.separator();
            if let Some(at) = snapshot.generated_at {
                ui.small(format!("generated {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
            }
            if let Some(version) = &snapshot.meta.schema_version {
                ui.small(format!("schema {version}"));
            }
            if !snapshot.meta.sources.is_empty() {
                ui.small(format!("sources: {}", snapshot.meta.sources.join(", ")));
            }
        });
}

fn entity_grid(ui: &mut egui::Ui, entity: &EntityDetails) {
    ui.label(RichText::new(&entity.name).strong());
    egui::Grid::new("entity_details")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            ui.label("id");
            ui.monospace(&entity.id);
            ui.end_row();
            ui.label("status");
            ui.label(&entity.status);
            ui.end_row();
            ui.label("layer");
            ui.label(entity.layer.title());
            ui.end_row();
            for (key, value) in &entity.rows {
                ui.label(key);
                ui.label(value);
                ui.end_row();
            }
        });
}

fn canvas(app: &mut LivingMapApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(rgb_to_color32(style::BACKGROUND)))
        .show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
            let engine = &mut app.engine;
            if engine.host_mut().set_container(rect) {
                engine.on_container_resize();
            }

            let (pressed, released, latest) = ctx.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.primary_released(),
                    i.pointer.latest_pos(),
                )
            });
            if let Some(pos) = latest {
                if pressed && response.hovered() {
                    engine.on_pointer_down(pos.x, pos.y);
                } else if response.is_pointer_button_down_on() {
                    engine.on_pointer_move(pos.x, pos.y);
                }
            }
            if released {
                engine.on_pointer_up();
            }
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    engine.on_click(pos.x, pos.y);
                }
            }

            if let Some(request) = engine.host_mut().take_due_frame() {
                engine.on_animation_frame(request);
            }
            paint_display_list(&ui.painter_at(rect), rect.min, engine.surface());
        });
}
