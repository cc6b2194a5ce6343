use crate::galaxy::GalaxySet;
use crate::prelude::*;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

pub struct TweakPanelPlugin;

impl Plugin for TweakPanelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EditDebounce>()
            .init_resource::<PanelPointerCapture>()
            .add_systems(Startup, configure_visuals_system)
            .add_systems(Update, ui_system.before(GalaxySet::Regenerate));
    }
}

/// Set while the pointer belongs to the panel, so the camera leaves it alone.
#[derive(Resource, Default)]
pub struct PanelPointerCapture(pub bool);

/// Holds edits back until the user lets go of the widget.
/// Regenerating on every drag tick is far too slow at high star counts.
#[derive(Resource, Default, Debug)]
pub struct EditDebounce {
    pending: Option<RegenerateTarget>,
}

impl EditDebounce {
    pub fn note_change(&mut self, target: RegenerateTarget) {
        self.pending = Some(match self.pending {
            Some(pending) => pending.merge(target),
            None => target,
        });
    }

    /// Releases the pending target once no widget is dragged or typed into.
    pub fn poll(&mut self, interacting: bool) -> Option<RegenerateTarget> {
        if interacting {
            None
        } else {
            self.pending.take()
        }
    }
}

fn configure_visuals_system(mut contexts: EguiContexts) {
    contexts.ctx_mut().set_visuals(egui::Visuals {
        window_corner_radius: 0.0.into(),
        ..Default::default()
    });
}

fn slider<N: egui::emath::Numeric>(
    ui: &mut egui::Ui,
    value: &mut N,
    min: N,
    max: N,
    step: f64,
    text: &str,
) -> bool {
    ui.add(egui::Slider::new(value, min..=max).step_by(step).text(text))
        .changed()
}

fn color(ui: &mut egui::Ui, value: &mut [f32; 3], text: &str) -> bool {
    ui.horizontal(|ui| {
        let changed = ui.color_edit_button_rgb(value).changed();
        ui.label(text);
        changed
    })
    .inner
}

fn star_field_ui(params: &mut GalaxyParams, ui: &mut egui::Ui) -> bool {
    let (minval, maxval) = (GalaxyParams::MIN, GalaxyParams::MAX);
    let mut changed = false;

    egui::CollapsingHeader::new("Galaxy")
        .default_open(true)
        .show(ui, |ui| {
            changed |= slider(ui, &mut params.star_count, minval.star_count, maxval.star_count, 100.0, "Star Count");
            changed |= slider(ui, &mut params.star_size, minval.star_size, maxval.star_size, 0.001, "Star Size");
            changed |= slider(ui, &mut params.radius, minval.radius, maxval.radius, 1.0, "Radius");
            ui.add_enabled_ui(params.has_center(), |ui| {
                changed |= slider(
                    ui,
                    &mut params.radius_offset,
                    minval.radius_offset,
                    maxval.radius_offset,
                    0.01,
                    "Radius Offset",
                );
            });
            changed |= slider(ui, &mut params.branch_count, minval.branch_count, maxval.branch_count, 1.0, "Branches");
            changed |= slider(ui, &mut params.spin, minval.spin, maxval.spin, 0.01, "Spiral Intensity");
            changed |= slider(ui, &mut params.randomness, minval.randomness, maxval.randomness, 0.01, "Randomness");
            changed |= slider(
                ui,
                &mut params.randomness_power,
                minval.randomness_power,
                maxval.randomness_power,
                0.001,
                "Randomness Power",
            );
            changed |= color(ui, &mut params.inside_color, "Inside Color");
            changed |= color(ui, &mut params.outside_color, "Outside Color");
        });
    ui.separator();

    changed
}

fn center_ui(params: &mut GalaxyParams, ui: &mut egui::Ui) -> bool {
    let (minval, maxval) = (GalaxyParams::MIN, GalaxyParams::MAX);
    let mut changed = false;

    egui::CollapsingHeader::new("Galactic Center")
        .default_open(true)
        .show(ui, |ui| {
            ui.add_enabled_ui(params.has_center(), |ui| {
                changed |= slider(ui, &mut params.center_count, minval.center_count, maxval.center_count, 100.0, "Center Count");
                changed |= slider(ui, &mut params.center_size, minval.center_size, maxval.center_size, 0.01, "Center Size");
                changed |= slider(ui, &mut params.center_height, minval.center_height, maxval.center_height, 0.1, "Center Height");
                changed |= slider(ui, &mut params.center_width, minval.center_width, maxval.center_width, 0.1, "Center Width");
                changed |= color(ui, &mut params.center_color, "Center Color");
            });
        });
    ui.separator();

    changed
}

fn ui_system(
    mut contexts: EguiContexts,
    mut galaxy_config_ui: ResMut<GalaxyConfigUi>,
    mut debounce: ResMut<EditDebounce>,
    mut pointer_capture: ResMut<PanelPointerCapture>,
    mut regenerate: EventWriter<RegenerateGalaxy>,
) {
    let ctx = contexts.ctx_mut();
    let params = &mut galaxy_config_ui.0;

    egui::SidePanel::left("tweak_panel")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Galaxy Generator");

            let mut extended = params.has_center();
            if ui.checkbox(&mut extended, "Galactic center").changed() {
                params.variant = if extended {
                    GalaxyVariant::Extended
                } else {
                    GalaxyVariant::Base
                };
                debounce.note_change(RegenerateTarget::All);
            }
            ui.separator();

            if star_field_ui(params, ui) {
                debounce.note_change(RegenerateTarget::All);
            }
            if center_ui(params, ui) {
                debounce.note_change(RegenerateTarget::Center);
            }
            if ui.button("Regenerate").clicked() {
                debounce.note_change(RegenerateTarget::All);
            }
        });

    pointer_capture.0 = ctx.wants_pointer_input() || ctx.is_pointer_over_area();

    let interacting = ctx.is_using_pointer() || ctx.wants_keyboard_input();
    if let Some(target) = debounce.poll(interacting) {
        regenerate.write(RegenerateGalaxy {
            params: params.clone(),
            target,
        });
    }
}
