use bevy::prelude::*;

mod camera;
mod stats_widget;
mod tweak_panel;

pub use tweak_panel::PanelPointerCapture;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            stats_widget::StatsWidgetPlugin,
            tweak_panel::TweakPanelPlugin,
            camera::CameraPlugin,
        ));
    }
}
