mod hud;

use bevy::prelude::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // ─── HUD: always present, text follows the current phase ───
        app.add_systems(Startup, hud::spawn_hud);
        app.add_systems(
            Update,
            (
                hud::update_stats_text,
                hud::update_pending_text,
                hud::update_banner,
            ),
        );
    }
}
