use arcade_engine::{
    InputAction, KeyTrigger, Level, NavAction, Overlay, OverlayRect, StageCommand,
};

const PAUSE_BUTTON: OverlayRect = OverlayRect::new(0.94, 0.02, 0.04, 0.07);
const BACK_BUTTON: OverlayRect = OverlayRect::new(0.02, 0.9, 0.04, 0.07);

fn message_screen(overlay: &mut Overlay, message: &str) {
    overlay.set_dim(true);
    overlay.add_text(0.5, 0.5, message);
    overlay.tap_anywhere(|_| StageCommand::DismissOverlay);
    overlay.bind_key(InputAction::Jump, KeyTrigger::Pressed, |_| {
        StageCommand::DismissOverlay
    });
}

/// Shown before play starts; any tap or the jump key dismisses it.
pub(crate) fn welcome_message(level: &mut Level, message: impl Into<String>) {
    let message = message.into();
    level.set_welcome_builder(move |overlay, _| message_screen(overlay, &message));
}

/// Dismissing the win screen moves on to the next level.
pub(crate) fn win_message(level: &mut Level, message: impl Into<String>) {
    let message = message.into();
    level.set_win_builder(move |overlay, _| message_screen(overlay, &message));
}

/// Dismissing the lose screen rebuilds the same level.
pub(crate) fn lose_message(level: &mut Level, message: impl Into<String>) {
    let message = message.into();
    level.set_lose_builder(move |overlay, _| message_screen(overlay, &message));
}

pub(crate) fn pause_screen(overlay: &mut Overlay, _level: &mut Level) {
    message_screen(overlay, "Game Paused");
    overlay.add_tap_control(BACK_BUTTON, "backarrow.png", |_| {
        StageCommand::Navigate(NavAction::Chooser)
    });
}

/// HUD button and `P` key that open the pause screen.
pub(crate) fn pause_button(level: &mut Level) {
    level
        .hud
        .add_tap_control(PAUSE_BUTTON, "pause.png", |level| {
            level.set_pause_builder(pause_screen);
            StageCommand::None
        });
    level
        .hud
        .bind_key(InputAction::Pause, KeyTrigger::Pressed, |level| {
            level.set_pause_builder(pause_screen);
            StageCommand::None
        });
}
