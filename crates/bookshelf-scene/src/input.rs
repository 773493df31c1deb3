//! Window input collection for the shelf view
//!
//! Bevy input messages are translated into lifecycle [`InputEvent`]s and
//! queued until the lifecycle driver runs. Only kinds with an attached
//! listener are queued, so nothing reaches a scene that is not running.

use bevy::input::mouse::{MouseButtonInput, MouseScrollUnit, MouseWheel};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::{CursorLeft, CursorMoved, PrimaryWindow, WindowResized};
use bevy_egui::EguiContexts;
use bookshelf_core::glam;
use bookshelf_core::lifecycle::ListenerKind;
use bookshelf_core::InputEvent;

use crate::host::HostState;

/// Pixels per wheel line, matching a browser's line-mode scroll
const LINE_HEIGHT: f32 = 100.0;

/// Events waiting for the next lifecycle tick
#[derive(Resource, Debug, Default)]
pub struct PendingInput(pub Vec<InputEvent>);

impl PendingInput {
    pub fn take(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.0)
    }
}

/// Set while an egui panel owns the pointer
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointerCaptured(pub bool);

fn screen(v: Vec2) -> glam::Vec2 {
    glam::Vec2::new(v.x, v.y)
}

/// Wheel travel in pixels, positive when scrolling down (zooming out)
pub fn wheel_delta(unit: MouseScrollUnit, y: f32) -> f32 {
    match unit {
        MouseScrollUnit::Line => -y * LINE_HEIGHT,
        MouseScrollUnit::Pixel => -y,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn collect_input(
    state: Res<HostState>,
    captured: Res<PointerCaptured>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut moves: MessageReader<CursorMoved>,
    mut buttons: MessageReader<MouseButtonInput>,
    mut wheels: MessageReader<MouseWheel>,
    mut left: MessageReader<CursorLeft>,
    mut resized: MessageReader<WindowResized>,
    mut was_captured: Local<bool>,
    mut pending: ResMut<PendingInput>,
) {
    let listening = |kind| state.is_listening(kind);
    let cursor = windows.single().ok().and_then(|w| w.cursor_position());

    if captured.0 && !*was_captured && listening(ListenerKind::PointerLeave) {
        pending.0.push(InputEvent::PointerLeft);
    }
    *was_captured = captured.0;

    for moved in moves.read() {
        if !captured.0 && listening(ListenerKind::PointerMove) {
            pending.0.push(InputEvent::PointerMove {
                pos: screen(moved.position),
            });
        }
    }

    for button in buttons.read() {
        if button.button != MouseButton::Left {
            continue;
        }
        match button.state {
            ButtonState::Pressed => {
                if captured.0 || !listening(ListenerKind::PointerDown) {
                    continue;
                }
                if let Some(pos) = cursor {
                    pending.0.push(InputEvent::PointerDown { pos: screen(pos) });
                }
            }
            ButtonState::Released => {
                if !listening(ListenerKind::PointerUp) {
                    continue;
                }
                match cursor {
                    Some(pos) if !captured.0 => {
                        pending.0.push(InputEvent::PointerUp { pos: screen(pos) });
                    }
                    _ => pending.0.push(InputEvent::PointerCancel),
                }
            }
        }
    }

    for wheel in wheels.read() {
        if !captured.0 && listening(ListenerKind::Wheel) {
            pending.0.push(InputEvent::Wheel {
                delta_y: wheel_delta(wheel.unit, wheel.y),
            });
        }
    }

    if left.read().count() > 0 && listening(ListenerKind::PointerLeave) {
        pending.0.push(InputEvent::PointerLeft);
    }

    for resize in resized.read() {
        if listening(ListenerKind::Resize) {
            pending.0.push(InputEvent::Resize {
                width: resize.width.round() as u32,
                height: resize.height.round() as u32,
            });
        }
    }
}

/// Track whether egui wants the pointer this frame
pub fn update_pointer_capture(mut contexts: EguiContexts, mut captured: ResMut<PointerCaptured>) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let wants = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
    captured.set_if_neq(PointerCaptured(wants));
}
