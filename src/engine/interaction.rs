use eframe::egui::{Pos2, Vec2, vec2};

/// Pointer travel (screen pixels) below which a press counts as a click.
pub const CLICK_SLOP: f32 = 3.0;

/// Size of the drawing surface. Zero or non-finite sizes mean the host has
/// not measured it yet.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const UNMEASURED: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_measured(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(self) -> Option<Vec2> {
        self.is_measured()
            .then(|| vec2(self.width * 0.5, self.height * 0.5))
    }
}

/// Pan/zoom state: `screen = world * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub scale: f32,
    pub translate: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate: Vec2::ZERO,
    };

    pub fn is_identity(self) -> bool {
        self == Self::IDENTITY
    }

    pub fn world_to_screen(self, world: Vec2) -> Pos2 {
        (world * self.scale + self.translate).to_pos2()
    }

    pub fn screen_to_world(self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.translate) / self.scale
    }

    /// Scales by `factor` around `pointer`, keeping the world point under it
    /// fixed. The resulting scale is clamped between `min` and `max`, in
    /// whichever order they come.
    pub fn zoom_at(&mut self, pointer: Pos2, factor: f32, min: f32, max: f32) {
        if !factor.is_finite() || factor <= 0.0 || !min.is_finite() || !max.is_finite() {
            return;
        }

        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let anchor = self.screen_to_world(pointer);
        self.scale = (self.scale * factor).clamp(low, high);
        self.translate = pointer.to_vec2() - anchor * self.scale;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.translate += delta;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::IDENTITY;
    }
}

/// What a pointer press landed on.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PressTarget {
    /// `grab_offset` is the body position minus the pointer's world position,
    /// so the body does not jump under the cursor when the drag starts.
    Node { id: String, grab_offset: Vec2 },
    Edge(usize),
    Background,
}

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
    Pressed { origin: Pos2, target: PressTarget },
    Dragging { id: String, grab_offset: Vec2 },
    Panning { last: Pos2 },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PointerAction {
    None,
    StartDrag { id: String, grab_offset: Vec2 },
    Drag { id: String, grab_offset: Vec2 },
    EndDrag(String),
    Pan(Vec2),
    Click(PressTarget),
}

/// Splits raw pointer events into clicks, node drags and background pans.
#[derive(Debug, Default)]
pub(crate) struct GestureRecognizer {
    gesture: Option<Gesture>,
}

impl GestureRecognizer {
    /// Starts a new gesture. A drag still in progress (its release was
    /// never seen) is ended first.
    pub(crate) fn press(&mut self, at: Pos2, target: PressTarget) -> PointerAction {
        let interrupted = self.cancel();
        self.gesture = Some(Gesture::Pressed { origin: at, target });
        interrupted
    }

    /// Abandons the current gesture without a click.
    pub(crate) fn cancel(&mut self) -> PointerAction {
        match self.gesture.take() {
            Some(Gesture::Dragging { id, .. }) => PointerAction::EndDrag(id),
            _ => PointerAction::None,
        }
    }

    pub(crate) fn motion(&mut self, at: Pos2) -> PointerAction {
        let Some(gesture) = self.gesture.take() else {
            return PointerAction::None;
        };

        match gesture {
            Gesture::Pressed { origin, target } => {
                if origin.distance(at) <= CLICK_SLOP {
                    self.gesture = Some(Gesture::Pressed { origin, target });
                    return PointerAction::None;
                }
                match target {
                    PressTarget::Node { id, grab_offset } => {
                        self.gesture = Some(Gesture::Dragging {
                            id: id.clone(),
                            grab_offset,
                        });
                        PointerAction::StartDrag { id, grab_offset }
                    }
                    PressTarget::Edge(_) | PressTarget::Background => {
                        self.gesture = Some(Gesture::Panning { last: at });
                        PointerAction::Pan(at - origin)
                    }
                }
            }
            Gesture::Dragging { id, grab_offset } => {
                self.gesture = Some(Gesture::Dragging {
                    id: id.clone(),
                    grab_offset,
                });
                PointerAction::Drag { id, grab_offset }
            }
            Gesture::Panning { last } => {
                self.gesture = Some(Gesture::Panning { last: at });
                PointerAction::Pan(at - last)
            }
        }
    }

    pub(crate) fn release(&mut self, at: Pos2) -> PointerAction {
        match self.gesture.take() {
            Some(Gesture::Pressed { origin, target }) if origin.distance(at) <= CLICK_SLOP => {
                PointerAction::Click(target)
            }
            Some(Gesture::Dragging { id, .. }) => PointerAction::EndDrag(id),
            Some(Gesture::Panning { last }) => PointerAction::Pan(at - last),
            Some(Gesture::Pressed { .. }) | None => PointerAction::None,
        }
    }

    /// Drops any gesture that refers to `id`.
    pub(crate) fn forget_node(&mut self, id: &str) {
        let refers = match &self.gesture {
            Some(Gesture::Dragging { id: dragged, .. }) => dragged == id,
            Some(Gesture::Pressed {
                target: PressTarget::Node { id: pressed, .. },
                ..
            }) => pressed == id,
            _ => false,
        };
        if refers {
            self.gesture = None;
        }
    }

    /// Edge indices are rebuilt on every reconciliation, so a pending edge
    /// press is downgraded to a background press.
    pub(crate) fn forget_edges(&mut self) {
        if let Some(Gesture::Pressed { target, .. }) = &mut self.gesture
            && matches!(target, PressTarget::Edge(_))
        {
            *target = PressTarget::Background;
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.gesture.is_some()
    }
}

/// Camera plus drag/gesture state.
#[derive(Debug, Default)]
pub(crate) struct Interaction {
    pub(crate) transform: Transform,
    pub(crate) gestures: GestureRecognizer,
    pub(crate) dragging: Option<String>,
}

impl Interaction {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
