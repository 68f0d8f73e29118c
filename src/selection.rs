use serde::Serialize;
use std::time::Duration;

/// How long a hover-leave waits before the highlight is cleared. Long enough
/// to survive the mouse crossing the gap between adjacent rows.
pub const CLEAR_DEBOUNCE: Duration = Duration::from_millis(100);

/// Which half of the UI produced a hover event. Selection writes from one
/// side must never produce an effect targeting that same side, otherwise
/// list and image would feed each other forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    List,
    Image,
}

/// Instructions for the annotation viewer / record list, emitted in response
/// to hover events. The webview applies them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Redraw one shape with the highlighted fill.
    HighlightShape { id: String },
    /// Reset one shape's style without redrawing the canvas.
    ClearShape { id: String },
    /// One-time full-layer redraw after style resets.
    RedrawLayer,
    /// Scroll the matching list record into view, centered, smooth.
    ScrollIntoView { id: String },
}

/// Handle for a scheduled highlight clear. The embedding sleeps
/// `CLEAR_DEBOUNCE` and then calls `resolve_clear`; any hover-enter in
/// between makes the token stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearToken(u64);

#[derive(Debug)]
struct PendingClear {
    token: ClearToken,
    id: String,
    origin: Side,
}

/// Owns the shared selection key and the pending debounced clear. All
/// mutation happens through the four hover events plus `resolve_clear`;
/// there is exactly one of these per application window.
#[derive(Debug, Default)]
pub struct SelectionController {
    selected: Option<String>,
    pending: Option<PendingClear>,
    next_token: u64,
}

impl SelectionController {
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Forget everything; called when a new prediction replaces the records.
    pub fn reset(&mut self) {
        self.selected = None;
        self.pending = None;
    }

    /// Mouse entered a list record. Cancels any pending clear and highlights
    /// the matching shape on the image. No scroll effect: the list is the
    /// side the user is already on.
    pub fn record_enter(&mut self, id: &str) -> Vec<Effect> {
        let mut effects = self.cancel_pending_for_other_shape(id);
        self.selected = Some(id.to_string());
        effects.push(Effect::HighlightShape { id: id.to_string() });
        effects
    }

    /// Mouse left a list record. The clear is only scheduled; it lands when
    /// the token is resolved after the debounce and nothing re-entered.
    pub fn record_leave(&mut self) -> Option<ClearToken> {
        self.schedule_clear(Side::List)
    }

    /// Mouse entered a polygon on the image. Cancels any pending clear and
    /// scrolls the matching record into view. No highlight effect: the image
    /// side already renders its own hover state.
    pub fn shape_enter(&mut self, id: &str) -> Vec<Effect> {
        let mut effects = self.cancel_pending_for_other_shape(id);
        self.selected = Some(id.to_string());
        effects.push(Effect::ScrollIntoView { id: id.to_string() });
        effects
    }

    /// Mouse left a polygon on the image.
    pub fn shape_leave(&mut self) -> Option<ClearToken> {
        self.schedule_clear(Side::Image)
    }

    /// Apply a scheduled clear. Stale tokens (anything superseded by a later
    /// enter or leave) are a no-op, which is what keeps fast row-to-row
    /// movement flicker-free.
    pub fn resolve_clear(&mut self, token: ClearToken) -> Vec<Effect> {
        match self.pending.take() {
            Some(pending) if pending.token == token => {
                if self.selected.as_deref() == Some(pending.id.as_str()) {
                    self.selected = None;
                }
                match pending.origin {
                    // The list asked for the highlight, so the list's leave
                    // restores the shape style and redraws once.
                    Side::List => vec![
                        Effect::ClearShape { id: pending.id },
                        Effect::RedrawLayer,
                    ],
                    // Image-side leave only drops the selection; the list
                    // row un-highlights by reading the selection state.
                    Side::Image => Vec::new(),
                }
            }
            other => {
                self.pending = other;
                Vec::new()
            }
        }
    }

    fn schedule_clear(&mut self, origin: Side) -> Option<ClearToken> {
        let id = self.selected.clone()?;
        self.next_token += 1;
        let token = ClearToken(self.next_token);
        self.pending = Some(PendingClear { token, id, origin });
        Some(token)
    }

    /// Cancel the pending clear. If the cancelled clear belonged to a
    /// different shape than the one now entered, its highlight still has to
    /// come down, otherwise two shapes stay filled.
    fn cancel_pending_for_other_shape(&mut self, entered: &str) -> Vec<Effect> {
        match self.pending.take() {
            Some(pending) if pending.origin == Side::List && pending.id != entered => vec![
                Effect::ClearShape { id: pending.id },
                Effect::RedrawLayer,
            ],
            _ => Vec::new(),
        }
    }
}
