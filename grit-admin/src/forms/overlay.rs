//! Anchored dropdown positioning
//!
//! A dropdown floats above the rest of the form, positioned just below the
//! control that opened it. The overlay follows an explicit lifecycle:
//! [`PositionedOverlay::attach`] computes the position, viewport changes
//! (scroll, resize) recompute it, a click outside both the anchor and the
//! overlay closes it, and [`PositionedOverlay::detach`] tears it down.

/// Screen rectangle in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> i32 {
        self.y + i32::from(self.height)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && x < self.x + i32::from(self.width)
            && y >= self.y
            && y < self.bottom()
    }
}

/// Something an overlay can hang from
pub trait OverlayAnchor {
    /// Current on-screen bounds of the anchor
    fn bounds(&self) -> Rect;
}

impl OverlayAnchor for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// Gap between the anchor's bottom edge and the overlay
pub const ANCHOR_GAP: i32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionedOverlay {
    anchor: Option<Rect>,
    rect: Option<Rect>,
    height: u16,
}

impl PositionedOverlay {
    /// `height` is the number of rows the overlay content occupies
    pub fn new(height: u16) -> Self {
        Self {
            anchor: None,
            rect: None,
            height,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.rect.is_some()
    }

    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    pub fn attach(&mut self, anchor: &dyn OverlayAnchor) {
        self.place(anchor.bounds());
    }

    /// Recompute the position after a scroll or resize; no-op when detached
    pub fn on_viewport_change(&mut self, anchor: &dyn OverlayAnchor) {
        if self.is_attached() {
            self.place(anchor.bounds());
        }
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height;
        if let Some(anchor) = self.anchor {
            self.place(anchor);
        }
    }

    /// Handle a click. Returns `true` when the click fell outside both the
    /// anchor and the overlay, in which case the overlay detaches.
    pub fn handle_click(&mut self, x: i32, y: i32) -> bool {
        let (Some(anchor), Some(rect)) = (self.anchor, self.rect) else {
            return false;
        };
        if anchor.contains(x, y) || rect.contains(x, y) {
            return false;
        }
        self.detach();
        true
    }

    pub fn detach(&mut self) {
        self.anchor = None;
        self.rect = None;
    }

    fn place(&mut self, anchor: Rect) {
        self.anchor = Some(anchor);
        self.rect = Some(Rect::new(
            anchor.x,
            anchor.bottom() + ANCHOR_GAP,
            anchor.width,
            self.height,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_positions_below_anchor() {
        let mut overlay = PositionedOverlay::new(5);
        overlay.attach(&Rect::new(4, 10, 30, 1));
        assert_eq!(overlay.rect(), Some(Rect::new(4, 12, 30, 5)));
    }

    #[test]
    fn test_viewport_change_recomputes_only_when_attached() {
        let mut overlay = PositionedOverlay::new(3);
        overlay.on_viewport_change(&Rect::new(0, 0, 10, 1));
        assert!(!overlay.is_attached());

        overlay.attach(&Rect::new(0, 10, 10, 1));
        overlay.on_viewport_change(&Rect::new(0, 4, 10, 1));
        assert_eq!(overlay.rect().map(|r| r.y), Some(6));
    }

    #[test]
    fn test_outside_click_detaches() {
        let mut overlay = PositionedOverlay::new(3);
        overlay.attach(&Rect::new(0, 0, 10, 1));
        assert!(!overlay.handle_click(2, 0), "click on anchor keeps it open");
        assert!(!overlay.handle_click(2, 3), "click inside keeps it open");
        assert!(overlay.handle_click(40, 40));
        assert!(!overlay.is_attached());
        assert!(!overlay.handle_click(40, 40));
    }
}
