//! Per-image interaction state: the pending corners, the committed quads, the
//! single selection and the global drag flag, plus the pointer/key
//! transitions that mutate them.
//!
//! Everything here is in image pixel coordinates and free of GUI types; the
//! frame loop in `app` translates egui input into these calls.

use crate::model::{Point, Quad, QuadId};

#[derive(Debug)]
pub struct Session {
    pending: Vec<Point>,
    quads: Vec<Quad>,
    selected: Option<QuadId>,
    dragging: bool,
    next_id: u64,
    hit_radius: i32,
}

impl Session {
    pub fn new(hit_radius: i32) -> Self {
        Self {
            pending: Vec::with_capacity(4),
            quads: Vec::new(),
            selected: None,
            dragging: false,
            next_id: 0,
            hit_radius,
        }
    }

    pub fn pending(&self) -> &[Point] {
        &self.pending
    }

    pub fn quads(&self) -> &[Quad] {
        &self.quads
    }

    pub fn selected_quad(&self) -> Option<&Quad> {
        self.selected.and_then(|id| self.quad(id))
    }

    pub fn is_selected(&self, id: QuadId) -> bool {
        self.selected == Some(id)
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn quad(&self, id: QuadId) -> Option<&Quad> {
        self.quads.iter().find(|q| q.id == id)
    }

    fn quad_mut(&mut self, id: QuadId) -> Option<&mut Quad> {
        self.quads.iter_mut().find(|q| q.id == id)
    }

    // ── Pointer events ──────────────────────────────────────────────────────

    /// Adds a pending corner. Ignored once four are waiting for a label.
    pub fn double_click(&mut self, x: i32, y: i32) {
        if self.pending.len() < 4 {
            log::debug!("x: {}, y: {}", x, y);
            self.pending.push(Point::new(x, y, self.hit_radius));
        }
    }

    pub fn press(&mut self, x: i32, y: i32) {
        self.dragging = true;
        let hit = self
            .quads
            .iter_mut()
            .find(|q| q.hit_test(x, y))
            .map(|q| {
                q.begin_drag(x, y);
                q.id
            });

        match (self.selected, hit) {
            (None, Some(id)) => self.select(id),
            (None, None) => {}
            (Some(current), Some(id)) if current == id => {}
            (Some(current), Some(id)) => {
                self.deselect(current);
                self.select(id);
            }
            (Some(current), None) => self.deselect(current),
        }
    }

    pub fn pointer_moved(&mut self, x: i32, y: i32) {
        if !self.dragging {
            return;
        }
        if let Some(id) = self.selected {
            if let Some(quad) = self.quad_mut(id) {
                if quad.is_dragging() {
                    log::debug!("dragging {} point to ({}, {})", id, x, y);
                }
                quad.update_drag(x, y);
            }
        }
    }

    pub fn release(&mut self) {
        self.dragging = false;
        for quad in &mut self.quads {
            quad.end_drag();
        }
    }

    fn select(&mut self, id: QuadId) {
        self.selected = Some(id);
        if let Some(quad) = self.quad(id) {
            log::info!("{} has been selected.", quad.describe());
        }
    }

    fn deselect(&mut self, id: QuadId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
        if let Some(quad) = self.quad(id) {
            log::info!("{} has been unselected.", quad.describe());
        }
    }

    // ── Key events ──────────────────────────────────────────────────────────

    /// Removes the selected quad, if any.
    pub fn delete_selected(&mut self) -> Option<Quad> {
        let id = self.selected.take()?;
        let index = self.quads.iter().position(|q| q.id == id)?;
        let quad = self.quads.remove(index);
        log::info!("{} has been deleted.", quad.describe());
        Some(quad)
    }

    // ── Quad creation ───────────────────────────────────────────────────────

    /// Empties the pending buffer once it holds four corners.
    pub fn take_full_pending(&mut self) -> Option<[Point; 4]> {
        if self.pending.len() < 4 {
            return None;
        }
        let points: [Point; 4] = self.pending.drain(..4).collect::<Vec<_>>().try_into().ok()?;
        Some(points)
    }

    pub fn commit(&mut self, points: [Point; 4], label: String) -> QuadId {
        let id = QuadId(self.next_id);
        self.next_id += 1;
        let quad = Quad::new(id, points, label);
        if quad.is_self_intersecting() {
            log::warn!(
                "{} is self-intersecting; its corners were not clicked in perimeter order",
                quad.describe()
            );
        }
        log::info!("{} has been created.", quad.describe());
        self.quads.push(quad);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_HIT_RADIUS;

    fn place(session: &mut Session, coords: [(i32, i32); 4], label: &str) -> QuadId {
        for (x, y) in coords {
            session.double_click(x, y);
        }
        let points = session.take_full_pending().expect("four pending points");
        session.commit(points, label.to_string())
    }

    fn click(session: &mut Session, x: i32, y: i32) {
        session.press(x, y);
        session.release();
    }

    fn selected(session: &Session) -> Option<QuadId> {
        session.selected_quad().map(|q| q.id)
    }

    fn selected_count(session: &Session) -> usize {
        session
            .quads()
            .iter()
            .filter(|q| session.is_selected(q.id))
            .count()
    }

    #[test]
    fn test_four_double_clicks_make_one_quad_in_click_order() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        s.double_click(10, 10);
        s.double_click(10, 50);
        s.double_click(50, 50);
        assert!(s.take_full_pending().is_none());
        assert_eq!(s.pending().len(), 3);

        s.double_click(50, 10);
        let points = s.take_full_pending().unwrap();
        assert!(s.pending().is_empty());

        s.commit(points, "AAA1111".into());
        assert_eq!(s.quads().len(), 1);
        assert_eq!(s.quads()[0].serialize(), "10,10,10,50,50,50,50,10,AAA1111");
    }

    #[test]
    fn test_pending_buffer_stops_at_four() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        for i in 0..6 {
            s.double_click(i * 20, 0);
        }
        assert_eq!(s.pending().len(), 4);
        let points = s.take_full_pending().unwrap();
        assert_eq!(points.map(|p| p.x), [0, 20, 40, 60]);
    }

    #[test]
    fn test_press_selects_first_created_quad() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        let first = place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        let _second = place(&mut s, [(12, 12), (100, 10), (100, 100), (10, 100)], "B");

        click(&mut s, 11, 11);
        assert_eq!(selected(&s), Some(first));
        assert_eq!(selected_count(&s), 1);
    }

    #[test]
    fn test_press_on_empty_space_selects_nothing() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        click(&mut s, 300, 300);
        assert_eq!(selected(&s), None);
        assert!(!s.is_dragging());
    }

    #[test]
    fn test_at_most_one_selected_across_presses() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        let a = place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        let b = place(&mut s, [(200, 200), (200, 250), (250, 250), (250, 200)], "B");

        let presses = [(10, 10), (200, 200), (50, 50), (400, 400), (250, 250), (251, 249)];
        for (x, y) in presses {
            click(&mut s, x, y);
            assert!(selected_count(&s) <= 1);
        }

        click(&mut s, 10, 10);
        assert_eq!(selected(&s), Some(a));
        click(&mut s, 200, 250);
        assert_eq!(selected(&s), Some(b));
        click(&mut s, 600, 600);
        assert_eq!(selected(&s), None);
    }

    #[test]
    fn test_drag_moves_exactly_one_point() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        let id = place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        click(&mut s, 10, 10);
        assert_eq!(selected(&s), Some(id));

        s.press(50, 50);
        s.pointer_moved(60, 55);
        s.pointer_moved(70, 80);
        s.release();

        let quad = s.selected_quad().unwrap();
        assert_eq!(quad.coords(), [(10, 10), (10, 50), (70, 80), (50, 10)]);
        assert!(quad.points.iter().all(|p| !p.dragging));
    }

    #[test]
    fn test_select_and_drag_in_one_gesture() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        s.press(10, 50);
        s.pointer_moved(15, 45);
        s.release();
        assert_eq!(s.quads()[0].coords(), [(10, 10), (15, 45), (50, 50), (50, 10)]);
    }

    #[test]
    fn test_move_without_press_does_nothing() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        click(&mut s, 10, 10);
        s.pointer_moved(99, 99);
        assert_eq!(s.quads()[0].coords(), [(10, 10), (10, 50), (50, 50), (50, 10)]);
    }

    #[test]
    fn test_dragging_only_touches_selected_quad() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        let b = place(&mut s, [(200, 200), (200, 250), (250, 250), (250, 200)], "B");
        click(&mut s, 10, 10);

        // switch selection to B and drag its corner in the same press
        s.press(250, 250);
        assert_eq!(selected(&s), Some(b));
        s.pointer_moved(260, 270);
        s.release();

        assert_eq!(s.quads()[0].coords(), [(10, 10), (10, 50), (50, 50), (50, 10)]);
        assert_eq!(s.quads()[1].coords(), [(200, 200), (200, 250), (260, 270), (250, 200)]);
    }

    #[test]
    fn test_release_clears_drag_on_every_quad() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        place(&mut s, [(200, 200), (200, 250), (250, 250), (250, 200)], "B");
        s.press(10, 10);
        assert!(s.quads()[0].is_dragging());
        s.release();
        assert!(s.quads().iter().all(|q| !q.is_dragging()));
        assert!(!s.is_dragging());
    }

    #[test]
    fn test_delete_selected() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        let a = place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        let b = place(&mut s, [(200, 200), (200, 250), (250, 250), (250, 200)], "B");

        click(&mut s, 10, 10);
        let removed = s.delete_selected().unwrap();
        assert_eq!(removed.id, a);
        assert_eq!(s.quads().len(), 1);
        assert_eq!(s.quads()[0].id, b);
        assert_eq!(selected(&s), None);
    }

    #[test]
    fn test_delete_without_selection_is_noop() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        assert!(s.delete_selected().is_none());
        assert_eq!(s.quads().len(), 1);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        let a = place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        click(&mut s, 10, 10);
        s.delete_selected();
        let b = place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "B");
        assert_ne!(a, b);
    }

    #[test]
    fn test_shared_coordinates_stay_independent() {
        let mut s = Session::new(DEFAULT_HIT_RADIUS);
        place(&mut s, [(10, 10), (10, 50), (50, 50), (50, 10)], "A");
        place(&mut s, [(50, 50), (50, 90), (90, 90), (90, 50)], "B");

        // (50, 50) is a corner of both; the earlier quad wins
        s.press(50, 50);
        s.pointer_moved(45, 45);
        s.release();
        assert_eq!(s.quads()[0].coords()[2], (45, 45));
        assert_eq!(s.quads()[1].coords()[0], (50, 50));
    }
}
