use std::fmt;

pub const DEFAULT_HIT_RADIUS: i32 = 8;

// ── Point ───────────────────────────────────────────────────────────────────

/// A corner in image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
    pub hit_radius: i32,
    pub dragging: bool,
}

impl Point {
    pub fn new(x: i32, y: i32, hit_radius: i32) -> Self {
        Self {
            x,
            y,
            hit_radius,
            dragging: false,
        }
    }

    /// Square bounds check, exclusive on every edge.
    pub fn hit_test(&self, x: i32, y: i32) -> bool {
        let r = self.hit_radius;
        x > self.x - r && x < self.x + r && y > self.y - r && y < self.y + r
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }
}

// ── Quad ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuadId(pub u64);

impl fmt::Display for QuadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Four points in click order plus the operator's label.
#[derive(Clone, Debug, PartialEq)]
pub struct Quad {
    pub id: QuadId,
    pub points: [Point; 4],
    pub label: String,
}

impl Quad {
    pub fn new(id: QuadId, points: [Point; 4], label: String) -> Self {
        Self { id, points, label }
    }

    pub fn hit_test(&self, x: i32, y: i32) -> bool {
        self.points.iter().any(|p| p.hit_test(x, y))
    }

    /// Marks the first point under `(x, y)` as dragging. Selection is left
    /// to the caller.
    pub fn begin_drag(&mut self, x: i32, y: i32) -> bool {
        match self.points.iter().position(|p| p.hit_test(x, y)) {
            Some(hit) => {
                for (i, p) in self.points.iter_mut().enumerate() {
                    p.dragging = i == hit;
                }
                true
            }
            None => false,
        }
    }

    pub fn update_drag(&mut self, x: i32, y: i32) {
        if let Some(p) = self.points.iter_mut().find(|p| p.dragging) {
            p.move_to(x, y);
        }
    }

    pub fn end_drag(&mut self) {
        for p in &mut self.points {
            p.dragging = false;
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.points.iter().any(|p| p.dragging)
    }

    pub fn coords(&self) -> [(i32, i32); 4] {
        self.points.map(|p| (p.x, p.y))
    }

    /// `x1,y1,x2,y2,x3,y3,x4,y4,label` with no line terminator.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        for p in &self.points {
            out.push_str(&format!("{},{},", p.x, p.y));
        }
        out.push_str(&self.label);
        out
    }

    pub fn describe(&self) -> String {
        let coords = self
            .points
            .iter()
            .map(|p| format!("({}, {})", p.x, p.y))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Quad {} ([{}])", self.label, coords)
    }

    /// True when opposite edges cross, i.e. the corners were clicked out of
    /// perimeter order.
    pub fn is_self_intersecting(&self) -> bool {
        let c = self.coords();
        segments_cross(c[0], c[1], c[2], c[3]) || segments_cross(c[1], c[2], c[3], c[0])
    }
}

fn orientation(a: (i32, i32), b: (i32, i32), c: (i32, i32)) -> i64 {
    let (ax, ay) = (a.0 as i64, a.1 as i64);
    let (bx, by) = (b.0 as i64, b.1 as i64);
    let (cx, cy) = (c.0 as i64, c.1 as i64);
    ((bx - ax) * (cy - ay) - (by - ay) * (cx - ax)).signum()
}

// Proper crossings only; touching endpoints and collinear overlap don't count.
fn segments_cross(a: (i32, i32), b: (i32, i32), c: (i32, i32), d: (i32, i32)) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);
    o1 * o2 < 0 && o3 * o4 < 0
}
