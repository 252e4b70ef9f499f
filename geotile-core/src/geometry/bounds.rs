/// A 2-D axis-aligned bounding box, as returned by
/// [`crate::containers::PointView::calculate_bounds`] when `is_3d` is false.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box2D {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Box2D {
    pub fn empty() -> Self {
        Self {
            minx: f64::INFINITY,
            miny: f64::INFINITY,
            maxx: f64::NEG_INFINITY,
            maxy: f64::NEG_INFINITY,
        }
    }

    pub fn grow(&mut self, x: f64, y: f64) {
        self.minx = self.minx.min(x);
        self.miny = self.miny.min(y);
        self.maxx = self.maxx.max(x);
        self.maxy = self.maxy.max(y);
    }
}

/// A 3-D axis-aligned bounding box, the default return type of
/// [`crate::containers::PointView::calculate_bounds`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Box3D {
    pub minx: f64,
    pub miny: f64,
    pub minz: f64,
    pub maxx: f64,
    pub maxy: f64,
    pub maxz: f64,
}

impl Box3D {
    pub fn empty() -> Self {
        Self {
            minx: f64::INFINITY,
            miny: f64::INFINITY,
            minz: f64::INFINITY,
            maxx: f64::NEG_INFINITY,
            maxy: f64::NEG_INFINITY,
            maxz: f64::NEG_INFINITY,
        }
    }

    pub fn grow(&mut self, x: f64, y: f64, z: f64) {
        self.minx = self.minx.min(x);
        self.miny = self.miny.min(y);
        self.minz = self.minz.min(z);
        self.maxx = self.maxx.max(x);
        self.maxy = self.maxy.max(y);
        self.maxz = self.maxz.max(z);
    }
}
