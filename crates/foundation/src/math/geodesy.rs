use super::Vec3;

/// Angular tolerance (radians) below which two directions are treated as equal.
const ANGLE_EPSILON: f64 = 1e-9;

/// Geographic position on the unit sphere, in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// Unit vector for this position (x towards lon 0, z towards the north pole).
    pub fn to_unit(self) -> Vec3 {
        let lon = self.lon_deg.to_radians();
        let lat = self.lat_deg.to_radians();
        let cos_lat = lat.cos();
        Vec3::new(cos_lat * lon.cos(), cos_lat * lon.sin(), lat.sin())
    }

    /// Position of a direction vector. The vector does not need to be normalized.
    pub fn from_vector(v: Vec3) -> Self {
        let lon = v.y.atan2(v.x);
        let lat = v.z.atan2((v.x * v.x + v.y * v.y).sqrt());
        Self::new(lon.to_degrees(), lat.to_degrees())
    }

    /// Both components negated.
    ///
    /// An orthographic rotation of `(-lon, -lat)` brings `(lon, lat)` to the view centre.
    pub fn negated(self) -> Self {
        Self::new(-self.lon_deg, -self.lat_deg)
    }
}

/// Angle between two unit vectors, robust for small and near-opposite angles.
pub fn angle_between(a: Vec3, b: Vec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Constant-speed path along the shorter great-circle arc between two positions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GreatCircle {
    from: Vec3,
    /// Unit vector orthogonal to `from` in the plane of the arc.
    ortho: Vec3,
    angle: f64,
}

impl GreatCircle {
    pub fn new(from: LonLat, to: LonLat) -> Self {
        let a = from.to_unit();
        let b = to.to_unit();
        let angle = angle_between(a, b);

        let ortho = if angle < ANGLE_EPSILON {
            Vec3::default()
        } else if std::f64::consts::PI - angle < ANGLE_EPSILON {
            // Opposite points: every great circle joins them. Head due east so
            // the path never rises above the start latitude; from a pole any
            // meridian will do.
            Vec3::new(0.0, 0.0, 1.0)
                .cross(a)
                .normalized()
                .unwrap_or(Vec3::new(1.0, 0.0, 0.0))
        } else {
            // Component of b orthogonal to a.
            (b - a.scale(a.dot(b))).normalized().unwrap_or_default()
        };

        Self {
            from: a,
            ortho,
            angle,
        }
    }

    /// Arc length in degrees.
    pub fn angle_deg(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// Position at fraction `t` of the arc. `t` is not clamped.
    pub fn at(&self, t: f64) -> LonLat {
        if self.angle < ANGLE_EPSILON {
            return LonLat::from_vector(self.from);
        }
        let theta = self.angle * t;
        let v = self.from.scale(theta.cos()) + self.ortho.scale(theta.sin());
        LonLat::from_vector(v)
    }
}

/// Spherical centroid of a set of polygons (each a list of rings, each ring a
/// list of positions).
///
/// Rings follow the spherical winding convention of the world atlas data:
/// exterior rings are clockwise when seen from outside the sphere. Polygons are
/// weighted by their spherical area. Degenerate input (zero area) falls back to
/// the length-weighted centroid of the ring edges, then to the mean of the
/// vertices. Returns `None` when there is no vertex at all.
pub fn spherical_centroid<'a, I, R>(polygons: I) -> Option<LonLat>
where
    I: IntoIterator<Item = &'a [R]>,
    R: AsRef<[LonLat]> + 'a,
{
    let mut area = Vec3::default();
    let mut line = Vec3::default();
    let mut line_weight = 0.0;
    let mut points = Vec3::default();
    let mut point_count = 0usize;

    for rings in polygons {
        for ring in rings {
            let ring: &[LonLat] = ring.as_ref();
            let Some(first) = ring.first() else {
                continue;
            };
            let first = first.to_unit();
            let mut prev = first;
            points += first;
            point_count += 1;

            let closing = ring.first() != ring.last();
            let rest = ring[1..].iter().map(|p| p.to_unit());
            let edges = rest.chain(closing.then_some(first));
            for next in edges {
                let cross = prev.cross(next);
                let m = cross.length();
                let w = m.atan2(prev.dot(next));
                if m > 0.0 {
                    area += cross.scale(-w / m);
                }
                line_weight += w;
                line += (prev + next).scale(w);
                points += next;
                point_count += 1;
                prev = next;
            }
        }
    }

    if point_count == 0 {
        return None;
    }
    if area.length() > 1e-12 {
        return Some(LonLat::from_vector(area));
    }
    if line_weight > ANGLE_EPSILON && line.length() > 1e-12 {
        return Some(LonLat::from_vector(line));
    }
    points.normalized().map(LonLat::from_vector)
}
