//! The atom value type.

use glam::DVec2;

/// A rigid circular body with a packed 24-bit RGB color.
///
/// Atoms live in an index-stable sequence owned by the store; position is
/// mutated every tick, velocity on every wall or pairwise collision, and
/// `color`/`radius` are fixed after creation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atom {
    /// Packed 0xRRGGBB color.
    pub color: u32,
    /// Radius in pixels (> 0).
    pub radius: f64,
    /// Center position.
    pub position: DVec2,
    /// Velocity in pixels per tick.
    pub velocity: DVec2,
}

impl Atom {
    pub fn new(color: u32, radius: f64, position: DVec2, velocity: DVec2) -> Self {
        Self {
            color,
            radius,
            position,
            velocity,
        }
    }

    /// Collision mass, proportional to the disc area (radius squared).
    ///
    /// This is a weighting for momentum exchange, not a physical mass.
    #[inline]
    pub fn mass(&self) -> f64 {
        self.radius * self.radius
    }

    /// Top-left corner of the bounding square, the anchor the drawing side
    /// expects for a filled circle.
    #[inline]
    pub fn top_left(&self) -> DVec2 {
        self.position - DVec2::splat(self.radius)
    }

    /// Bounding-square side length.
    #[inline]
    pub fn diameter(&self) -> f64 {
        2.0 * self.radius
    }

    /// Kinetic energy under the area-proportional mass model: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass() * self.velocity.length_squared()
    }

    /// Unpack the color into sRGB components in [0, 1].
    pub fn rgb(&self) -> [f32; 3] {
        [
            ((self.color >> 16) & 0xFF) as f32 / 255.0,
            ((self.color >> 8) & 0xFF) as f32 / 255.0,
            (self.color & 0xFF) as f32 / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_is_radius_squared() {
        let a = Atom::new(0, 3.0, DVec2::ZERO, DVec2::ZERO);
        assert_eq!(a.mass(), 9.0);
    }

    #[test]
    fn bounding_box_anchors_top_left() {
        let a = Atom::new(0, 10.0, DVec2::new(100.0, 50.0), DVec2::ZERO);
        assert_eq!(a.top_left(), DVec2::new(90.0, 40.0));
        assert_eq!(a.diameter(), 20.0);
    }

    #[test]
    fn rgb_unpacks_channels() {
        let a = Atom::new(0xFF_80_00, 1.0, DVec2::ZERO, DVec2::ZERO);
        let [r, g, b] = a.rgb();
        assert_eq!(r, 1.0);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
    }
}
