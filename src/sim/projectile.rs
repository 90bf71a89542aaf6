//! Bullets fired by ranged weapons

use glam::Vec2;

/// A bullet in flight
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Unit travel direction
    pub dir: Vec2,
    /// Seconds since spawn
    pub age: f32,
    pub damage: u32,
    /// Cleared on hit or expiry; never set again
    pub active: bool,
}

impl Projectile {
    pub fn new(id: u32, origin: Vec2, dir: Vec2, damage: u32) -> Self {
        Self {
            id,
            pos: origin,
            dir: dir.normalize_or_zero(),
            age: 0.0,
            damage,
            active: true,
        }
    }

    /// Move along the flight line and expire past `lifetime`
    pub fn advance(&mut self, dt: f32, speed: f32, lifetime: f32) {
        if !self.active {
            return;
        }
        self.pos += self.dir * speed * dt;
        self.age += dt;
        if self.age > lifetime {
            self.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_expire() {
        let mut p = Projectile::new(1, Vec2::ZERO, Vec2::new(0.0, 2.0), 25);
        assert_eq!(p.dir, Vec2::new(0.0, 1.0));

        p.advance(0.5, 40.0, 2.0);
        assert!((p.pos.y - 20.0).abs() < 1e-4);
        assert!(p.active);

        p.advance(1.5, 40.0, 2.0);
        assert!(p.active, "exactly at lifetime is still alive");

        p.advance(0.1, 40.0, 2.0);
        assert!(!p.active);

        // Inactive bullets stay put
        let pos = p.pos;
        p.advance(1.0, 40.0, 2.0);
        assert_eq!(p.pos, pos);
    }
}
