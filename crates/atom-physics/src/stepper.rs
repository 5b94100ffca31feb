//! One discrete simulation tick: integration, wall reflection, and pairwise
//! elastic collision resolution.

use glam::DVec2;

use crate::atom::Atom;
use crate::params::SimParams;

/// Advance every atom by one tick.
///
/// Integration and wall reflection are per-atom and order-insensitive.
/// Pairwise resolution walks ascending index pairs in sequence order, so an
/// atom's state may already have been mutated by an earlier pair within the
/// same tick. That ordering is part of the model: it keeps the update
/// deterministic, and must not be replaced by a simultaneous-update scheme.
pub fn step(params: &SimParams, atoms: &mut [Atom]) {
    for atom in atoms.iter_mut() {
        atom.position += atom.velocity;
        reflect_walls(params, atom);
    }
    resolve_pairs(atoms);
}

/// Reflect off the canvas walls, one axis at a time.
///
/// A leading edge at or past a wall snaps the center to the exact tangent
/// position and flips that axis's velocity component. Both axes can fire in
/// the same tick (corner hit).
fn reflect_walls(params: &SimParams, atom: &mut Atom) {
    let r = atom.radius;
    let extent = DVec2::new(params.width, params.height);
    for axis in 0..2 {
        let c = atom.position[axis];
        if c - r <= 0.0 {
            atom.position[axis] = r;
            atom.velocity[axis] = -atom.velocity[axis];
        } else if c + r >= extent[axis] {
            atom.position[axis] = extent[axis] - r;
            atom.velocity[axis] = -atom.velocity[axis];
        }
    }
}

/// Resolve every overlapping unordered pair once, in ascending index order.
///
/// Single pass, no relaxation: a cluster of three or more mutually
/// overlapping atoms may keep a small residual overlap after the tick.
fn resolve_pairs(atoms: &mut [Atom]) {
    for i in 0..atoms.len() {
        for j in (i + 1)..atoms.len() {
            let delta = atoms[j].position - atoms[i].position;
            let dist = delta.length();
            let r_sum = atoms[i].radius + atoms[j].radius;
            if dist >= r_sum {
                continue;
            }

            // Coincident centers have no separation direction; fall back to
            // a fixed unit axis instead of dividing by zero.
            let normal = if dist > 0.0 { delta / dist } else { DVec2::X };

            // Push only the higher-index atom out to exact tangency.
            atoms[j].position += normal * (r_sum - dist);

            exchange_momentum(atoms, i, j, normal);
        }
    }
}

/// 1-D elastic collision along the contact normal with radius-squared
/// masses; tangential components pass through untouched (frictionless).
fn exchange_momentum(atoms: &mut [Atom], i: usize, j: usize, normal: DVec2) {
    let tangent = normal.perp();
    let (m_i, m_j) = (atoms[i].mass(), atoms[j].mass());

    let v_i_n = atoms[i].velocity.dot(normal);
    let v_j_n = atoms[j].velocity.dot(normal);
    let v_i_t = atoms[i].velocity.dot(tangent);
    let v_j_t = atoms[j].velocity.dot(tangent);

    // Normal-axis velocities reflect through the two-body center-of-mass
    // velocity: v' = 2*v_com - v.
    let v_com = (m_i * v_i_n + m_j * v_j_n) / (m_i + m_j);

    atoms[i].velocity = normal * (2.0 * v_com - v_i_n) + tangent * v_i_t;
    atoms[j].velocity = normal * (2.0 * v_com - v_j_n) + tangent * v_j_t;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(radius: f64, pos: (f64, f64), vel: (f64, f64)) -> Atom {
        Atom::new(0, radius, DVec2::new(pos.0, pos.1), DVec2::new(vel.0, vel.1))
    }

    #[test]
    fn left_wall_reflection_is_exact() {
        // Already past the left boundary by construction: one tick clamps the
        // center to the radius and mirrors vx.
        let params = SimParams::default();
        let mut atoms = vec![atom(10.0, (5.0, 100.0), (-2.0, 0.0))];
        step(&params, &mut atoms);
        assert_eq!(atoms[0].position, DVec2::new(10.0, 100.0));
        assert_eq!(atoms[0].velocity, DVec2::new(2.0, 0.0));
    }

    #[test]
    fn corner_hit_reflects_both_axes() {
        let params = SimParams::default();
        let mut atoms = vec![atom(10.0, (12.0, 12.0), (-4.0, -4.0))];
        step(&params, &mut atoms);
        assert_eq!(atoms[0].position, DVec2::new(10.0, 10.0));
        assert_eq!(atoms[0].velocity, DVec2::new(4.0, 4.0));
    }

    #[test]
    fn right_and_bottom_walls_clamp_to_tangency() {
        let params = SimParams::default();
        let mut atoms = vec![atom(10.0, (636.0, 476.0), (3.0, 2.0))];
        step(&params, &mut atoms);
        assert_eq!(atoms[0].position, DVec2::new(630.0, 470.0));
        assert_eq!(atoms[0].velocity, DVec2::new(-3.0, -2.0));
    }

    #[test]
    fn equal_mass_head_on_collision_swaps_velocities() {
        // Radii 10 and 10, centers 18 apart, closing at 1 each: after one
        // tick the pair separates to exact tangency along x and the equal
        // masses swap their normal-axis velocities.
        let params = SimParams::default();
        let mut atoms = vec![
            atom(10.0, (100.0, 100.0), (1.0, 0.0)),
            atom(10.0, (118.0, 100.0), (-1.0, 0.0)),
        ];
        step(&params, &mut atoms);

        let gap = atoms[1].position - atoms[0].position;
        assert!((gap.x - 20.0).abs() < 1e-12);
        assert_eq!(gap.y, 0.0);
        assert!((atoms[0].velocity.x - -1.0).abs() < 1e-12);
        assert!((atoms[1].velocity.x - 1.0).abs() < 1e-12);
        assert_eq!(atoms[0].velocity.y, 0.0);
        assert_eq!(atoms[1].velocity.y, 0.0);
    }

    #[test]
    fn only_the_higher_index_atom_is_repositioned() {
        let params = SimParams::default();
        let mut atoms = vec![
            atom(10.0, (100.0, 100.0), (0.0, 0.0)),
            atom(10.0, (115.0, 100.0), (0.0, 0.0)),
        ];
        step(&params, &mut atoms);
        // Atom 0 never moves during positional correction.
        assert_eq!(atoms[0].position, DVec2::new(100.0, 100.0));
        assert!((atoms[1].position.x - 120.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_centers_separate_along_x() {
        let params = SimParams::default();
        let mut atoms = vec![
            atom(10.0, (200.0, 200.0), (0.0, 0.0)),
            atom(10.0, (200.0, 200.0), (0.0, 0.0)),
        ];
        step(&params, &mut atoms);
        assert_eq!(atoms[0].position, DVec2::new(200.0, 200.0));
        assert_eq!(atoms[1].position, DVec2::new(220.0, 200.0));
    }

    #[test]
    fn tangential_component_is_untouched() {
        // Collision normal is x; atom 1's y-velocity must survive the
        // exchange unchanged.
        let params = SimParams::default();
        let mut atoms = vec![
            atom(10.0, (100.0, 100.0), (1.0, 0.0)),
            atom(10.0, (118.0, 100.0), (-1.0, 3.0)),
        ];
        step(&params, &mut atoms);
        assert!((atoms[1].velocity.y - 3.0).abs() < 1e-12);
        assert!((atoms[0].velocity.y - 0.0).abs() < 1e-12);
    }

    #[test]
    fn unequal_masses_weight_the_exchange() {
        // r = 10 vs r = 20 head-on along x. Masses 100 and 400.
        let params = SimParams::default();
        let mut atoms = vec![
            atom(10.0, (100.0, 100.0), (2.0, 0.0)),
            atom(20.0, (126.0, 100.0), (-1.0, 0.0)),
        ];
        let p_before: f64 = atoms.iter().map(|a| a.mass() * a.velocity.x).sum();
        let e_before: f64 = atoms.iter().map(Atom::kinetic_energy).sum();
        step(&params, &mut atoms);
        let p_after: f64 = atoms.iter().map(|a| a.mass() * a.velocity.x).sum();
        let e_after: f64 = atoms.iter().map(Atom::kinetic_energy).sum();
        assert!((p_before - p_after).abs() < 1e-9);
        assert!((e_before - e_after).abs() < 1e-9);
    }
}
