//! Atom storage and its initialization policies.

use std::f64::consts::TAU;
use std::io::{Read, Write};

use glam::DVec2;
use rand::{rng, rngs::StdRng, Rng, SeedableRng};

use crate::atom::Atom;
use crate::error::{Error, Result};
use crate::params::SimParams;

/// Fixed-size, index-stable collection of atoms plus the canvas extents they
/// bounce in.
///
/// The store is populated exactly once (randomly or from a record stream) and
/// then mutated in place by every tick; it is never resized.
#[derive(Debug)]
pub struct AtomStore {
    params: SimParams,
    pub atoms: Vec<Atom>,
}

impl AtomStore {
    /// Generate `count` atoms with rejection-sampled, non-overlapping
    /// placements.
    ///
    /// Radius, position, speed, heading, and color are drawn uniformly from
    /// the ranges in `params`. Each atom gets `params.placement_attempts`
    /// independent draws; the first whose circle clears every already placed
    /// atom wins. A dense scene can legitimately exhaust the budget, which
    /// fails the whole initialization.
    ///
    /// `seed` pins the generator for reproducible scenes; `None` seeds it
    /// from entropy.
    pub fn random(params: SimParams, count: usize, seed: Option<u64>) -> Result<Self> {
        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let mut atoms: Vec<Atom> = Vec::with_capacity(count);
        for index in 0..count {
            let atom = place_atom(&params, &atoms, &mut rng).ok_or(Error::Placement {
                index,
                attempts: params.placement_attempts,
            })?;
            atoms.push(atom);
        }

        log::info!("generated {} atoms", atoms.len());
        Ok(Self { params, atoms })
    }

    /// Load atoms from a flat numeric record stream.
    ///
    /// The first whitespace-separated token is the atom count; the following
    /// `count` records are `color radius x y vx vy`. Loaded data is taken
    /// as-is: no overlap or bounds checks, that responsibility sits with the
    /// data source. A missing or unparseable field fails with the index of
    /// the offending atom.
    pub fn from_records<R: Read>(params: SimParams, mut reader: R) -> Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let mut tokens = text.split_whitespace();

        let count_tok = tokens.next().unwrap_or("");
        let count = match count_tok.parse::<i64>() {
            Ok(n) if n > 0 => n as usize,
            _ => return Err(Error::Count(count_tok.to_string())),
        };

        let mut atoms = Vec::with_capacity(count);
        for index in 0..count {
            atoms.push(parse_record(index, &mut tokens)?);
        }

        log::info!("loaded {} atoms", atoms.len());
        Ok(Self { params, atoms })
    }

    /// Canvas extents and generation ranges for this run.
    #[inline]
    pub fn params(&self) -> SimParams {
        self.params
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Advance the store by one tick.
    pub fn step(&mut self) {
        crate::stepper::step(&self.params, &mut self.atoms);
    }

    /// Write the initialization report: one `color radius x y vx vy` line
    /// per atom, in sequence order.
    pub fn write_report<W: Write>(&self, mut out: W) -> Result<()> {
        for a in &self.atoms {
            writeln!(
                out,
                "{} {} {} {} {} {}",
                a.color, a.radius, a.position.x, a.position.y, a.velocity.x, a.velocity.y
            )?;
        }
        Ok(())
    }

    /// Total kinetic energy of the scene (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.atoms.iter().map(Atom::kinetic_energy).sum()
    }
}

/// One atom's placement: up to the configured number of independent draws,
/// accepting the first circle that clears every atom placed so far.
fn place_atom(params: &SimParams, placed: &[Atom], rng: &mut StdRng) -> Option<Atom> {
    for _ in 0..params.placement_attempts {
        let radius = rng.random_range(params.r_min..=params.r_max);
        // Sample the center so the circle starts fully inside the canvas.
        let position = DVec2::new(
            rng.random_range(radius..=params.width - radius),
            rng.random_range(radius..=params.height - radius),
        );
        if overlaps_existing(placed, position, radius) {
            continue;
        }

        let speed = rng.random_range(params.v_min..=params.v_max);
        let angle = rng.random_range(0.0..TAU);
        let velocity = speed * DVec2::from_angle(angle);
        let color = rng.random_range(0..=0xFF_FFFFu32);
        return Some(Atom::new(color, radius, position, velocity));
    }
    None
}

fn overlaps_existing(placed: &[Atom], position: DVec2, radius: f64) -> bool {
    placed
        .iter()
        .any(|a| a.position.distance(position) < a.radius + radius)
}

fn parse_record<'a>(index: usize, tokens: &mut impl Iterator<Item = &'a str>) -> Result<Atom> {
    let color_tok = next_field(tokens, index, "color")?;
    let color = color_tok.parse::<u32>().map_err(|_| Error::Record {
        index,
        reason: format!("color {color_tok:?} is not an integer"),
    })?;
    let radius = parse_real(tokens, index, "radius")?;
    let x = parse_real(tokens, index, "x")?;
    let y = parse_real(tokens, index, "y")?;
    let vx = parse_real(tokens, index, "vx")?;
    let vy = parse_real(tokens, index, "vy")?;
    Ok(Atom::new(
        color,
        radius,
        DVec2::new(x, y),
        DVec2::new(vx, vy),
    ))
}

fn next_field<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    index: usize,
    name: &str,
) -> Result<&'a str> {
    tokens.next().ok_or_else(|| Error::Record {
        index,
        reason: format!("missing {name}"),
    })
}

fn parse_real<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    index: usize,
    name: &str,
) -> Result<f64> {
    let tok = next_field(tokens, index, name)?;
    tok.parse::<f64>().map_err(|_| Error::Record {
        index,
        reason: format!("{name} {tok:?} is not a number"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_atom_never_exhausts_placement() -> Result<()> {
        // With nothing to intersect, the first draw is always accepted.
        for seed in 0..64 {
            let store = AtomStore::random(SimParams::default(), 1, Some(seed))?;
            assert_eq!(store.len(), 1);
        }
        Ok(())
    }

    #[test]
    fn random_atoms_start_inside_and_apart() {
        let params = SimParams::default();
        // Not every seed can place 10 atoms in 3 attempts each; that failure
        // mode is legitimate, so scan for a seed that succeeds.
        let store = (0..100)
            .find_map(|s| AtomStore::random(params, 10, Some(s)).ok())
            .expect("some seed should place 10 atoms");

        for a in &store.atoms {
            assert!(a.radius >= params.r_min && a.radius <= params.r_max);
            assert!(a.position.x >= a.radius && a.position.x <= params.width - a.radius);
            assert!(a.position.y >= a.radius && a.position.y <= params.height - a.radius);
            let speed = a.velocity.length();
            assert!(speed >= params.v_min - 1e-9 && speed <= params.v_max + 1e-9);
            assert!(a.color <= 0xFF_FFFF);
        }
        for i in 0..store.len() {
            for j in (i + 1)..store.len() {
                let (a, b) = (&store.atoms[i], &store.atoms[j]);
                assert!(a.position.distance(b.position) >= a.radius + b.radius);
            }
        }
    }

    #[test]
    fn loads_records_verbatim() -> Result<()> {
        let input = "2\n16711680 10 100 200 1.5 -2\n255 30.5 320 240 0 4\n";
        let store = AtomStore::from_records(SimParams::default(), input.as_bytes())?;
        assert_eq!(store.len(), 2);
        assert_eq!(store.atoms[0].color, 16711680);
        assert_eq!(store.atoms[0].position, DVec2::new(100.0, 200.0));
        assert_eq!(store.atoms[0].velocity, DVec2::new(1.5, -2.0));
        assert_eq!(store.atoms[1].radius, 30.5);
        Ok(())
    }

    #[test]
    fn bad_count_is_fatal() {
        for input in ["", "abc", "0", "-3"] {
            let err = AtomStore::from_records(SimParams::default(), input.as_bytes()).unwrap_err();
            assert!(matches!(err, Error::Count(_)), "input {input:?}");
        }
    }

    #[test]
    fn malformed_record_names_the_index() {
        // Second record has a non-numeric radius.
        let input = "2\n255 10 100 100 1 0\n255 oops 200 200 0 1\n";
        let err = AtomStore::from_records(SimParams::default(), input.as_bytes()).unwrap_err();
        match err {
            Error::Record { index, .. } => assert_eq!(index, 1),
            other => panic!("expected Record error, got {other}"),
        }
    }

    #[test]
    fn truncated_record_names_the_index() {
        let input = "1\n255 10 100\n";
        let err = AtomStore::from_records(SimParams::default(), input.as_bytes()).unwrap_err();
        match err {
            Error::Record { index, reason } => {
                assert_eq!(index, 0);
                assert!(reason.contains("missing"));
            }
            other => panic!("expected Record error, got {other}"),
        }
    }

    #[test]
    fn report_lists_fields_in_record_order() -> Result<()> {
        let input = "2\n255 10 100.5 200 1.5 -2\n65280 20 300 400 0 3\n";
        let store = AtomStore::from_records(SimParams::default(), input.as_bytes())?;
        let mut out = Vec::new();
        store.write_report(&mut out)?;
        let report = String::from_utf8(out).expect("report is utf-8");
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines, ["255 10 100.5 200 1.5 -2", "65280 20 300 400 0 3"]);
        Ok(())
    }
}
