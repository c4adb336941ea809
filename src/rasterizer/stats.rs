//! Rendering statistics

use std::fmt::{self, Display, Formatter};
use std::ops::{Add, AddAssign};
use std::time::Duration;

/// Collects and accumulates rendering statistics
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stats {
    /// Time spent in `render`
    pub time: Duration,
    /// Number of render calls
    pub renders: usize,
    /// Vertex shader invocations
    pub vertices: usize,
    /// Triangles submitted by the index buffer / handed to the rasterizer
    pub triangles: Throughput,
    /// Fragments covered / written after the depth test
    pub fragments: Throughput,
    /// Triangles that needed clipping
    pub clipped: usize,
    /// Triangles entirely outside the clip volume
    pub hidden: usize,
    /// Triangles rejected by face culling
    pub culled: usize,
    /// Zero-area triangles skipped
    pub degenerate: usize,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Throughput {
    // Count of items submitted
    pub i: usize,
    // Count of items output
    pub o: usize,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Add for Throughput {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            i: self.i + other.i,
            o: self.o + other.o,
        }
    }
}

impl AddAssign for Throughput {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.time += other.time;
        self.renders += other.renders;
        self.vertices += other.vertices;
        self.triangles += other.triangles;
        self.fragments += other.fragments;
        self.clipped += other.clipped;
        self.hidden += other.hidden;
        self.culled += other.culled;
        self.degenerate += other.degenerate;
    }
}

impl Display for Throughput {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} in / {} out", self.i, self.o)
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "renders:    {}", self.renders)?;
        writeln!(f, "time:       {:.3} ms", self.time.as_secs_f64() * 1000.0)?;
        writeln!(f, "vertices:   {}", self.vertices)?;
        writeln!(f, "triangles:  {}", self.triangles)?;
        writeln!(
            f,
            "            {} clipped, {} hidden, {} culled, {} degenerate",
            self.clipped, self.hidden, self.culled, self.degenerate
        )?;
        write!(f, "fragments:  {}", self.fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate() {
        let mut total = Stats::new();
        let one = Stats {
            renders: 1,
            triangles: Throughput { i: 2, o: 3 },
            fragments: Throughput { i: 100, o: 40 },
            clipped: 1,
            ..Stats::default()
        };
        total += one.clone();
        total += one;
        assert_eq!(total.renders, 2);
        assert_eq!(total.triangles, Throughput { i: 4, o: 6 });
        assert_eq!(total.fragments.o, 80);
        assert_eq!(total.clipped, 2);
    }

    #[test]
    fn test_display() {
        let s = Stats {
            fragments: Throughput { i: 10, o: 7 },
            ..Stats::default()
        };
        assert!(s.to_string().contains("fragments:  10 in / 7 out"));
    }
}
