//! Comparison of a rendered image against a reference

use std::fmt::{self, Display, Formatter};

use thiserror::Error;

use crate::rasterizer::{Color, Pixel};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    #[error("image is {actual:?} but the solution is {expected:?}")]
    SizeMismatch {
        actual: (usize, usize),
        expected: (usize, usize),
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Comparison {
    pub width: usize,
    pub height: usize,
    /// Pixels with any channel off by more than the tolerance
    pub mismatched: usize,
    /// Largest per-channel difference seen
    pub max_error: u8,
}

impl Comparison {
    pub fn total(&self) -> usize {
        self.width * self.height
    }

    pub fn percent(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            n => 100.0 * self.mismatched as f64 / n as f64,
        }
    }

    pub fn is_match(&self) -> bool {
        self.mismatched == 0
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(
            f,
            "mismatched: {} of {} pixels ({:.2}%)",
            self.mismatched,
            self.total(),
            self.percent()
        )?;
        writeln!(f, "max error:  {}", self.max_error)
    }
}

/// Compares two same-sized images channel by channel.
pub fn compare(
    actual: &[Pixel],
    expected: &[Pixel],
    actual_dims: (usize, usize),
    expected_dims: (usize, usize),
    tolerance: u8,
) -> Result<Comparison, CompareError> {
    let size_mismatch = CompareError::SizeMismatch {
        actual: actual_dims,
        expected: expected_dims,
    };
    if actual_dims != expected_dims {
        return Err(size_mismatch);
    }
    let (width, height) = actual_dims;
    if actual.len() != width * height || expected.len() != width * height {
        return Err(size_mismatch);
    }

    let mut cmp = Comparison {
        width,
        height,
        ..Comparison::default()
    };
    for (&a, &e) in actual.iter().zip(expected) {
        let a = Color::from_u32(a).to_bytes();
        let e = Color::from_u32(e).to_bytes();
        let err = a.iter().zip(&e).map(|(x, y)| x.abs_diff(*y)).max().unwrap_or(0);
        cmp.max_error = cmp.max_error.max(err);
        if err > tolerance {
            cmp.mismatched += 1;
        }
    }
    Ok(cmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let img = [Color::RED, Color::BLUE].map(Color::to_u32);
        let cmp = compare(&img, &img, (2, 1), (2, 1), 0).unwrap();
        assert!(cmp.is_match());
        assert_eq!(cmp.max_error, 0);
    }

    #[test]
    fn test_tolerance() {
        let a = [Color::new(100, 100, 100), Color::new(10, 0, 0)].map(Color::to_u32);
        let b = [Color::new(102, 100, 99), Color::new(0, 0, 0)].map(Color::to_u32);

        let cmp = compare(&a, &b, (1, 2), (1, 2), 0).unwrap();
        assert_eq!(cmp.mismatched, 2);
        assert_eq!(cmp.max_error, 10);
        assert_eq!(cmp.percent(), 100.0);

        let cmp = compare(&a, &b, (1, 2), (1, 2), 2).unwrap();
        assert_eq!(cmp.mismatched, 1);
        assert_eq!(cmp.to_string(), "mismatched: 1 of 2 pixels (50.00%)\nmax error:  10\n");
    }

    #[test]
    fn test_size_mismatch() {
        assert_eq!(
            compare(&[0; 4], &[0; 4], (2, 2), (4, 1), 0),
            Err(CompareError::SizeMismatch {
                actual: (2, 2),
                expected: (4, 1)
            })
        );
    }
}
