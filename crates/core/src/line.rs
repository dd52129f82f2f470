//! Operating lines and the feed (q-) line.
//!
//! An absorber has a single operating line. A distillation column has a
//! rectifying line above the feed and a stripping line below it; the two meet
//! on the feed line at the section switch point.

use serde::Serialize;
use thiserror::Error;

/// Denominators smaller than this are treated as zero.
const DEGENERATE: f64 = 1e-12;

/// Errors from line construction and inversion.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LineError {
    #[error("degenerate slope: {context}")]
    Degenerate { context: &'static str },

    #[error("reflux ratio must be finite and positive, got {0}")]
    InvalidReflux(f64),
}

/// A straight operating line `y = slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperatingLine {
    pub slope: f64,
    pub intercept: f64,
}

impl OperatingLine {
    #[must_use]
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// The line through two points.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::Degenerate`] if the points share an x coordinate.
    pub fn through(a: (f64, f64), b: (f64, f64)) -> Result<Self, LineError> {
        let dx = b.0 - a.0;
        if dx.abs() < DEGENERATE {
            return Err(LineError::Degenerate {
                context: "line through two points with equal x",
            });
        }
        let slope = (b.1 - a.1) / dx;
        Ok(Self::new(slope, a.1 - slope * a.0))
    }

    /// Evaluates the line at `x`.
    #[must_use]
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Solves the line for x at `y`.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::Degenerate`] if the line is horizontal.
    pub fn inverse(&self, y: f64) -> Result<f64, LineError> {
        if self.slope.abs() < DEGENERATE {
            return Err(LineError::Degenerate {
                context: "inverting a horizontal operating line",
            });
        }
        Ok((y - self.intercept) / self.slope)
    }

    /// The point where two lines cross.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::Degenerate`] if the lines are parallel.
    pub fn intersection(&self, other: &Self) -> Result<(f64, f64), LineError> {
        let denom = self.slope - other.slope;
        if denom.abs() < DEGENERATE {
            return Err(LineError::Degenerate {
                context: "intersection of parallel lines",
            });
        }
        let x = (other.intercept - self.intercept) / denom;
        Ok((x, self.at(x)))
    }
}

/// The feed line, determined by the feed quality `q`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedLine {
    /// Saturated liquid feed (`q = 1`): the line `x = x_feed`.
    Vertical { x: f64 },
    /// Any other thermal condition.
    Sloped(OperatingLine),
}

impl FeedLine {
    /// Builds the q-line through `(x_feed, x_feed)`.
    ///
    /// The line is vertical when `q` is within `1e-12` of one; otherwise it
    /// has slope `q/(q−1)` and intercept `−x_feed/(q−1)`.
    #[must_use]
    pub fn from_quality(q: f64, x_feed: f64) -> Self {
        if (q - 1.0).abs() < DEGENERATE {
            Self::Vertical { x: x_feed }
        } else {
            Self::Sloped(OperatingLine::new(q / (q - 1.0), -x_feed / (q - 1.0)))
        }
    }

    /// The point where this feed line crosses `line`.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::Degenerate`] if the lines are parallel.
    pub fn intersection(&self, line: &OperatingLine) -> Result<(f64, f64), LineError> {
        match self {
            Self::Vertical { x } => Ok((*x, line.at(*x))),
            Self::Sloped(feed) => line.intersection(feed),
        }
    }
}

/// A column section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Rectifying,
    Stripping,
}

/// Rectifying and stripping lines joined on the feed line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectionedLines {
    pub rectifying: OperatingLine,
    pub stripping: OperatingLine,
    pub feed: FeedLine,
    /// Where the rectifying line meets the feed line.
    pub switch: (f64, f64),
}

impl SectionedLines {
    /// Builds the operating lines of a column running at `reflux`.
    ///
    /// The rectifying line passes through `(x_distillate, x_distillate)` with
    /// slope `R/(R+1)`. The stripping line passes through
    /// `(x_bottoms, x_bottoms)` and the switch point.
    ///
    /// # Errors
    ///
    /// Returns an error if the reflux ratio is not positive, if the feed line
    /// is parallel to the rectifying line, or if the switch point lands on the
    /// bottoms composition.
    pub fn from_reflux(
        reflux: f64,
        x_distillate: f64,
        x_bottoms: f64,
        feed: FeedLine,
    ) -> Result<Self, LineError> {
        if !reflux.is_finite() || reflux <= 0.0 {
            return Err(LineError::InvalidReflux(reflux));
        }

        let rectifying = OperatingLine::new(reflux / (reflux + 1.0), x_distillate / (reflux + 1.0));
        let switch = feed.intersection(&rectifying)?;
        let stripping = OperatingLine::through((x_bottoms, x_bottoms), switch).map_err(|_| {
            LineError::Degenerate {
                context: "feed intersection coincides with the bottoms composition",
            }
        })?;

        Ok(Self {
            rectifying,
            stripping,
            feed,
            switch,
        })
    }

    /// The line that governs `section`.
    #[must_use]
    pub fn line(&self, section: Section) -> &OperatingLine {
        match section {
            Section::Rectifying => &self.rectifying,
            Section::Stripping => &self.stripping,
        }
    }
}

/// The operating line(s) for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineSet {
    Single(OperatingLine),
    Sectioned(SectionedLines),
}

impl LineSet {
    /// The line active in `section`; a single line is active everywhere.
    #[must_use]
    pub fn line(&self, section: Option<Section>) -> &OperatingLine {
        match (self, section) {
            (Self::Single(line), _) => line,
            (Self::Sectioned(lines), Some(section)) => lines.line(section),
            (Self::Sectioned(lines), None) => &lines.rectifying,
        }
    }

    /// The section a stage at `x` belongs to, given the previous stage's.
    ///
    /// Once a run has crossed into the stripping section it stays there.
    #[must_use]
    pub fn section_for(&self, x: f64, previous: Option<Section>) -> Option<Section> {
        match self {
            Self::Single(_) => None,
            Self::Sectioned(lines) => {
                let rectifying = previous != Some(Section::Stripping)
                    && x > lines.switch.0 + DEGENERATE;
                Some(if rectifying {
                    Section::Rectifying
                } else {
                    Section::Stripping
                })
            }
        }
    }
}
