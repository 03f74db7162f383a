use crate::error::Error;
use ordered_float::NotNan;

fn not_nan(value: f32) -> Result<f32, Error> {
    NotNan::new(value)
        .map(NotNan::into_inner)
        .map_err(|e| Error::ConstructNotNan(e, value))
}

/// A location in the pixel space of the source frame. Image-space y grows
/// downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Result<Self, Error> {
        Ok(Self {
            x: not_nan(x)?,
            y: not_nan(y)?,
        })
    }

    /// Map a point given as fractions of the frame onto a `width` x `height`
    /// pixel frame.
    pub fn scaled(self, width: f32, height: f32) -> Self {
        Self {
            x: self.x * width,
            y: self.y * height,
        }
    }

    /// Planar Euclidean distance. No normalization by body scale.
    pub fn distance(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Strictly higher on screen than `other`.
    pub fn is_above(self, other: Self) -> bool {
        self.y < other.y
    }

    /// Strictly lower on screen than `other`.
    pub fn is_below(self, other: Self) -> bool {
        self.y > other.y
    }

    #[inline]
    pub fn x(self) -> f32 {
        self.x
    }

    #[inline]
    pub fn y(self) -> f32 {
        self.y
    }
}
