//! Container boundary metric
//!
//! Every shape maps a point in shading space to a scalar where `1.0` is the
//! container wall and anything greater is outside the liquid.

use super::sign;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

const SQRT_3: f64 = 1.732_050_807_568_877_2;
const HEX_COS_30: f64 = 0.866_025;

/// Container geometry. Also selects the lattice family used above 12 Hz.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerShape {
    #[default]
    Circle,
    Square,
    Triangle,
    Hexagon,
}

impl ContainerShape {
    pub const ALL: [ContainerShape; 4] = [
        ContainerShape::Circle,
        ContainerShape::Square,
        ContainerShape::Triangle,
        ContainerShape::Hexagon,
    ];

    /// Boundary metric: `1.0` on the wall, `> 1.0` outside.
    #[inline]
    pub fn distance(self, p: Vector2<f64>) -> f64 {
        match self {
            ContainerShape::Circle => p.norm(),
            ContainerShape::Square => p.x.abs().max(p.y.abs()),
            ContainerShape::Triangle => triangle_metric(p),
            ContainerShape::Hexagon => {
                let q = p.abs();
                q.y.max(q.x * HEX_COS_30 + q.y * 0.5)
            }
        }
    }

    /// True for points strictly beyond the wall.
    #[inline]
    pub fn is_outside(self, p: Vector2<f64>) -> bool {
        self.distance(p) > 1.0
    }

    pub fn name(self) -> &'static str {
        match self {
            ContainerShape::Circle => "circle",
            ContainerShape::Square => "square",
            ContainerShape::Triangle => "triangle",
            ContainerShape::Hexagon => "hexagon",
        }
    }
}

impl fmt::Display for ContainerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ContainerShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(ContainerShape::Circle),
            "square" => Ok(ContainerShape::Square),
            "triangle" => Ok(ContainerShape::Triangle),
            "hexagon" => Ok(ContainerShape::Hexagon),
            other => Err(format!("unknown container shape '{other}'")),
        }
    }
}

/// Equilateral-triangle signed distance with a visually tuned remap.
///
/// The output is not a normalized distance. It is monotonic near the wall and
/// crosses 1.0 where the rendered edge sits; the interior falloff is a design
/// constant and must not be "corrected".
fn triangle_metric(p: Vector2<f64>) -> f64 {
    let p = p * 1.2;
    let mut x = p.x.abs() - 1.0;
    let mut y = p.y + 1.0 / SQRT_3;
    if x + SQRT_3 * y > 0.0 {
        let (nx, ny) = ((x - SQRT_3 * y) / 2.0, (-SQRT_3 * x - y) / 2.0);
        x = nx;
        y = ny;
    }
    x -= x.clamp(-2.0, 0.0);
    -(x * x + y * y).sqrt() * sign(y) * 2.0 + 1.0
}
