/// Resampling used when the view transform is not a pixel-aligned translation.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    NearestNeighbor,
    #[default]
    Bilinear,
}

impl Interpolation {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "nearest_neighbor" | "nearestneighbor" => Some(Self::NearestNeighbor),
            "bilinear" | "linear" => Some(Self::Bilinear),
            _ => None,
        }
    }
}

/// Drawing-quality knobs. They affect how pixels are produced, never which node produces them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderHints {
    /// Advisory. [`GraphRenderer`](crate::GraphRenderer) coverage is the same either way.
    pub antialiasing: bool,
    pub interpolation: Interpolation,
}

impl RenderHints {
    pub const QUALITY: Self = Self {
        antialiasing: true,
        interpolation: Interpolation::Bilinear,
    };

    pub const SPEED: Self = Self {
        antialiasing: false,
        interpolation: Interpolation::NearestNeighbor,
    };
}

impl Default for RenderHints {
    fn default() -> Self {
        Self::QUALITY
    }
}
