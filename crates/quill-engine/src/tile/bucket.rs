use std::fmt;

const SWITCH_UP: f32 = 1.1;
const SWITCH_DOWN: f32 = 0.9;

/// Discrete raster resolution tier for tiles.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScaleBucket {
    X1,
    X2,
    X4,
}

impl ScaleBucket {
    /// Ascending.
    pub const ALL: [ScaleBucket; 3] = [ScaleBucket::X1, ScaleBucket::X2, ScaleBucket::X4];

    pub fn factor(self) -> f32 {
        match self {
            ScaleBucket::X1 => 1.0,
            ScaleBucket::X2 => 2.0,
            ScaleBucket::X4 => 4.0,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Picks a bucket for `zoom`, sticking with `previous` until the zoom
    /// clears it by a margin.
    ///
    /// Stepping up needs `zoom >= next * 1.1`; stepping down needs
    /// `zoom < current * 0.9`. Without a previous bucket the smallest bucket
    /// at or above `zoom` wins, or the largest when zoom exceeds them all.
    pub fn for_zoom(zoom: f32, previous: Option<ScaleBucket>) -> ScaleBucket {
        let zoom = zoom.max(ScaleBucket::X1.factor());
        let last = Self::ALL.len() - 1;

        let Some(previous) = previous else {
            return Self::ALL
                .into_iter()
                .find(|b| zoom <= b.factor())
                .unwrap_or(Self::ALL[last]);
        };

        let mut i = previous.index();
        while i < last && zoom >= Self::ALL[i + 1].factor() * SWITCH_UP {
            i += 1;
        }
        while i > 0 && zoom < Self::ALL[i].factor() * SWITCH_DOWN {
            i -= 1;
        }
        Self::ALL[i]
    }
}

impl fmt::Display for ScaleBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.factor())
    }
}
