use crate::foundation::error::{GraphError, GraphResult};

/// Porter-Duff and arithmetic pixel-combination rules.
///
/// Named rules are plain variants and compare by tag. [`CompositeOperator::Arithmetic`]
/// carries its own coefficients and compares structurally.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "CompositeRecord", into = "CompositeRecord")]
pub enum CompositeOperator {
    /// `Fs = 1`, `Fd = 1 - As`.
    Over,
    /// `Fs = Ad`, `Fd = 0`.
    In,
    /// `Fs = 1 - Ad`, `Fd = 0`.
    Out,
    /// `Fs = Ad`, `Fd = 1 - As`.
    Atop,
    /// `Fs = 1 - Ad`, `Fd = 1 - As`.
    Xor,
    /// `out = k1*i1*i2 + k2*i1 + k3*i2 + k4`.
    Arithmetic(ArithmeticCoefficients),
}

impl CompositeOperator {
    /// Arithmetic rule with each coefficient clamped to `[0, 1]`.
    pub fn arithmetic(k1: f32, k2: f32, k3: f32, k4: f32) -> Self {
        Self::Arithmetic(ArithmeticCoefficients::new(k1, k2, k3, k4))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Over => "over",
            Self::In => "in",
            Self::Out => "out",
            Self::Atop => "atop",
            Self::Xor => "xor",
            Self::Arithmetic(_) => "arithmetic",
        }
    }

    /// Flatten into the persisted form.
    pub fn persist(&self) -> CompositeRecord {
        let k = match self {
            Self::Arithmetic(c) => Some(c.as_array()),
            _ => None,
        };
        CompositeRecord {
            rule: self.name().to_string(),
            k,
        }
    }

    /// Rebuild an operator from its persisted form.
    ///
    /// Named rules come back as their variant. Arithmetic comes back as a fresh value with
    /// re-clamped coefficients. An unknown rule name, or arithmetic without coefficients, is
    /// [`GraphError::Corrupt`]: the data was not produced by [`CompositeOperator::persist`].
    pub fn rehydrate(record: &CompositeRecord) -> GraphResult<Self> {
        match record.rule.as_str() {
            "over" => Ok(Self::Over),
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "atop" => Ok(Self::Atop),
            "xor" => Ok(Self::Xor),
            "arithmetic" => {
                let Some([k1, k2, k3, k4]) = record.k else {
                    return Err(GraphError::corrupt("arithmetic rule without coefficients"));
                };
                Ok(Self::arithmetic(k1, k2, k3, k4))
            }
            other => Err(GraphError::corrupt(format!(
                "unknown composite rule '{other}'"
            ))),
        }
    }
}

/// Coefficients of [`CompositeOperator::Arithmetic`], each in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArithmeticCoefficients {
    k1: f32,
    k2: f32,
    k3: f32,
    k4: f32,
}

impl ArithmeticCoefficients {
    /// Clamps each coefficient into `[0, 1]`; NaN becomes 0.
    pub fn new(k1: f32, k2: f32, k3: f32, k4: f32) -> Self {
        Self {
            k1: unit(k1),
            k2: unit(k2),
            k3: unit(k3),
            k4: unit(k4),
        }
    }

    pub fn k1(&self) -> f32 {
        self.k1
    }

    pub fn k2(&self) -> f32 {
        self.k2
    }

    pub fn k3(&self) -> f32 {
        self.k3
    }

    pub fn k4(&self) -> f32 {
        self.k4
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.k1, self.k2, self.k3, self.k4]
    }
}

fn unit(k: f32) -> f32 {
    if k.is_nan() { 0.0 } else { k.clamp(0.0, 1.0) }
}

/// Persisted form of a [`CompositeOperator`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositeRecord {
    pub rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<[f32; 4]>,
}

impl From<CompositeOperator> for CompositeRecord {
    fn from(op: CompositeOperator) -> Self {
        op.persist()
    }
}

impl TryFrom<CompositeRecord> for CompositeOperator {
    type Error = GraphError;

    fn try_from(record: CompositeRecord) -> Result<Self, Self::Error> {
        Self::rehydrate(&record)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composite/rule.rs"]
mod tests;
