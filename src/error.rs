use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubsError {
    #[error("{0}")]
    ParseError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Scale-like factors must be finite and strictly positive.
pub(crate) fn check_factor(name: &str, factor: f64) -> Result<(), SubsError> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(SubsError::InvalidArgument(format!(
            "{} factor must be a positive number, got {}",
            name, factor
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_positive_factors() {
        assert!(check_factor("scale", 1.0).is_ok());
        assert!(check_factor("scale", 0.001).is_ok());
        assert!(check_factor("scale", 25.0 / 23.976).is_ok());
    }

    #[test]
    fn rejects_degenerate_factors() {
        for f in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            match check_factor("lengthen", f) {
                Err(SubsError::InvalidArgument(msg)) => assert!(msg.starts_with("lengthen")),
                other => panic!("expected InvalidArgument for {}, got {:?}", f, other),
            }
        }
    }
}
