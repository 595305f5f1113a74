/// Validation failure raised when a configuration or record is written.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A percentage outside [0, 100] or not a finite number.
    PercentOutOfRange { field: &'static str, value: f64 },
    /// Foundation and company shares do not add up to 100.
    ShareSplit { foundation: f64, company: f64 },
    InvalidInput(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PercentOutOfRange { field, value } => {
                write!(f, "{field} must be between 0 and 100% (got {value})")
            }
            Self::ShareSplit {
                foundation,
                company,
            } => write!(
                f,
                "Foundation share ({foundation}%) + Company share ({company}%) must equal 100%"
            ),
            Self::InvalidInput(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ValidationError {}
