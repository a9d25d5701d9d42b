use crate::error::{HelmetError, Result};
use crate::handler::Handler;

/// Units that older releases shipped and that now refuse to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovedUnit {
    /// Feature-Policy, superseded by Permissions-Policy
    FeaturePolicy,
    /// HTTP Public Key Pinning
    Hpkp,
    /// Cache-Control/Pragma/Expires/Surrogate-Control
    NoCache,
}

impl RemovedUnit {
    pub fn key(self) -> &'static str {
        match self {
            Self::FeaturePolicy => "featurePolicy",
            Self::Hpkp => "hpkp",
            Self::NoCache => "noCache",
        }
    }

    pub fn guidance(self) -> &'static str {
        match self {
            Self::FeaturePolicy => {
                "the Feature-Policy header is deprecated. Use `permissionsPolicy` instead"
            }
            Self::Hpkp => {
                "HTTP Public Key Pinning is deprecated and unsupported by browsers. Remove the option"
            }
            Self::NoCache => {
                "cache control is not a security header. Set Cache-Control in your handlers instead"
            }
        }
    }

    /// Always fails with a "no longer supported" error.
    pub fn build(self) -> Result<Box<dyn Handler>> {
        Err(HelmetError::RemovedUnit {
            unit: self.key(),
            guidance: self.guidance(),
        })
    }
}
