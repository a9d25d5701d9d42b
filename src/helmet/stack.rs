use super::config::HelmetConfig;
use super::registry::{REGISTRY, UnitDescriptor, UnitName};
use crate::error::Result;
use crate::handler::{Handler, Next, RequestHead, ResponseHeaders, endpoint};

/// The composed security header chain
///
/// Built once from a [`HelmetConfig`]; immutable afterwards and safe to share
/// between requests.
pub struct Helmet {
    units: Vec<UnitName>,
    handlers: Vec<Box<dyn Handler>>,
}

impl Helmet {
    pub fn new(config: &HelmetConfig) -> Result<Self> {
        Self::with_registry(config, &REGISTRY)
    }

    /// Assemble a chain from a custom registry, in slice order
    pub fn with_registry(config: &HelmetConfig, registry: &[UnitDescriptor]) -> Result<Self> {
        let mut units = Vec::new();
        let mut handlers = Vec::new();

        for descriptor in registry {
            if let Some(handler) = descriptor.resolve(config)? {
                units.push(descriptor.name);
                handlers.push(handler);
            }
        }

        tracing::debug!(
            units = ?units.iter().map(|name| name.as_str()).collect::<Vec<_>>(),
            "security header chain assembled"
        );

        Ok(Self { units, handlers })
    }

    /// Units in the chain, in the order they run
    pub fn units(&self) -> &[UnitName] {
        &self.units
    }

    pub fn contains(&self, name: UnitName) -> bool {
        self.units.contains(&name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Helmet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Helmet").field("units", &self.units).finish()
    }
}

impl Handler for Helmet {
    fn handle(&self, req: &RequestHead, res: &mut dyn ResponseHeaders, next: Next<'_>) -> Result<()> {
        let mut outer = Some(next);
        let mut terminal = endpoint(|req, res| match outer.take() {
            Some(next) => next.run(req, res),
            None => Ok(()),
        });
        Next::new(&self.handlers, &mut terminal).run(req, res)
    }
}
