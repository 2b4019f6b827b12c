//! Name to constructor lookup for the built-in strategies.

use crate::domain::error::{Result, TradesimError};
use crate::domain::strategy::{
    Strategy, StrategyParams, breakout, mean_reversion, momentum, rsi, scalper, volume_momentum,
};

type Constructor = fn(&StrategyParams) -> Result<Box<dyn Strategy>>;

struct Entry {
    name: &'static str,
    aliases: &'static [&'static str],
    build: Constructor,
}

fn boxed<S, F>(build: F, params: &StrategyParams) -> Result<Box<dyn Strategy>>
where
    S: Strategy + 'static,
    F: Fn(&StrategyParams) -> Result<S>,
{
    Ok(Box::new(build(params)?))
}

#[derive(Default)]
pub struct StrategyRegistry {
    entries: Vec<Entry>,
}

impl StrategyRegistry {
    /// Registry holding every built-in strategy.
    pub fn builtin() -> Self {
        let mut registry = StrategyRegistry::default();
        registry.register(momentum::NAME, &[], |p| {
            boxed(momentum::Momentum::from_params, p)
        });
        registry.register(rsi::NAME, &["rsi_v3"], |p| {
            boxed(rsi::RsiReversal::from_params, p)
        });
        registry.register(mean_reversion::MEAN_REVERSION, &[], |p| {
            boxed(mean_reversion::MeanReversion::from_params, p)
        });
        registry.register(mean_reversion::TIGHT_BAND, &[], |p| {
            boxed(mean_reversion::TightBand::from_params, p)
        });
        registry.register(breakout::NAME, &[], |p| {
            boxed(breakout::Breakout::from_params, p)
        });
        registry.register(volume_momentum::NAME, &["vol_momentum_v3"], |p| {
            boxed(volume_momentum::VolumeMomentum::from_params, p)
        });
        registry.register(scalper::NAME, &[], |p| {
            boxed(scalper::Scalper::from_params, p)
        });
        registry
    }

    fn register(&mut self, name: &'static str, aliases: &'static [&'static str], build: Constructor) {
        self.entries.push(Entry {
            name,
            aliases,
            build,
        });
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        let name = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name == name || e.aliases.contains(&name.as_str()))
    }

    /// Canonical names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn build(&self, name: &str, params: &StrategyParams) -> Result<Box<dyn Strategy>> {
        match self.find(name) {
            Some(entry) => (entry.build)(params),
            None => Err(TradesimError::UnknownStrategy {
                name: name.to_string(),
                available: self.names().join(", "),
            }),
        }
    }

    /// Each strategy's canonical name and its resolved default parameters.
    pub fn defaults(&self) -> Result<Vec<(&'static str, StrategyParams)>> {
        self.entries
            .iter()
            .map(|e| {
                let strategy = (e.build)(&StrategyParams::new())?;
                Ok((e.name, strategy.params().clone()))
            })
            .collect()
    }
}
