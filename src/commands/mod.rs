//! Command handlers, one per run mode.

pub mod backtest;
pub mod live;
pub mod replay;

use std::error::Error;

use crate::config::Config;
use crate::strategy::{Strategy, StrategyRegistry};

/// Resolve a CLI strategy id through the config mapping and build the
/// configured instance. Unknown ids and names are fatal setup errors.
pub fn resolve_strategy(
    registry: &StrategyRegistry,
    config: &Config,
    strategy_id: &str,
) -> Result<Box<dyn Strategy + Send>, Box<dyn Error>> {
    let id: u32 = strategy_id
        .parse()
        .map_err(|_| format!("strategy id '{strategy_id}' is not a number"))?;

    let mut mappings = config.strategy_mappings();
    if mappings.is_empty() {
        // Default mapping when the config carries none.
        mappings.insert(1, "MeanReversion".to_string());
        mappings.insert(2, "StatArbitrage".to_string());
    }

    let name = mappings
        .get(&id)
        .ok_or_else(|| format!("no strategy mapped to id {id}"))?;

    let mut strategy = registry
        .create(name)
        .ok_or_else(|| format!("unknown strategy '{name}' (known: {:?})", registry.names()))?;
    strategy.configure(config.values());
    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_default_mapping() {
        let registry = StrategyRegistry::with_builtins();
        let config = Config::default();
        let strategy = resolve_strategy(&registry, &config, "1").unwrap();
        assert_eq!(strategy.name(), "MeanReversion");
        let strategy = resolve_strategy(&registry, &config, "2").unwrap();
        assert_eq!(strategy.name(), "StatArbitrage");
    }

    #[test]
    fn test_resolve_with_config_mapping() {
        let registry = StrategyRegistry::with_builtins();
        let config = Config::from_str_lossy("7 = StatArbitrage\n");
        let strategy = resolve_strategy(&registry, &config, "7").unwrap();
        assert_eq!(strategy.name(), "StatArbitrage");
    }

    #[test]
    fn test_unmapped_id_is_error() {
        let registry = StrategyRegistry::with_builtins();
        let config = Config::default();
        assert!(resolve_strategy(&registry, &config, "9").is_err());
    }

    #[test]
    fn test_non_numeric_id_is_error() {
        let registry = StrategyRegistry::with_builtins();
        let config = Config::default();
        assert!(resolve_strategy(&registry, &config, "mean").is_err());
    }

    #[test]
    fn test_mapping_to_unknown_strategy_is_error() {
        let registry = StrategyRegistry::with_builtins();
        let config = Config::from_str_lossy("1 = NoSuchStrategy\n");
        assert!(resolve_strategy(&registry, &config, "1").is_err());
    }
}
