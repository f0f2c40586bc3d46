//! Factory: turns a [`StrategyConfig`] into a runtime strategy.

use tradesim_core::strategies::{
    ConstantSignal, MomentumSignal, MomentumWeights, MovingAverageCrossover, Strategy,
};

use crate::config::StrategyConfig;

// ─── Error type ──────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("{strategy}: {param} must be at least 1")]
    ZeroPeriod {
        strategy: &'static str,
        param: &'static str,
    },
    #[error("{strategy}: exposure must be in (0, 1], got {value}")]
    Exposure { strategy: &'static str, value: f64 },
    #[error("constant: signal must be -1, 0 or 1, got {0}")]
    Signal(f64),
}

// ─── Construction ────────────────────────────────────────────────────

pub fn create_strategy(config: &StrategyConfig) -> Result<Box<dyn Strategy>, FactoryError> {
    let strategy: Box<dyn Strategy> = match *config {
        StrategyConfig::Constant { signal, exposure } => {
            if ![-1.0, 0.0, 1.0].contains(&signal) {
                return Err(FactoryError::Signal(signal));
            }
            match exposure {
                None => Box::new(ConstantSignal::new(signal)),
                Some(exposure) => {
                    check_exposure("constant", exposure)?;
                    Box::new(ConstantSignal::weighted(signal, exposure))
                }
            }
        }
        StrategyConfig::Momentum { period } => {
            check_period("momentum", "period", period)?;
            Box::new(MomentumSignal::new(period))
        }
        StrategyConfig::MaCrossover { fast, slow } => {
            check_period("ma_crossover", "fast", fast)?;
            check_period("ma_crossover", "slow", slow)?;
            Box::new(MovingAverageCrossover::new(fast, slow))
        }
        StrategyConfig::MomentumWeights { period, exposure } => {
            check_period("momentum_weights", "period", period)?;
            check_exposure("momentum_weights", exposure)?;
            Box::new(MomentumWeights::new(period, exposure))
        }
    };
    Ok(strategy)
}

fn check_period(
    strategy: &'static str,
    param: &'static str,
    value: usize,
) -> Result<(), FactoryError> {
    if value == 0 {
        Err(FactoryError::ZeroPeriod { strategy, param })
    } else {
        Ok(())
    }
}

fn check_exposure(strategy: &'static str, value: f64) -> Result<(), FactoryError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(FactoryError::Exposure { strategy, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_each_type() {
        let cases = [
            (StrategyConfig::Momentum { period: 5 }, "momentum_5"),
            (
                StrategyConfig::MaCrossover { fast: 5, slow: 20 },
                "ma_crossover_5_20",
            ),
            (
                StrategyConfig::MomentumWeights {
                    period: 3,
                    exposure: 0.5,
                },
                "momentum_weights_3",
            ),
        ];
        for (config, name) in cases {
            assert_eq!(create_strategy(&config).unwrap().name(), name);
        }
        let constant = StrategyConfig::Constant {
            signal: 1.0,
            exposure: Some(1.0),
        };
        assert!(create_strategy(&constant).is_ok());
    }

    #[test]
    fn rejects_bad_params() {
        assert!(matches!(
            create_strategy(&StrategyConfig::Momentum { period: 0 }),
            Err(FactoryError::ZeroPeriod { param: "period", .. })
        ));
        assert!(matches!(
            create_strategy(&StrategyConfig::MomentumWeights {
                period: 3,
                exposure: 1.5
            }),
            Err(FactoryError::Exposure { .. })
        ));
        assert!(matches!(
            create_strategy(&StrategyConfig::Constant {
                signal: 0.5,
                exposure: None
            }),
            Err(FactoryError::Signal(_))
        ));
    }
}
