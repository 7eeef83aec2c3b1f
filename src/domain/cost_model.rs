//! Trading cost tiers: flat commission per trade and one-way FX spread.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::FxdcaError;

/// Flat per-trade fee, charged in the purchase currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommissionTier {
    /// Regular ETF order.
    StandardEtf,
    /// Scheduled recurring purchase.
    RecurringMicroTrade,
}

impl CommissionTier {
    pub fn fee(&self) -> f64 {
        match self {
            CommissionTier::StandardEtf => 3.0,
            CommissionTier::RecurringMicroTrade => 0.1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommissionTier::StandardEtf => "standard-etf",
            CommissionTier::RecurringMicroTrade => "recurring-micro-trade",
        }
    }
}

impl fmt::Display for CommissionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommissionTier {
    type Err = FxdcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard-etf" | "etf_normal" => Ok(CommissionTier::StandardEtf),
            "recurring-micro-trade" | "dca" => Ok(CommissionTier::RecurringMicroTrade),
            _ => Err(FxdcaError::invalid_configuration(
                "commission_tier",
                s,
                "expected standard-etf or recurring-micro-trade",
            )),
        }
    }
}

/// One-way haircut applied when converting local currency into the purchase currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpreadTier {
    DigitalChannel,
    StandardChannel,
}

impl SpreadTier {
    pub fn fraction(&self) -> f64 {
        match self {
            SpreadTier::DigitalChannel => 0.0010,
            SpreadTier::StandardChannel => 0.0019,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpreadTier::DigitalChannel => "digital-channel",
            SpreadTier::StandardChannel => "standard-channel",
        }
    }
}

impl fmt::Display for SpreadTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpreadTier {
    type Err = FxdcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "digital-channel" | "digital" => Ok(SpreadTier::DigitalChannel),
            "standard-channel" | "spot" => Ok(SpreadTier::StandardChannel),
            _ => Err(FxdcaError::invalid_configuration(
                "spread_tier",
                s,
                "expected digital-channel or standard-channel",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CostModel {
    pub commission_tier: CommissionTier,
    pub spread_tier: SpreadTier,
}

impl CostModel {
    pub fn new(commission_tier: CommissionTier, spread_tier: SpreadTier) -> Self {
        Self {
            commission_tier,
            spread_tier,
        }
    }

    /// Resolves both tiers by name. Unknown names are an `InvalidConfiguration` error.
    pub fn from_names(commission: &str, spread: &str) -> Result<Self, FxdcaError> {
        Ok(Self::new(commission.parse()?, spread.parse()?))
    }

    pub fn commission(&self) -> f64 {
        self.commission_tier.fee()
    }

    pub fn spread(&self) -> f64 {
        self.spread_tier.fraction()
    }
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(CommissionTier::StandardEtf, SpreadTier::DigitalChannel)
    }
}
