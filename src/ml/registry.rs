// ============================================================
// Layer 6 — Architecture Registry
// ============================================================
// Maps an architecture name to everything needed to build it:
//
//   name          lowercase identifier used on the command line
//   params        the optional hyperparameters it accepts
//   depth rule    depth = step * n + offset, n >= 1 blocks per stage
//   defaults      depth, widen factor, dropout
//   builder       resolved parameters → NetworkConfig
//
// Specs are checked when registered, so a bad entry fails at
// start-up instead of when someone first selects it. Requests
// are checked against the declared parameter set: passing a
// widen factor to plain `resnet` is an error, not a no-op.
//
// Built-in entries:
//   resnet  depth 6n+2 (20, 32, 44, 56, 110 …), default 32
//   wrn     depth 6n+4 (16, 22, 28, 40 …),      default 28-4

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::TrainError;
use crate::ml::model::NetworkConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchParam {
    WidenFactor,
    DropRate,
}

impl ArchParam {
    fn name(self) -> &'static str {
        match self {
            Self::WidenFactor => "widen_factor",
            Self::DropRate => "drop_rate",
        }
    }
}

/// Architecture hyperparameters as requested by the user.
/// `None` means "use the architecture default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchParams {
    pub depth: Option<usize>,
    pub widen_factor: Option<usize>,
    pub drop_rate: Option<f64>,
}

/// Parameters after defaults have been filled in and validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedParams {
    pub depth: usize,
    pub blocks_per_stage: usize,
    pub widen_factor: usize,
    pub drop_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthRule {
    pub step: usize,
    pub offset: usize,
}

impl DepthRule {
    /// Blocks per stage for `depth`, if the depth fits the rule.
    pub fn blocks_per_stage(&self, depth: usize) -> Option<usize> {
        let body = depth.checked_sub(self.offset)?;
        (body > 0 && body % self.step == 0).then(|| body / self.step)
    }
}

pub type Builder = fn(&ResolvedParams, usize) -> NetworkConfig;

#[derive(Debug, Clone)]
pub struct ArchitectureSpec {
    pub name: &'static str,
    pub params: &'static [ArchParam],
    pub depth_rule: DepthRule,
    pub default_depth: usize,
    pub default_widen_factor: Option<usize>,
    pub default_drop_rate: Option<f64>,
    pub builder: Builder,
}

impl ArchitectureSpec {
    fn declares(&self, param: ArchParam) -> bool {
        self.params.contains(&param)
    }

    fn validate(&self) -> Result<(), TrainError> {
        let name_ok = !self.name.is_empty()
            && self.name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !name_ok {
            return Err(TrainError::config(format!(
                "architecture name '{}' must be non-empty lowercase ascii",
                self.name
            )));
        }
        if self.depth_rule.step == 0 {
            return Err(TrainError::config(format!("'{}': depth step must be positive", self.name)));
        }
        if self.depth_rule.blocks_per_stage(self.default_depth).is_none() {
            return Err(TrainError::config(format!(
                "'{}': default depth {} does not satisfy {}n+{}",
                self.name, self.default_depth, self.depth_rule.step, self.depth_rule.offset
            )));
        }
        if self.default_widen_factor.is_some() && !self.declares(ArchParam::WidenFactor) {
            return Err(TrainError::config(format!(
                "'{}': default given for undeclared widen_factor",
                self.name
            )));
        }
        if self.default_drop_rate.is_some() && !self.declares(ArchParam::DropRate) {
            return Err(TrainError::config(format!(
                "'{}': default given for undeclared drop_rate",
                self.name
            )));
        }
        Ok(())
    }

    fn resolve(&self, request: &ArchParams) -> Result<ResolvedParams, TrainError> {
        for (given, param) in [
            (request.widen_factor.is_some(), ArchParam::WidenFactor),
            (request.drop_rate.is_some(), ArchParam::DropRate),
        ] {
            if given && !self.declares(param) {
                return Err(TrainError::config(format!(
                    "architecture '{}' does not take {}",
                    self.name,
                    param.name()
                )));
            }
        }

        let depth = request.depth.unwrap_or(self.default_depth);
        let blocks_per_stage = self.depth_rule.blocks_per_stage(depth).ok_or_else(|| {
            TrainError::config(format!(
                "depth {depth} is invalid for '{}', it must be {}n+{}",
                self.name, self.depth_rule.step, self.depth_rule.offset
            ))
        })?;

        let widen_factor = request.widen_factor.or(self.default_widen_factor).unwrap_or(1);
        if widen_factor == 0 {
            return Err(TrainError::config("widen factor must be at least 1"));
        }
        let drop_rate = request.drop_rate.or(self.default_drop_rate).unwrap_or(0.0);
        if !(0.0..1.0).contains(&drop_rate) {
            return Err(TrainError::config(format!("drop rate must be in [0, 1), got {drop_rate}")));
        }

        Ok(ResolvedParams { depth, blocks_per_stage, widen_factor, drop_rate })
    }
}

/// Name → architecture spec, validated on insert.
#[derive(Debug, Clone, Default)]
pub struct ArchitectureRegistry {
    specs: BTreeMap<&'static str, ArchitectureSpec>,
}

impl ArchitectureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `resnet` and `wrn`.
    pub fn with_builtins() -> Result<Self, TrainError> {
        let mut registry = Self::new();
        registry.register(ArchitectureSpec {
            name: "resnet",
            params: &[],
            depth_rule: DepthRule { step: 6, offset: 2 },
            default_depth: 32,
            default_widen_factor: None,
            default_drop_rate: None,
            builder: build_cifar_net,
        })?;
        registry.register(ArchitectureSpec {
            name: "wrn",
            params: &[ArchParam::WidenFactor, ArchParam::DropRate],
            depth_rule: DepthRule { step: 6, offset: 4 },
            default_depth: 28,
            default_widen_factor: Some(4),
            default_drop_rate: Some(0.0),
            builder: build_cifar_net,
        })?;
        Ok(registry)
    }

    pub fn register(&mut self, spec: ArchitectureSpec) -> Result<(), TrainError> {
        spec.validate()?;
        if self.specs.contains_key(spec.name) {
            return Err(TrainError::config(format!(
                "architecture '{}' is already registered",
                spec.name
            )));
        }
        self.specs.insert(spec.name, spec);
        Ok(())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.specs.keys().copied().collect()
    }

    /// Resolve `request` against the named architecture and
    /// produce its network config.
    pub fn build(
        &self,
        name: &str,
        request: &ArchParams,
        num_classes: usize,
    ) -> Result<(NetworkConfig, ResolvedParams), TrainError> {
        let spec = self.specs.get(name).ok_or_else(|| {
            TrainError::config(format!(
                "unknown architecture '{name}', available: {}",
                self.names().join(", ")
            ))
        })?;
        let resolved = spec.resolve(request)?;
        Ok(((spec.builder)(&resolved, num_classes), resolved))
    }
}

fn build_cifar_net(params: &ResolvedParams, num_classes: usize) -> NetworkConfig {
    NetworkConfig::new(num_classes, params.blocks_per_stage)
        .with_widen_factor(params.widen_factor)
        .with_drop_rate(params.drop_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ArchitectureRegistry {
        ArchitectureRegistry::with_builtins().unwrap()
    }

    #[test]
    fn resnet_defaults_to_depth_32() {
        let (cfg, resolved) = registry().build("resnet", &ArchParams::default(), 10).unwrap();
        assert_eq!(resolved.depth, 32);
        assert_eq!(cfg.blocks_per_stage, 5);
        assert_eq!(cfg.widen_factor, 1);
        assert_eq!(cfg.num_classes, 10);
    }

    #[test]
    fn wrn_uses_declared_params() {
        let request = ArchParams { depth: Some(16), widen_factor: Some(8), drop_rate: Some(0.3) };
        let (cfg, _) = registry().build("wrn", &request, 100).unwrap();
        assert_eq!(cfg.blocks_per_stage, 2);
        assert_eq!(cfg.widen_factor, 8);
        assert_eq!(cfg.drop_rate, 0.3);
    }

    #[test]
    fn wrn_defaults_to_28_4() {
        let (cfg, resolved) = registry().build("wrn", &ArchParams::default(), 10).unwrap();
        assert_eq!(resolved.depth, 28);
        assert_eq!(cfg.blocks_per_stage, 4);
        assert_eq!(cfg.widen_factor, 4);
    }

    #[test]
    fn rejects_bad_depth_and_unknown_param() {
        let reg = registry();
        let bad_depth = ArchParams { depth: Some(30), ..Default::default() };
        assert!(matches!(reg.build("resnet", &bad_depth, 10), Err(TrainError::Config(_))));

        let widen = ArchParams { widen_factor: Some(2), ..Default::default() };
        assert!(matches!(reg.build("resnet", &widen, 10), Err(TrainError::Config(_))));

        assert!(reg.build("densenet", &ArchParams::default(), 10).is_err());
    }

    #[test]
    fn registration_is_validated() {
        let mut reg = registry();
        let duplicate = ArchitectureSpec {
            name: "resnet",
            params: &[],
            depth_rule: DepthRule { step: 6, offset: 2 },
            default_depth: 20,
            default_widen_factor: None,
            default_drop_rate: None,
            builder: build_cifar_net,
        };
        assert!(reg.register(duplicate.clone()).is_err());

        let bad_default = ArchitectureSpec { name: "tiny", default_depth: 21, ..duplicate.clone() };
        assert!(reg.register(bad_default).is_err());

        let undeclared = ArchitectureSpec { name: "tiny", default_widen_factor: Some(2), ..duplicate };
        assert!(reg.register(undeclared).is_err());
        assert_eq!(reg.names(), vec!["resnet", "wrn"]);
    }

    #[test]
    fn depth_rule_arithmetic() {
        let rule = DepthRule { step: 6, offset: 2 };
        assert_eq!(rule.blocks_per_stage(110), Some(18));
        assert_eq!(rule.blocks_per_stage(2), None);
        assert_eq!(rule.blocks_per_stage(1), None);
        assert_eq!(rule.blocks_per_stage(21), None);
    }
}
