use crate::config::LayoutConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnergyState {
    Idle,
    Perturbed,
}

/// Simulation temperature (d3's alpha). Forces are scaled by it, so at zero
/// nothing moves.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Energy {
    alpha: f32,
    target: f32,
}

impl Energy {
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn state(&self, config: &LayoutConfig) -> EnergyState {
        if self.alpha < config.alpha_min && self.target < config.alpha_min {
            EnergyState::Idle
        } else {
            EnergyState::Perturbed
        }
    }

    /// Moves alpha one step toward the target. Returns `None` once the system
    /// has gone idle.
    pub(crate) fn advance(&mut self, config: &LayoutConfig) -> Option<f32> {
        if self.state(config) == EnergyState::Idle {
            self.alpha = 0.0;
            return None;
        }

        self.alpha += (self.target - self.alpha) * config.alpha_decay;
        if self.state(config) == EnergyState::Idle {
            tracing::trace!("layout energy settled");
            self.alpha = 0.0;
        }
        Some(self.alpha)
    }

    pub(crate) fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha);
    }

    pub(crate) fn set_target(&mut self, target: f32) {
        self.target = target.max(0.0);
    }

    pub(crate) fn settle(&mut self) {
        self.alpha = 0.0;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let config = LayoutConfig::default();
        let mut energy = Energy::default();
        assert_eq!(energy.state(&config), EnergyState::Idle);
        assert_eq!(energy.advance(&config), None);
    }

    #[test]
    fn reheated_energy_decays_back_to_idle() {
        let config = LayoutConfig::default();
        let mut energy = Energy::default();
        energy.reheat(1.0);
        assert_eq!(energy.state(&config), EnergyState::Perturbed);

        let mut steps = 0;
        let mut previous = energy.alpha();
        while let Some(alpha) = energy.advance(&config) {
            assert!(alpha <= previous);
            previous = alpha;
            steps += 1;
            assert!(steps < 1000, "energy never settled");
        }
        assert_eq!(energy.alpha(), 0.0);
        assert_eq!(energy.state(&config), EnergyState::Idle);
        // d3 settles after roughly 300 ticks with the default decay.
        assert!((250..=350).contains(&steps), "settled after {steps} steps");
    }

    #[test]
    fn target_holds_energy_up_while_dragging() {
        let config = LayoutConfig::default();
        let mut energy = Energy::default();
        energy.set_target(config.drag_alpha_target);
        for _ in 0..500 {
            energy.advance(&config);
        }
        assert!((energy.alpha() - config.drag_alpha_target).abs() < 0.01);

        energy.set_target(0.0);
        assert_eq!(energy.state(&config), EnergyState::Perturbed);
    }

    #[test]
    fn reheat_never_lowers_alpha() {
        let mut energy = Energy::default();
        energy.reheat(1.0);
        energy.reheat(0.2);
        assert_eq!(energy.alpha(), 1.0);
        energy.settle();
        assert_eq!(energy.alpha(), 0.0);
    }
}
