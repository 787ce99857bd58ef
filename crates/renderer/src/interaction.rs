use crate::types::InteractionRates;

/// Discrete engagement edges reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    PointerEnter,
    PointerLeave,
    TouchStart,
    TouchEnd,
}

impl InteractionEvent {
    /// Pointer and touch edges are interchangeable: both only say whether the
    /// effect is engaged.
    pub fn engaged(self) -> bool {
        matches!(
            self,
            InteractionEvent::PointerEnter | InteractionEvent::TouchStart
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// Intensity trends towards 0.
    Inactive,
    /// Intensity trends towards 1.
    Active,
}

/// Turns engage/disengage edges into a continuous intensity in `[0, 1]`.
///
/// Events only flip the state; the intensity moves when [`step`](Self::step)
/// runs, which the session does exactly once per rendered frame.
#[derive(Debug, Clone)]
pub struct InteractionMachine {
    state: InteractionState,
    intensity: f32,
    rates: InteractionRates,
}

impl InteractionMachine {
    pub fn new(rates: InteractionRates) -> Self {
        Self {
            state: InteractionState::Inactive,
            intensity: 0.0,
            rates,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn rates(&self) -> InteractionRates {
        self.rates
    }

    pub fn is_engaged(&self) -> bool {
        self.state == InteractionState::Active
    }

    pub fn handle(&mut self, event: InteractionEvent) {
        self.set_engaged(event.engaged());
    }

    pub fn set_engaged(&mut self, engaged: bool) {
        self.state = if engaged {
            InteractionState::Active
        } else {
            InteractionState::Inactive
        };
    }

    /// Advances intensity by one frame and returns the new value.
    pub fn step(&mut self) -> f32 {
        let delta = match self.state {
            InteractionState::Active => self.rates.rise(),
            InteractionState::Inactive => -self.rates.fall(),
        };
        self.intensity = (self.intensity + delta).clamp(0.0, 1.0);
        self.intensity
    }
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new(InteractionRates::default())
    }
}
