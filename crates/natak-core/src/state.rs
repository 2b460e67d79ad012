//! Turn phase state machine.
//!
//! The machine is a stack of phase tokens in one of two arms:
//! - **Setup**: pre-loaded with one (village, road) pair per placement, with
//!   `SetupFinished` at the bottom. Reaching it switches to the main arm.
//! - **Main**: normal turns. Interrupts such as discarding, moving the thief,
//!   stealing and free road building are pushed on top of the turn phase and
//!   popped when resolved.
//!
//! [`StateManager::check`] answers whether an action is legal right now;
//! [`StateManager::transition`] advances the stack once an action completed.

use crate::error::StateError;
use serde::{Deserialize, Serialize};

/// A phase token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum State {
    InitialVillage,
    InitialRoad,
    SetupFinished,
    BeforeRoll,
    AfterRoll,
    /// Free roads left from a roaming card
    Roaming { roads: u8 },
    DiscardResources,
    MoveThief,
    StealResource,
    Finish,
}

/// Something a player asks to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    BuildVillage,
    BuildRoad,
    BuildTown,
    RollDice,
    DiscardResources,
    MoveThief,
    StealResource,
    EndTurn,
    BuyGrowthCard,
    PlaySoldierCard,
    PlayRoamingCard,
    PlayWealthCard,
    PlayGathererCard,
    TradeWithBank,
    TradeWithPlayer,
    Embargo,
}

/// Something that just happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    BuildVillage,
    BuildRoad,
    RollDice,
    RollSeven { discard: bool },
    MoveThief { victims: bool },
    StealResource,
    AllResourcesDiscarded,
    EndTurn,
    PlaySoldierCard,
    PlayRoamingCard { roads: u8 },
    PlayerHasWon,
}

impl Transition {
    /// The action whose completion this transition records
    fn action(&self) -> Action {
        match self {
            Transition::BuildVillage => Action::BuildVillage,
            Transition::BuildRoad => Action::BuildRoad,
            Transition::RollDice | Transition::RollSeven { .. } => Action::RollDice,
            Transition::MoveThief { .. } => Action::MoveThief,
            Transition::StealResource => Action::StealResource,
            Transition::AllResourcesDiscarded => Action::DiscardResources,
            Transition::EndTurn | Transition::PlayerHasWon => Action::EndTurn,
            Transition::PlaySoldierCard => Action::PlaySoldierCard,
            Transition::PlayRoamingCard { .. } => Action::PlayRoamingCard,
        }
    }
}

/// The two arms of the machine, each a stack with the top last
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Machine {
    Setup(Vec<State>),
    Main(Vec<State>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateManager {
    machine: Machine,
}

impl StateManager {
    /// A fresh setup phase for `players` players, two placements each
    pub fn new(players: usize) -> Self {
        let mut stack = vec![State::SetupFinished];
        for _ in 0..2 * players {
            stack.push(State::InitialRoad);
            stack.push(State::InitialVillage);
        }
        Self {
            machine: Machine::Setup(stack),
        }
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn is_setup(&self) -> bool {
        matches!(self.machine, Machine::Setup(_))
    }

    fn stack(&self) -> &[State] {
        match &self.machine {
            Machine::Setup(stack) | Machine::Main(stack) => stack,
        }
    }

    fn stack_mut(&mut self) -> &mut Vec<State> {
        match &mut self.machine {
            Machine::Setup(stack) | Machine::Main(stack) => stack,
        }
    }

    /// The phase on top of the stack
    pub fn current(&self) -> State {
        self.stack().last().copied().unwrap_or(State::Finish)
    }

    /// Free roads left to build, if a roaming card is being resolved
    pub fn free_roads(&self) -> u8 {
        match self.current() {
            State::Roaming { roads } => roads,
            _ => 0,
        }
    }

    /// Whether `action` is legal in the current phase
    pub fn check(&self, action: Action) -> Result<(), StateError> {
        use Action as A;
        use State as S;

        let state = self.current();
        let allowed = match (action, state) {
            (_, S::Finish) => false,
            (A::Embargo, _) => true,
            (A::BuildVillage, S::InitialVillage | S::AfterRoll) => true,
            (A::BuildRoad, S::InitialRoad | S::AfterRoll | S::Roaming { .. }) => true,
            (A::RollDice, S::BeforeRoll) => true,
            (A::PlaySoldierCard, S::BeforeRoll | S::AfterRoll) => true,
            (A::DiscardResources, S::DiscardResources) => true,
            (A::MoveThief, S::MoveThief) => true,
            (A::StealResource, S::StealResource) => true,
            (A::EndTurn, S::AfterRoll | S::Roaming { .. }) => true,
            (
                A::BuildTown
                | A::BuyGrowthCard
                | A::PlayRoamingCard
                | A::PlayWealthCard
                | A::PlayGathererCard
                | A::TradeWithBank
                | A::TradeWithPlayer,
                S::AfterRoll,
            ) => true,
            _ => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(StateError::InvalidAction { action, state })
        }
    }

    /// Advance the machine after an action completed
    pub fn transition(&mut self, transition: Transition) -> Result<(), StateError> {
        let state = self.current();
        let invalid = StateError::InvalidAction {
            action: transition.action(),
            state,
        };

        if transition == Transition::PlayerHasWon {
            self.machine = Machine::Main(vec![State::Finish]);
            return Ok(());
        }

        if self.is_setup() {
            match (transition, state) {
                (Transition::BuildVillage, State::InitialVillage) => {
                    self.stack_mut().pop();
                }
                (Transition::BuildRoad, State::InitialRoad) => {
                    self.stack_mut().pop();
                    if self.current() == State::SetupFinished {
                        self.machine = Machine::Main(vec![State::BeforeRoll]);
                    }
                }
                _ => return Err(invalid),
            }
            return Ok(());
        }

        let stack = self.stack_mut();
        match (transition, state) {
            (Transition::RollDice, State::BeforeRoll) => {
                stack.pop();
                stack.push(State::AfterRoll);
            }
            (Transition::RollSeven { discard }, State::BeforeRoll) => {
                stack.pop();
                stack.push(State::AfterRoll);
                stack.push(State::StealResource);
                stack.push(State::MoveThief);
                if discard {
                    stack.push(State::DiscardResources);
                }
            }
            (Transition::AllResourcesDiscarded, State::DiscardResources) => {
                stack.pop();
            }
            (Transition::MoveThief { victims }, State::MoveThief) => {
                stack.pop();
                if !victims && stack.last() == Some(&State::StealResource) {
                    stack.pop();
                }
            }
            (Transition::StealResource, State::StealResource) => {
                stack.pop();
            }
            (Transition::PlaySoldierCard, State::BeforeRoll | State::AfterRoll) => {
                stack.push(State::StealResource);
                stack.push(State::MoveThief);
            }
            (Transition::PlayRoamingCard { roads }, State::AfterRoll) => {
                if roads > 0 {
                    stack.push(State::Roaming { roads });
                }
            }
            (Transition::BuildRoad, State::Roaming { roads }) => {
                stack.pop();
                if roads > 1 {
                    stack.push(State::Roaming { roads: roads - 1 });
                }
            }
            (Transition::BuildRoad | Transition::BuildVillage, State::AfterRoll) => {}
            (Transition::EndTurn, State::AfterRoll | State::Roaming { .. }) => {
                // Unused free roads are forfeited
                if matches!(state, State::Roaming { .. }) {
                    stack.pop();
                }
                stack.pop();
                stack.push(State::BeforeRoll);
            }
            _ => return Err(invalid),
        }
        Ok(())
    }
}
