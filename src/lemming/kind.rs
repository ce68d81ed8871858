//! Agent types and their mapping onto shared animation resources

use serde::{Deserialize, Serialize};

/// Current behavior of an agent. `Nuke` and `Undefined` are request-only
/// values and never become an agent's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LemmingType {
    Walker,
    Faller,
    Climber,
    ClimberToWalker,
    FloaterStart,
    Floater,
    Splat,
    Stopper,
    Drowning,
    Trapped,
    Exiting,
    Bomber,
    /// Stopper whose countdown ran out; its blocking zone is still stamped
    BomberStopper,
    Builder,
    BuilderEnd,
    Digger,
    Basher,
    Miner,
    Jumper,
    Nuke,
    Undefined,
}

/// Key into the shared resource arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Walker,
    Faller,
    Climber,
    ClimberToWalker,
    Floater,
    Splat,
    Stopper,
    Drowning,
    Trapped,
    Exiting,
    Bomber,
    Builder,
    BuilderEnd,
    Digger,
    Basher,
    Miner,
    Jumper,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 17] = [
        ResourceKind::Walker,
        ResourceKind::Faller,
        ResourceKind::Climber,
        ResourceKind::ClimberToWalker,
        ResourceKind::Floater,
        ResourceKind::Splat,
        ResourceKind::Stopper,
        ResourceKind::Drowning,
        ResourceKind::Trapped,
        ResourceKind::Exiting,
        ResourceKind::Bomber,
        ResourceKind::Builder,
        ResourceKind::BuilderEnd,
        ResourceKind::Digger,
        ResourceKind::Basher,
        ResourceKind::Miner,
        ResourceKind::Jumper,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Kinds whose physics stamp a collision mask into the terrain
    pub fn needs_mask(self) -> bool {
        matches!(
            self,
            ResourceKind::Stopper
                | ResourceKind::Bomber
                | ResourceKind::Builder
                | ResourceKind::Digger
                | ResourceKind::Basher
                | ResourceKind::Miner
        )
    }
}

impl LemmingType {
    /// Shared resource used to animate this type. Pseudo types fall back to
    /// the walker.
    pub fn resource_kind(self) -> ResourceKind {
        match self {
            LemmingType::Walker | LemmingType::Nuke | LemmingType::Undefined => ResourceKind::Walker,
            LemmingType::Faller => ResourceKind::Faller,
            LemmingType::Climber => ResourceKind::Climber,
            LemmingType::ClimberToWalker => ResourceKind::ClimberToWalker,
            LemmingType::FloaterStart | LemmingType::Floater => ResourceKind::Floater,
            LemmingType::Splat => ResourceKind::Splat,
            LemmingType::Stopper => ResourceKind::Stopper,
            LemmingType::Drowning => ResourceKind::Drowning,
            LemmingType::Trapped => ResourceKind::Trapped,
            LemmingType::Exiting => ResourceKind::Exiting,
            LemmingType::Bomber | LemmingType::BomberStopper => ResourceKind::Bomber,
            LemmingType::Builder => ResourceKind::Builder,
            LemmingType::BuilderEnd => ResourceKind::BuilderEnd,
            LemmingType::Digger => ResourceKind::Digger,
            LemmingType::Basher => ResourceKind::Basher,
            LemmingType::Miner => ResourceKind::Miner,
            LemmingType::Jumper => ResourceKind::Jumper,
        }
    }

    /// Types that may receive a new primary skill
    pub fn can_change_skill(self) -> bool {
        matches!(
            self,
            LemmingType::Walker
                | LemmingType::Basher
                | LemmingType::Builder
                | LemmingType::BuilderEnd
                | LemmingType::Digger
                | LemmingType::Miner
        )
    }

    /// Types that turn into exiters when reaching an exit region
    pub fn can_exit(self) -> bool {
        matches!(
            self,
            LemmingType::Walker
                | LemmingType::Jumper
                | LemmingType::Basher
                | LemmingType::Miner
                | LemmingType::Builder
                | LemmingType::Digger
        )
    }

    /// Dying, leaving or already exploding: only a nuke is accepted
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LemmingType::Drowning
                | LemmingType::Exiting
                | LemmingType::Splat
                | LemmingType::Trapped
                | LemmingType::Bomber
                | LemmingType::BomberStopper
        )
    }

    /// Types that hold a stamped stopper zone
    pub fn is_stopper(self) -> bool {
        matches!(self, LemmingType::Stopper | LemmingType::BomberStopper)
    }

    /// Skills gated by `can_change_skill` and a terrain check
    pub fn is_primary_skill(self) -> bool {
        matches!(
            self,
            LemmingType::Digger
                | LemmingType::Miner
                | LemmingType::Basher
                | LemmingType::Builder
                | LemmingType::Stopper
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            LemmingType::Walker => "WALKER",
            LemmingType::Faller => "FALLER",
            LemmingType::Climber => "CLIMBER",
            LemmingType::ClimberToWalker => "CLIMBER",
            LemmingType::FloaterStart | LemmingType::Floater => "FLOATER",
            LemmingType::Splat => "SPLATTER",
            LemmingType::Stopper => "BLOCKER",
            LemmingType::Drowning => "DROWNING",
            LemmingType::Trapped => "TRAPPED",
            LemmingType::Exiting => "EXITING",
            LemmingType::Bomber | LemmingType::BomberStopper => "BOMBER",
            LemmingType::Builder | LemmingType::BuilderEnd => "BUILDER",
            LemmingType::Digger => "DIGGER",
            LemmingType::Basher => "BASHER",
            LemmingType::Miner => "MINER",
            LemmingType::Jumper => "JUMPER",
            LemmingType::Nuke => "NUKE",
            LemmingType::Undefined => "UNDEFINED",
        }
    }
}
