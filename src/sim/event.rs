/// Events emitted during a simulation step.
/// The presentation layer consumes these for HUD messages.

use crate::domain::tile::CollectibleKind;

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    ItemCollected { kind: CollectibleKind, points: u32 },
    KeyCollected,
    DoorsUnlocked { count: u32 },
    PrincessSpawned,
    PlayerDamaged,
    PlayerRespawned,
    PlayerDied,
    LevelCompleted,
}
