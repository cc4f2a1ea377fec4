//! Headless hunger/thirst simulation.
//!
//! Usage: `hunger-sim [CONFIG.json] [MINUTES]`
//!
//! Spawns a small population on a manual clock, steps it one scheduler
//! interval at a time and logs damage and threshold crossings. Set
//! `RUST_LOG=hunger_core=debug` to see every commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use hunger_core::{
    Clock, ConsumableComponents, DamageLog, DecayModifier, EngineConfig, EntityId, GateMode,
    ManualClock, Message, MovementMode, ResourceFlags, ResourceKind, ResourceSystem, UsePolicy,
};
use tracing::{info, warn};

const DEFAULT_MINUTES: u64 = 180;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => EngineConfig::from_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => {
            let mut config = EngineConfig::default();
            config.thirst.enabled = true;
            config
        }
    };
    let minutes = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("invalid duration in minutes: {raw}"))?,
        None => DEFAULT_MINUTES,
    };

    run(config, minutes)
}

fn run(config: EngineConfig, minutes: u64) -> Result<()> {
    let clock = Arc::new(ManualClock::new(0));
    let mut system = ResourceSystem::new(Arc::clone(&clock), config);
    if system.scheduler().mode() == GateMode::Global {
        system.spawn_world_driver();
    }

    // A desert biome that doubles hunger loss for everyone.
    system.register_hook(Arc::new(DecayModifier::scaled(2.0).only(ResourceKind::Hunger)));

    let walker = system.spawn_character()?;
    let sprinter = system.spawn_character()?;
    let eater = system.spawn_character()?;
    let starving = system.spawn_character()?;
    system.set_value(starving, ResourceKind::Hunger, 5.0)?;

    system.handle(Message::MovementChanged {
        entity: sprinter,
        mode: MovementMode::Sprinting,
    })?;
    let pantry = system.spawn_consumable(ConsumableComponents::new(
        ResourceKind::Hunger,
        25.0,
        UsePolicy::Reusable,
    ));
    let flask =
        system.spawn_consumable(ConsumableComponents::two_stage(ResourceKind::Thirst, 40.0));

    let population = [walker, sprinter, eater, starving];
    let mut flags: BTreeMap<(EntityId, ResourceKind), ResourceFlags> = BTreeMap::new();
    let mut health: BTreeMap<EntityId, f32> = population.iter().map(|&id| (id, 100.0)).collect();
    let log = DamageLog::new();

    let step = system.scheduler().interval_ms();
    let end = minutes.saturating_mul(60_000);
    info!(minutes, step, characters = population.len(), "simulation started");

    while clock.now_ms() < end {
        clock.advance(step);
        let now = clock.now_ms();

        // The eater snacks every half hour.
        if now % 1_800_000 < step {
            system.handle(Message::Consumed {
                entity: eater,
                item: pantry,
            })?;
            if system.arena().get(flask).is_some() {
                system.handle(Message::Consumed {
                    entity: eater,
                    item: flask,
                })?;
            }
        }

        let sprinting = system
            .arena()
            .character(sprinter)
            .is_some_and(|c| c.movement.is_sprinting());
        if sprinting && !system.can_sprint(sprinter)? {
            info!(now, entity = %sprinter, "too thirsty to sprint, slowing to a walk");
            system.handle(Message::MovementChanged {
                entity: sprinter,
                mode: MovementMode::Normal,
            })?;
        }

        system.tick(&log)?;
        for (entity, amount, cause) in log.take_events() {
            let hp = health.entry(entity).or_insert(100.0);
            *hp = (*hp - amount).max(0.0);
            warn!(now, %entity, amount, %cause, hp = *hp, "damage applied");
        }

        for &entity in &population {
            for status in system.status(entity)? {
                let previous = flags
                    .insert((entity, status.kind), status.flags)
                    .unwrap_or_default();
                if previous != status.flags {
                    info!(
                        now,
                        %entity,
                        kind = %status.kind,
                        value = status.value,
                        from = ?previous,
                        to = ?status.flags,
                        "threshold crossed"
                    );
                }
            }
        }
    }

    for &entity in &population {
        for kind in ResourceKind::ALL {
            if let Some(report) = system.show(entity, kind)? {
                info!(%entity, hp = health.get(&entity).copied().unwrap_or_default(), "{report}");
            }
        }
    }
    Ok(())
}
