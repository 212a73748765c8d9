use bevy::prelude::*;

use crate::components::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellStateChanged {
    pub position: GridPosition,
    pub occupied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
}

/// Everything the simulation core tells the outside world, on one ordered
/// channel. Views and UI subscribe with `EventReader<CityEvent>`.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum CityEvent {
    BuildingBuilt(BuildingInstance),
    BuildingMoved {
        id: BuildingId,
        position: GridPosition,
    },
    BuildingUpgraded {
        id: BuildingId,
        level: u32,
    },
    BuildingDeleted {
        id: BuildingId,
    },
    CellStateChanged(CellStateChanged),
    EconomyStateChanged {
        gold: i64,
    },
    Notification {
        message: String,
        level: NotificationLevel,
    },
}

impl CityEvent {
    pub fn info(message: impl Into<String>) -> Self {
        CityEvent::Notification {
            message: message.into(),
            level: NotificationLevel::Info,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        CityEvent::Notification {
            message: message.into(),
            level: NotificationLevel::Warning,
        }
    }
}

/// Where the core publishes events. Bevy systems hand in their
/// `EventWriter`; direct callers can collect into a `Vec`.
pub trait EventSink {
    fn publish(&mut self, event: CityEvent);
}

impl EventSink for EventWriter<'_, CityEvent> {
    fn publish(&mut self, event: CityEvent) {
        self.send(event);
    }
}

impl EventSink for Vec<CityEvent> {
    fn publish(&mut self, event: CityEvent) {
        self.push(event);
    }
}

pub struct EventBusPlugin;

impl Plugin for EventBusPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CityEvent>();
    }
}
