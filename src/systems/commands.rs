use std::collections::{HashMap, VecDeque};

use bevy::prelude::*;

use crate::components::*;
use crate::error::CommandError;
use crate::systems::building::*;
use crate::systems::catalog::BuildingCatalog;
use crate::systems::economy::{accrue_passive_income, EconomyLedger};
use crate::systems::events::CityEvent;
use crate::systems::grid::GridStore;
use crate::systems::save_load::{load_game, save_game, SaveLoadConfig};

/// Requests accepted from input layers.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum CityCommand {
    Build(BuildRequest),
    Move(MoveRequest),
    Upgrade(UpgradeRequest),
    Delete(DeleteRequest),
    Save,
    Load,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandTicket(pub u64);

/// What a successful command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Built(BuildingInstance),
    Moved(BuildingInstance),
    Upgraded(BuildingInstance),
    Deleted(BuildingInstance),
    Saved { buildings: usize },
    Loaded { buildings: usize },
}

pub type CommandResult = Result<CommandReply, CommandError>;

/// FIFO of pending commands. Drained by a single system so handlers never
/// interleave. Only commands with a ticket get their outcome stored.
#[derive(Resource, Default)]
pub struct CityCommandQueue {
    pending: VecDeque<(Option<CommandTicket>, CityCommand)>,
    next_ticket: u64,
}

impl CityCommandQueue {
    /// Queues a command whose result the caller will collect from
    /// [`CommandOutcomes::take`].
    pub fn submit(&mut self, command: CityCommand) -> CommandTicket {
        let ticket = CommandTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.push_back((Some(ticket), command));
        ticket
    }

    /// Queues a command nobody waits on. Its result is only logged and
    /// published as events.
    pub fn enqueue(&mut self, command: CityCommand) {
        self.pending.push_back((None, command));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn pop(&mut self) -> Option<(Option<CommandTicket>, CityCommand)> {
        self.pending.pop_front()
    }
}

/// Finished commands waiting to be collected by whoever submitted them.
#[derive(Resource, Default)]
pub struct CommandOutcomes {
    finished: HashMap<CommandTicket, CommandResult>,
}

impl CommandOutcomes {
    pub fn take(&mut self, ticket: CommandTicket) -> Option<CommandResult> {
        self.finished.remove(&ticket)
    }

    pub fn is_finished(&self, ticket: CommandTicket) -> bool {
        self.finished.contains_key(&ticket)
    }

    pub fn len(&self) -> usize {
        self.finished.len()
    }

    pub fn is_empty(&self) -> bool {
        self.finished.is_empty()
    }

    fn record(&mut self, ticket: CommandTicket, result: CommandResult) {
        self.finished.insert(ticket, result);
    }
}

/// Runs one command to completion, compensations included.
pub fn execute_command(
    city: &mut CityState<'_>,
    save_config: &SaveLoadConfig,
    command: &CityCommand,
    bus: &mut impl crate::systems::events::EventSink,
) -> CommandResult {
    match command {
        CityCommand::Build(request) => build_building(city, request, bus).map(CommandReply::Built),
        CityCommand::Move(request) => move_building(city, request, bus).map(CommandReply::Moved),
        CityCommand::Upgrade(request) => {
            upgrade_building(city, request, bus).map(CommandReply::Upgraded)
        }
        CityCommand::Delete(request) => {
            delete_building(city, request, bus).map(CommandReply::Deleted)
        }
        CityCommand::Save => save_game(city, save_config, bus).map(|snapshot| CommandReply::Saved {
            buildings: snapshot.buildings.len(),
        }),
        CityCommand::Load => load_game(city, save_config, bus).map(|_| CommandReply::Loaded {
            buildings: city.registry.len(),
        }),
    }
}

fn enqueue_command_events(
    mut requests: EventReader<CityCommand>,
    mut queue: ResMut<CityCommandQueue>,
) {
    for command in requests.read() {
        queue.enqueue(command.clone());
    }
}

#[allow(clippy::too_many_arguments)]
pub fn dispatch_city_commands(
    mut queue: ResMut<CityCommandQueue>,
    mut outcomes: ResMut<CommandOutcomes>,
    catalog: Res<BuildingCatalog>,
    mut grid: ResMut<GridStore>,
    mut registry: ResMut<BuildingRegistry>,
    mut ledger: ResMut<EconomyLedger>,
    save_config: Res<SaveLoadConfig>,
    mut bus: EventWriter<CityEvent>,
) {
    if queue.is_empty() {
        return;
    }

    let mut city = CityState {
        catalog: &catalog,
        grid: &mut grid,
        registry: &mut registry,
        ledger: &mut ledger,
    };

    while let Some((ticket, command)) = queue.pop() {
        let result = execute_command(&mut city, &save_config, &command, &mut bus);
        debug!("Command {:?} finished: {:?}", ticket, result.as_ref().map(|_| ()));
        if let Some(ticket) = ticket {
            outcomes.record(ticket, result);
        }
    }
}

pub struct CommandPlugin;

impl Plugin for CommandPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CityCommand>()
            .init_resource::<SaveLoadConfig>()
            .init_resource::<CityCommandQueue>()
            .init_resource::<CommandOutcomes>()
            .add_systems(
                Update,
                (enqueue_command_events, dispatch_city_commands)
                    .chain()
                    .before(accrue_passive_income),
            );
    }
}
